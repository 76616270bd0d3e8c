//! Loader and reaper callback lists.
//!
//! Loaders re-run on every hot reload; reapers run once at shutdown.
//! Both lists are append-only and execute strictly in registration
//! order — there is no de-duplication and no removal API.

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Outcome of one hook invocation.
pub type HookResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A registered loader or reaper callback.
pub type HookFn = Arc<dyn Fn() -> BoxFuture<'static, HookResult> + Send + Sync>;

/// Adapt an async closure into a [`HookFn`].
pub fn hook<F, Fut>(f: F) -> HookFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = HookResult> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

struct HookEntry {
    name: String,
    hook: HookFn,
}

/// Ordered loader and reaper lists.
#[derive(Default)]
pub struct LoaderReaperRegistry {
    loaders: Mutex<Vec<HookEntry>>,
    reapers: Mutex<Vec<HookEntry>>,
}

impl LoaderReaperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader, re-run on every reload.
    pub fn add_loader(&self, name: impl Into<String>, hook: HookFn) {
        let name = name.into();
        tracing::debug!(loader = %name, "loader registered");
        self.loaders
            .lock()
            .expect("loader list poisoned")
            .push(HookEntry { name, hook });
    }

    /// Append a reaper, run once at shutdown.
    pub fn add_reaper(&self, name: impl Into<String>, hook: HookFn) {
        let name = name.into();
        tracing::debug!(reaper = %name, "reaper registered");
        self.reapers
            .lock()
            .expect("reaper list poisoned")
            .push(HookEntry { name, hook });
    }

    /// Snapshot of the loader list in registration order.
    pub fn loaders(&self) -> Vec<(String, HookFn)> {
        self.loaders
            .lock()
            .expect("loader list poisoned")
            .iter()
            .map(|e| (e.name.clone(), Arc::clone(&e.hook)))
            .collect()
    }

    /// Snapshot of the reaper list in registration order.
    pub fn reapers(&self) -> Vec<(String, HookFn)> {
        self.reapers
            .lock()
            .expect("reaper list poisoned")
            .iter()
            .map(|e| (e.name.clone(), Arc::clone(&e.hook)))
            .collect()
    }

    pub fn loader_count(&self) -> usize {
        self.loaders.lock().expect("loader list poisoned").len()
    }

    pub fn reaper_count(&self) -> usize {
        self.reapers.lock().expect("reaper list poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loaders_run_in_registration_order() {
        let registry = LoaderReaperRegistry::new();
        let journal = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let journal = journal.clone();
            registry.add_loader(
                name,
                hook(move || {
                    let journal = journal.clone();
                    async move {
                        journal.lock().unwrap().push(name);
                        Ok(())
                    }
                }),
            );
        }

        for (_, loader) in registry.loaders() {
            loader().await.unwrap();
        }

        assert_eq!(*journal.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_no_deduplication() {
        let registry = LoaderReaperRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            registry.add_reaper(
                "same",
                hook(move || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            );
        }

        assert_eq!(registry.reaper_count(), 2);
        for (_, reaper) in registry.reapers() {
            reaper().await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
