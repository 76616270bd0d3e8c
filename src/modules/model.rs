//! Model module: definition discovery, store wiring, global bindings.
//!
//! # Phases
//! ```text
//! load       scan app/models for *.toml definitions
//! configure  per definition: verify a usable store exists,
//!            resolve it through the StoreManager, register the model
//!            with the adapter, bind the handle under its global id
//! start      start all cached stores sequentially,
//!            append bound ids to the project's .eslintrc (best effort)
//! stop       stop stores, unbind every model global, discard the
//!            store cache so a reload rebuilds fresh instances
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::{ConfigurationError, LifecycleError, LifecycleResult};
use crate::lifecycle::module::LifecycleModule;
use crate::stores::{ModelDefinition, SessionConnector};

const OWNER: &str = "model";

/// Links a configured model to the store backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    pub global_id: String,
    pub store_name: String,
    pub identity: String,
}

#[derive(Default)]
pub struct ModelModule {
    definitions: Mutex<Vec<ModelDefinition>>,
    bindings: Mutex<Vec<ModelBinding>>,
}

impl ModelModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings produced by the last configure pass.
    pub fn bindings(&self) -> Vec<ModelBinding> {
        self.bindings.lock().expect("binding list poisoned").clone()
    }

    /// Session connector of a named store, with the connector-quality
    /// logging the server relies on.
    pub async fn session_connector(
        &self,
        ctx: &AppContext,
        name: &str,
    ) -> Option<SessionConnector> {
        match ctx.stores.session_connector(name).await {
            None => {
                tracing::error!(store = name, "no such store for sessions");
                None
            }
            Some(SessionConnector::Memory) => {
                tracing::error!(store = name, "sessions are using the memory store");
                Some(SessionConnector::Memory)
            }
            Some(connector) => {
                tracing::info!(store = name, "session connector resolved");
                Some(connector)
            }
        }
    }

    /// A model must either name a configured store or be able to fall
    /// back on `stores.default`.
    fn check_store_or_die(
        config: &crate::config::Config,
        definition: &ModelDefinition,
    ) -> Result<(), ConfigurationError> {
        match &definition.store {
            None if !config.has("stores.default") => Err(ConfigurationError::NoDefaultStore(
                definition.identity.clone(),
            )),
            Some(store) if !config.has(&format!("stores.{store}")) => {
                Err(ConfigurationError::MissingStore(store.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LifecycleModule for ModelModule {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn runlevel(&self) -> u8 {
        3
    }

    async fn load(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let dir = ctx.app_dir.join("app").join("models");
        let definitions =
            discover_definitions(&dir).map_err(|e| LifecycleError::phase(OWNER, "load", e))?;

        tracing::debug!(count = definitions.len(), dir = %dir.display(), "model definitions loaded");
        *self.definitions.lock().expect("definition list poisoned") = definitions;
        Ok(())
    }

    async fn configure(&self, ctx: &AppContext) -> LifecycleResult<()> {
        let config = ctx.config();
        let context_user = config.context_user();
        let definitions = self.definitions.lock().expect("definition list poisoned").clone();

        let mut bindings = Vec::with_capacity(definitions.len());
        for definition in &definitions {
            Self::check_store_or_die(&config, definition)?;

            let store_name = definition.store.as_deref().unwrap_or("default");
            let store = ctx.stores.get_store(&config, store_name).await?;

            let handle = store
                .adapter()
                .add_model(definition, &context_user)
                .map_err(LifecycleError::Resource)?;

            let global_id = definition.effective_global_id();
            if bindings
                .iter()
                .any(|b: &ModelBinding| b.global_id == global_id)
            {
                return Err(ConfigurationError::DuplicateGlobalId(global_id).into());
            }

            ctx.globals.bind(global_id.as_str(), OWNER, Arc::new(handle))?;
            bindings.push(ModelBinding {
                global_id,
                store_name: store_name.to_string(),
                identity: definition.identity.clone(),
            });
        }

        tracing::info!(models = bindings.len(), "models configured");
        *self.bindings.lock().expect("binding list poisoned") = bindings;
        Ok(())
    }

    async fn start(&self, ctx: &AppContext) -> LifecycleResult<()> {
        ctx.stores
            .start_all()
            .await
            .map_err(LifecycleError::Resource)?;

        let ids: Vec<String> = self
            .bindings()
            .into_iter()
            .map(|b| b.global_id)
            .collect();
        if !ids.is_empty() {
            append_lint_globals(&ctx.app_dir, &ids);
        }
        Ok(())
    }

    async fn stop(&self, ctx: &AppContext) -> LifecycleResult<()> {
        if ctx.stores.is_empty().await {
            tracing::warn!("no models/stores needed to be stopped");
            return Ok(());
        }

        if let Err(e) = ctx.stores.stop_all().await {
            // shutdown releases what it can; the teardown still completes
            tracing::error!(error = %e, "store stop failed");
        }

        let removed = ctx.globals.unbind_all(OWNER);
        tracing::debug!(removed, "model globals unbound");

        self.bindings.lock().expect("binding list poisoned").clear();
        ctx.stores.clear().await;
        Ok(())
    }
}

/// Scan a directory tree for `*.toml` model definitions, skipping hidden
/// directories. A missing directory yields no definitions.
fn discover_definitions(dir: &Path) -> std::io::Result<Vec<ModelDefinition>> {
    let mut files = Vec::new();
    collect_definition_files(dir, &mut files)?;
    files.sort();

    let mut definitions = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(&path)?;
        let definition: ModelDefinition = toml::from_str(&text)
            .map_err(|e| std::io::Error::other(format!("{}: {e}", path.display())))?;
        definitions.push(definition);
    }
    definitions.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(definitions)
}

fn collect_definition_files(
    dir: &Path,
    files: &mut Vec<std::path::PathBuf>,
) -> std::io::Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if path.is_dir() {
            if !name.starts_with('.') {
                collect_definition_files(&path, files)?;
            }
        } else if name.ends_with(".toml") {
            files.push(path);
        }
    }
    Ok(())
}

/// Append bound global ids to the hosted project's `.eslintrc` globals.
/// Best effort: any failure is silently ignored.
fn append_lint_globals(app_dir: &Path, ids: &[String]) {
    let _ = try_append_lint_globals(app_dir, ids);
}

fn try_append_lint_globals(app_dir: &Path, ids: &[String]) -> std::io::Result<()> {
    let path = app_dir.join(".eslintrc");
    let text = std::fs::read_to_string(&path)?;
    let mut doc: serde_json::Value = serde_json::from_str(&text).map_err(std::io::Error::other)?;

    let globals = doc
        .as_object_mut()
        .ok_or_else(|| std::io::Error::other("not an object"))?
        .entry("globals")
        .or_insert_with(|| serde_json::json!({}));
    let globals = globals
        .as_object_mut()
        .ok_or_else(|| std::io::Error::other("globals is not an object"))?;

    for id in ids {
        globals.insert(id.clone(), serde_json::Value::Bool(true));
    }

    std::fs::write(&path, serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config(text: &str) -> Config {
        Config::from_value(text.parse().unwrap()).unwrap()
    }

    fn definition(text: &str) -> ModelDefinition {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_check_store_or_die() {
        let no_default = Config::default();
        let with_default = config("[stores.default]\nadapter = \"memory\"");

        let implicit = definition("identity = \"user\"");
        assert!(ModelModule::check_store_or_die(&no_default, &implicit).is_err());
        assert!(ModelModule::check_store_or_die(&with_default, &implicit).is_ok());

        let explicit = definition("identity = \"user\"\nstore = \"sessions\"");
        assert!(matches!(
            ModelModule::check_store_or_die(&with_default, &explicit),
            Err(ConfigurationError::MissingStore(ref name)) if name == "sessions"
        ));
    }

    #[test]
    fn test_discover_skips_hidden_dirs_and_sorts() {
        let dir = std::env::temp_dir().join(format!("armature-models-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join(".git")).unwrap();
        std::fs::create_dir_all(dir.join("admin")).unwrap();
        std::fs::write(dir.join("zebra.toml"), "identity = \"zebra\"").unwrap();
        std::fs::write(dir.join("admin/account.toml"), "identity = \"account\"").unwrap();
        std::fs::write(dir.join(".git/skipme.toml"), "identity = \"nope\"").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let definitions = discover_definitions(&dir).unwrap();
        let identities: Vec<_> = definitions.iter().map(|d| d.identity.as_str()).collect();
        assert_eq!(identities, vec!["account", "zebra"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let definitions = discover_definitions(Path::new("/nonexistent/app/models")).unwrap();
        assert!(definitions.is_empty());
    }

    #[tokio::test]
    async fn test_session_connector_lookup() {
        let ctx = crate::context::AppContext::new(
            config("[stores.default]\nadapter = \"memory\""),
            ".".into(),
            true,
        );
        let module = ModelModule::new();

        // nothing resolved yet
        assert!(module.session_connector(&ctx, "default").await.is_none());

        let cfg = ctx.config();
        ctx.stores.get_store(&cfg, "default").await.unwrap();
        assert_eq!(
            module.session_connector(&ctx, "default").await,
            Some(SessionConnector::Memory)
        );
    }

    #[test]
    fn test_append_lint_globals_best_effort() {
        let dir = std::env::temp_dir().join(format!("armature-eslint-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        // no .eslintrc: silently ignored
        append_lint_globals(&dir, &["User".into()]);

        std::fs::write(dir.join(".eslintrc"), r#"{"rules": {}}"#).unwrap();
        append_lint_globals(&dir, &["User".into(), "Post".into()]);

        let text = std::fs::read_to_string(dir.join(".eslintrc")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["globals"]["User"], serde_json::json!(true));
        assert_eq!(doc["globals"]["Post"], serde_json::json!(true));
        assert!(doc["rules"].is_object());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
