//! Shared utilities for integration testing.

use std::path::{Path, PathBuf};

use armature::config::Config;

/// A throwaway hosted-app directory under the system temp dir.
pub struct TestApp {
    pub dir: PathBuf,
}

impl TestApp {
    /// Create a fresh app skeleton (`app/models`, `config/`, `.data`).
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("armature-it-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("app/models")).unwrap();
        std::fs::create_dir_all(dir.join("config")).unwrap();
        Self { dir }
    }

    /// Drop a model definition into `app/models`.
    pub fn write_model(&self, file: &str, content: &str) {
        std::fs::write(self.dir.join("app/models").join(file), content).unwrap();
    }

    #[allow(dead_code)]
    pub fn remove_model(&self, file: &str) {
        std::fs::remove_file(self.dir.join("app/models").join(file)).unwrap();
    }

    /// Write `config/settings.toml` and return its path.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.dir.join("config/settings.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Parse the on-disk config the way the binary would.
    pub fn load_config(&self) -> Config {
        armature::config::load_config(&self.config_path()).unwrap()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config/settings.toml")
    }

    /// Data directory for disk stores, as an absolute TOML-safe string.
    pub fn data_dir(&self) -> String {
        self.dir.join(".data").display().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// A minimal config with one disk-backed default store.
#[allow(dead_code)]
pub fn default_store_config(app: &TestApp, port: u16) -> String {
    format!(
        "port = {port}\n\n[stores.default]\nadapter = \"disk\"\nlocation = \"{}\"\n",
        app.data_dir()
    )
}

#[allow(dead_code)]
pub fn exists(path: &Path) -> bool {
    path.exists()
}
