//! Configuration schema definitions.
//!
//! `Settings` covers the typed global keys. Per-store tables stay as raw
//! TOML so adapters can carry arbitrary connection settings; they are
//! reached through `Config::has` / `Config::get` dotted-path lookups.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Typed global settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Port the development server binds.
    pub port: u16,

    /// Optional log file name, written under `logs/`.
    pub log: Option<String>,

    /// Context user handed to adapters when models are registered.
    pub user: Option<String>,

    /// Route specifications: `"get /" = "home#index"`.
    pub routes: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3000,
            log: None,
            user: None,
            routes: BTreeMap::new(),
        }
    }
}

/// One named store entry from the `stores` table.
///
/// Read-only to this core; the raw table is passed through to the adapter
/// constructor untouched.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub name: String,
    pub adapter: String,
    pub raw: toml::value::Table,
}

/// A validated, immutable configuration snapshot.
#[derive(Debug, Clone)]
pub struct Config {
    settings: Settings,
    raw: toml::Value,
}

impl Config {
    /// Build a snapshot from a parsed TOML document.
    pub fn from_value(raw: toml::Value) -> Result<Self, toml::de::Error> {
        let settings = Settings::deserialize(raw.clone())?;
        Ok(Self { settings, raw })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True when a dotted path resolves to a value.
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Resolve a dotted path (`stores.default.adapter`) into the raw
    /// document.
    pub fn get(&self, path: &str) -> Option<&toml::Value> {
        let mut current = &self.raw;
        for segment in path.split('.') {
            current = current.as_table()?.get(segment)?;
        }
        Some(current)
    }

    /// String value at a dotted path, if present and a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(toml::Value::as_str)
    }

    /// The `stores.<name>` entry, if configured with an adapter id.
    pub fn store(&self, name: &str) -> Option<StoreConfig> {
        let table = self.get(&format!("stores.{name}"))?.as_table()?;
        let adapter = table.get("adapter")?.as_str()?.to_string();
        Some(StoreConfig {
            name: name.to_string(),
            adapter,
            raw: table.clone(),
        })
    }

    /// Context user for adapter registration, lowercased.
    pub fn context_user(&self) -> String {
        self.settings
            .user
            .as_deref()
            .unwrap_or("user")
            .to_lowercase()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            raw: toml::Value::Table(toml::value::Table::new()),
        }
    }
}
