//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every `stores.*` entry must name an adapter
//! - Route specs must parse
//! - Value ranges (port must be non-zero)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: `Config → Result<(), Vec<ValidationError>>`
//! - Runs before a config is accepted into the system, at boot and on
//!   every reload

use thiserror::Error;

use crate::config::schema::Config;
use crate::routing::table::RouteEntry;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("port must be non-zero")]
    PortZero,

    #[error("store '{0}' does not name an adapter")]
    StoreWithoutAdapter(String),

    #[error("{0}")]
    Route(#[from] crate::routing::table::RouteSpecError),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.settings().port == 0 {
        errors.push(ValidationError::PortZero);
    }

    if let Some(stores) = config.get("stores").and_then(toml::Value::as_table) {
        for (name, entry) in stores {
            let has_adapter = entry
                .as_table()
                .and_then(|t| t.get("adapter"))
                .and_then(toml::Value::as_str)
                .is_some();
            if !has_adapter {
                errors.push(ValidationError::StoreWithoutAdapter(name.clone()));
            }
        }
    }

    for (spec, target) in &config.settings().routes {
        if let Err(e) = RouteEntry::parse(spec, target) {
            errors.push(ValidationError::Route(e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        Config::from_value(text.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse(
            r#"
            port = 3000

            [stores.default]
            adapter = "disk"

            [routes]
            "get /" = "home#index"
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let config = parse(
            r#"
            port = 0

            [stores.default]
            location = ".data"

            [routes]
            "teleport /" = "home#index"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_store_without_adapter_is_named() {
        let config = parse("[stores.sessions]\nttl = 300\n");
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("sessions"));
    }
}
