//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = Config::from_value(content.parse()?)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("armature-loader-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let path = write_temp("ok.toml", "port = 3100\n[stores.default]\nadapter = \"disk\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.settings().port, 3100);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/armature.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let path = write_temp("broken.toml", "port = = 3100");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_semantic_failure_is_validation_error() {
        let path = write_temp("invalid.toml", "[stores.default]\nlocation = \".data\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("default"));
        let _ = fs::remove_file(path);
    }
}
