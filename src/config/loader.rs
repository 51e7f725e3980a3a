//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = toml::from_str(content)?;
    config.traversal = config.traversal.normalized();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::SubpathLimit;

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"
            [listener]
            bind_address = "127.0.0.1:9001"

            [tree]
            path = "fixtures/root.json"

            [traversal.subpath_max_length]
            get = "unlimited"
            "#,
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9001");
        assert_eq!(config.tree.path, "fixtures/root.json");
        assert_eq!(
            config.traversal.subpath_max_length.get("GET"),
            Some(&SubpathLimit::Unlimited)
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/travel.toml")),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(parse_config("listener = 3"), Err(ConfigError::Parse(_))));

        let err = parse_config("[timeouts]\nrequest_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: "));
    }
}
