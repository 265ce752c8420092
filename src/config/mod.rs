//! Configuration module.
//!
//! hearth is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [database]
//! type = "sqlite"
//! path = "${HEARTH_DATA_DIR}/hearth.db"
//!
//! [retention]
//! interval_hours = 24
//! max_checked_items = 100
//! ```

mod database;
mod observability;
mod retention;

use std::path::Path;

pub use database::*;
pub use observability::*;
pub use retention::*;
use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct HearthConfig {
    /// Database configuration for persistent storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Observability configuration (logging, metrics).
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Checked shopping-list item retention.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl HearthConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: HearthConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.retention.validate()?;
        Ok(())
    }

    /// Generate the JSON schema for the configuration file.
    #[cfg(feature = "json-schema")]
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(HearthConfig)
    }

    /// Generate the JSON schema as a pretty-printed JSON string.
    #[cfg(feature = "json-schema")]
    pub fn json_schema_string() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Expand `${VAR}` references, leaving anything after a `#` comment untouched.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| ConfigError::Validation(format!("invalid env var pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in re.captures_iter(line) {
            let Some(whole) = cap.get(0) else {
                continue;
            };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    // Remove trailing newline if input didn't have one
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HearthConfig::from_str("").unwrap();

        assert!(config.database.is_none());
        assert!(config.retention.enabled);
        assert_eq!(config.retention.max_checked_items, 100);
        assert_eq!(config.observability.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_sqlite_config() {
        let config = HearthConfig::from_str(
            r#"
            [database]
            type = "sqlite"
            path = "/var/lib/hearth/hearth.db"
            max_connections = 2
        "#,
        )
        .unwrap();

        match config.database {
            DatabaseConfig::Sqlite(cfg) => {
                assert_eq!(cfg.path, "/var/lib/hearth/hearth.db");
                assert_eq!(cfg.max_connections, 2);
                assert!(cfg.run_migrations);
                assert!(cfg.wal_mode);
            }
            other => panic!("expected sqlite config, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_sqlite_path_rejected() {
        let result = HearthConfig::from_str(
            r#"
            [database]
            type = "sqlite"
            path = ""
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = HearthConfig::from_str("[server]\nport = 8080");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_logging_config() {
        let config = HearthConfig::from_str(
            r#"
            [observability.logging]
            level = "debug"
            format = "json"
            timestamps = false
        "#,
        )
        .unwrap();

        let logging = &config.observability.logging;
        assert_eq!(logging.level.as_str(), "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert!(!logging.timestamps);
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("HEARTH_TEST_DB_PATH", Some("/tmp/hearth-test.db"), || {
            let result = expand_env_vars("path = \"${HEARTH_TEST_DB_PATH}\"").unwrap();
            assert_eq!(result, "path = \"/tmp/hearth-test.db\"");
        });
    }

    #[test]
    fn test_env_var_missing() {
        temp_env::with_var_unset("HEARTH_TEST_MISSING", || {
            let result = expand_env_vars("path = \"${HEARTH_TEST_MISSING}\"");
            assert!(matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "HEARTH_TEST_MISSING"));
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let result = expand_env_vars("# path = \"${NONEXISTENT_VAR}\"").unwrap();
        assert_eq!(result, "# path = \"${NONEXISTENT_VAR}\"");
    }

    #[test]
    fn test_env_var_after_comment_ignored() {
        let result = expand_env_vars("key = \"value\" # ${NONEXISTENT_VAR}").unwrap();
        assert_eq!(result, "key = \"value\" # ${NONEXISTENT_VAR}");
    }

    #[test]
    fn test_trailing_newline_preserved() {
        assert_eq!(expand_env_vars("a = 1\n").unwrap(), "a = 1\n");
        assert_eq!(expand_env_vars("a = 1").unwrap(), "a = 1");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retention]\nmax_checked_items = 25").unwrap();

        let config = HearthConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retention.max_checked_items, 25);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = HearthConfig::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Io(_, p)) if p == path));
    }
}
