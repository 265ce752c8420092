//! Checked-item retention configuration.
//!
//! Controls the background job that trims old checked items from shopping
//! lists.
//!
//! # Example
//!
//! ```toml
//! [retention]
//! enabled = true
//! interval_hours = 24
//! max_checked_items = 100
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::retention::MAX_CHECKED_ITEMS;

/// Checked-item retention configuration.
///
/// When enabled, a background worker periodically deletes checked items
/// beyond the newest `max_checked_items` on every shopping list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Whether the retention worker runs.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often to run the retention worker (in hours).
    /// Default: 24 (once per day)
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Number of most recently updated checked items kept per list.
    /// Default: 100
    #[serde(default = "default_max_checked_items")]
    pub max_checked_items: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_hours: default_interval_hours(),
            max_checked_items: default_max_checked_items(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_hours() -> u64 {
    24
}

fn default_max_checked_items() -> usize {
    MAX_CHECKED_ITEMS
}

impl RetentionConfig {
    /// Get the interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_hours * 3600)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.interval_hours == 0 {
            return Err(ConfigError::Validation(
                "retention.interval_hours must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
