//! Change-log engine settings
//!
//! Controls the change-log table name, diff computation, the lazy-update
//! short-circuit and the optional identity store bound.

use serde::{Deserialize, Serialize};

use super::paths::LoggablePaths;
use crate::error::LoggableError;

/// Default name of the change-log table
pub const DEFAULT_TABLE_NAME: &str = "change_logs";

/// Settings for the change-log engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Table the change-log rows are written to
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Whether update rows carry a field-level diff
    #[serde(default = "default_compute_diff")]
    pub compute_diff: bool,

    /// Skip update rows whose state matches the last recorded state
    #[serde(default)]
    pub lazy_update: bool,

    /// Fields compared by the lazy-update check (empty = whole snapshot)
    #[serde(default)]
    pub lazy_update_fields: Vec<String>,

    /// Maximum number of remembered snapshots (None = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_capacity: Option<usize>,
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

fn default_compute_diff() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            compute_diff: default_compute_diff(),
            lazy_update: false,
            lazy_update_fields: Vec::new(),
            identity_capacity: None,
        }
    }
}

impl Settings {
    /// Create settings writing to the given change-log table
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Enable or disable diff computation on update rows
    pub fn with_compute_diff(mut self, enabled: bool) -> Self {
        self.compute_diff = enabled;
        self
    }

    /// Enable the lazy-update check, comparing on the given fields
    pub fn with_lazy_update<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lazy_update = true;
        self.lazy_update_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Bound the identity store to `capacity` snapshots
    pub fn with_identity_capacity(mut self, capacity: usize) -> Self {
        self.identity_capacity = Some(capacity);
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), LoggableError> {
        if self.table_name.trim().is_empty() {
            return Err(LoggableError::Config(
                "Change-log table name cannot be empty".into(),
            ));
        }
        if self.identity_capacity == Some(0) {
            return Err(LoggableError::Config(
                "Identity capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LoggablePaths) -> Result<Self, LoggableError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LoggableError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LoggableError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LoggablePaths) -> Result<(), LoggableError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LoggableError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            LoggableError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}
