//! Path management for the change-log viewer and file-backed store
//!
//! ## Path Resolution Order
//!
//! 1. `LOGGABLE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/loggable` or `~/.config/loggable`
//! 3. Windows: `%APPDATA%\loggable`

use std::path::PathBuf;

use crate::error::LoggableError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "LOGGABLE_DATA_DIR";

/// Manages all paths used by the crate's file-backed pieces
#[derive(Debug, Clone)]
pub struct LoggablePaths {
    /// Base directory for settings and change-log files
    base_dir: PathBuf,
}

impl LoggablePaths {
    /// Create a new LoggablePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, LoggableError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LoggablePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/loggable/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory holding one JSONL file per change-log table
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the JSONL file backing a change-log table
    pub fn table_file(&self, table: &str) -> PathBuf {
        self.data_dir().join(format!("{}.jsonl", table))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), LoggableError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LoggableError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LoggableError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, LoggableError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                LoggableError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("loggable"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, LoggableError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| LoggableError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("loggable"))
}
