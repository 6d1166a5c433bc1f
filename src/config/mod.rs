//! Configuration module
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution for the file-backed change-log store
//! - Engine settings (table name, diff, lazy update, identity bound)

pub mod paths;
pub mod settings;

pub use paths::LoggablePaths;
pub use settings::{Settings, DEFAULT_TABLE_NAME};
