//! Display formatting for terminal output
//!
//! Formats change-log records for the viewer's list and detail views.

pub mod record;

pub use record::{format_record_detail, format_record_list};
