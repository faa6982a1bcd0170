//! File system storage for extraction output
//!
//! This module handles all file I/O operations including:
//! - Deriving per-run, per-entity file paths
//! - Append-only CSV writing

mod csv_file;
mod layout;

pub use csv_file::ExtractionFile;
pub use layout::{OutputLayout, RunStamp};
