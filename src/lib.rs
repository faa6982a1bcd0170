//! Field History Extractor
//!
//! Pulls Salesforce field history tables into append-only CSV files, one file
//! per history entity per run.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod model;
pub mod storage;

// Re-exports for convenience
pub use client::{ReqwestTransport, SalesforceClient, Transport};
pub use config::{CredentialStore, TenantConfig};
pub use error::{Error, RecordError, Result};
pub use etl::{Extraction, Loader, PageOutcome, RecordSink, RunSummary, Transformer};
pub use model::{ChangeRecord, HistoryEntity, Page};
pub use storage::{ExtractionFile, OutputLayout, RunStamp};
