//! Writes decoded change records to an entity's extraction file.

use super::schema::{header_row, resolve_parent_field_name};
use super::{Loader, RecordDecoder, Transformer};
use crate::error::{RecordError, Result};
use crate::model::{ChangeRecord, HistoryEntity, Page};
use crate::storage::ExtractionFile;
use std::path::Path;

/// What happened to one page of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Every record was written.
    Written { rows: usize },
    /// A record failed to decode, so none of the page was written.
    Skipped { records: usize, reason: RecordError },
}

impl PageOutcome {
    pub fn rows_written(&self) -> usize {
        match self {
            Self::Written { rows } => *rows,
            Self::Skipped { .. } => 0,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Record sink for one entity: a header row, then one row per change record.
///
/// The header and the decoder share the parent field resolved when the sink
/// is created.
pub struct RecordSink {
    file: ExtractionFile,
    header: Vec<String>,
    decoder: RecordDecoder,
}

impl RecordSink {
    /// Resolve the entity's header, then create the extraction file (and its
    /// directories) at `path`.
    ///
    /// Nothing is created when the parent field cannot be resolved.
    pub fn create(path: impl AsRef<Path>, entity: &HistoryEntity) -> Result<Self> {
        let parent_field = resolve_parent_field_name(&entity.name, &entity.fields)?;
        Ok(Self {
            file: ExtractionFile::create(path)?,
            header: header_row(&parent_field),
            decoder: RecordDecoder::new(parent_field),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn parent_field(&self) -> &str {
        self.decoder.parent_field()
    }

    /// Append the header row.
    pub fn write_header(&self) -> Result<()> {
        self.file.load(vec![self.header.clone()])?;
        Ok(())
    }

    /// Decode and append every record of `page`, preserving page order.
    ///
    /// A page with any undecodable record is skipped whole and reported as
    /// [`PageOutcome::Skipped`]; only I/O failures are errors.
    pub fn write_records(&self, page: &Page) -> Result<PageOutcome> {
        let records: Vec<ChangeRecord> = match self.decoder.transform_many(page.records.clone()) {
            Ok(records) => records,
            Err(reason) => {
                log::warn!(
                    "Skipping page of {} record(s) for {}: {}",
                    page.len(),
                    self.file.path().display(),
                    reason
                );
                log::warn!(
                    "Input does not match what was expected: {}",
                    serde_json::Value::Array(page.records.clone())
                );
                return Ok(PageOutcome::Skipped {
                    records: page.len(),
                    reason,
                });
            }
        };

        let rows = self
            .file
            .load(records.into_iter().map(ChangeRecord::into_row).collect())?;
        log::debug!("Wrote {} row(s) to {}", rows, self.file.path().display());
        Ok(PageOutcome::Written { rows })
    }
}
