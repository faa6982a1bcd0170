//! Append-only CSV extraction files

use crate::error::{Error, Result};
use crate::etl::Loader;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// CSV file for one entity in one run.
///
/// Each write reopens the file in append mode, so rows are never rewritten.
#[derive(Debug)]
pub struct ExtractionFile {
    path: PathBuf,
}

impl ExtractionFile {
    /// Create the parent directories and a new, empty file at `path`.
    ///
    /// An existing file is never reused: a second run that lands on the same
    /// path fails with [`Error::Io`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
        log::debug!("Created {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows and flush.
    pub fn append<R, I>(&self, rows: R) -> Result<usize>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::Io {
                path: self.path.clone(),
                source,
            })?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);

        let mut count = 0;
        for row in rows {
            writer.write_record(row).map_err(|source| self.csv_error(source))?;
            count += 1;
        }
        writer.flush().map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(count)
    }

    fn csv_error(&self, source: csv::Error) -> Error {
        Error::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl Loader for ExtractionFile {
    type Item = Vec<String>;

    fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.append(items)
    }
}
