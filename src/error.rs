//! Error types for the extractor.
//!
//! Library code returns [`Result`]; the binary wraps these in `eyre` reports.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown tenant key, unreadable credential file or missing credential fields.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token endpoint did not hand back a usable access token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not authenticated, call authenticate() before issuing requests")]
    NotAuthenticated,

    /// Undecodable or unexpectedly shaped response. `body` is the raw payload.
    #[error("malformed response from {context}: {body}")]
    MalformedResponse { context: String, body: String },

    #[error("cannot resolve the parent reference field of {entity}, candidates: [{}]", candidates.join(", "))]
    AmbiguousSchema {
        entity: String,
        candidates: Vec<String>,
    },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl Error {
    pub(crate) fn malformed(context: impl Into<String>, body: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            body: body.into(),
        }
    }

    /// Errors that end the whole run rather than a single entity.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Authentication(_) | Self::NotAuthenticated
        )
    }
}

/// Why a single change record could not be projected into a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record is missing attribute '{0}'")]
    MissingAttribute(String),

    #[error("attribute '{name}' should be {expected}")]
    InvalidAttribute { name: String, expected: &'static str },
}
