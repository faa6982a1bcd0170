//! Field history extraction pipeline
//!
//! Query construction, pagination, schema normalization, record decoding and
//! the sink that writes rows, tied together by [`Extraction`].

pub mod cursor;
mod load;
mod pipeline;
pub mod query;
pub mod schema;
mod sink;
mod transform;

pub use load::Loader;
pub use pipeline::{EntityReport, Extraction, RunSummary};
pub use sink::{PageOutcome, RecordSink};
pub use transform::{RecordDecoder, Transformer};
