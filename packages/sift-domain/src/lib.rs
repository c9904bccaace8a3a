pub mod chunk;
pub mod error_code;
pub mod failure;
pub mod query;
pub mod request;
pub mod response;
pub mod time_serde;
pub mod validate;

pub use chunk::{RankedChunk, RecordError, TextChunk, chunk_id};
pub use error_code::ErrorCode;
pub use failure::FailureRecord;
pub use query::formulate;
pub use request::{ChallengeInfo, Document, JobToBeDone, Persona, Request};
pub use response::{ExtractedSection, Response, ResponseMetadata, truncate_preview};
pub use validate::{ValidationFailure, validate};

/// Upper bound on documents accepted in one request.
pub const MAX_DOCUMENTS: usize = 100;
/// Upper bound on sections emitted in one response.
pub const MAX_SECTIONS: usize = 50;
pub const PREVIEW_CHARS: usize = 150;
pub const MIN_QUERY_CHARS: usize = 3;
pub const ELLIPSIS: &str = "...";
pub const UNTITLED_SECTION: &str = "Untitled Section";
/// Document label used for failures that are not tied to a single document.
pub const SYSTEM_DOCUMENT: &str = "system";
