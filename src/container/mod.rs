//! Presentation container graph support.
//!
//! The container is a flat stream of framed records. Each frame carries a
//! varint-encoded header length, a protobuf `RecordInfo` header naming the
//! record's identifier and kind, and a protobuf payload:
//!
//! ```text
//! frame := varint(header_len) RecordInfo payload
//! ```
//!
//! Records cross-reference each other by opaque string identifier, forming a
//! graph (presentation → arrangements → cue groups → cues → actions →
//! slides → elements). [`PresentationFile`] reconstructs that graph and
//! keeps the original frame bytes of every record, so saving re-emits
//! untouched records bit-for-bit and only re-encodes records that were
//! actually mutated.

pub mod graph;
pub mod records;
pub mod stream;
pub mod varint;

// Re-export commonly used types
pub use graph::{PresentationFile, Record};
pub use records::{
    ActionRecord, ArrangementRecord, CueGroupRecord, CueRecord, Element, ElementFlags,
    ElementKind, PresentationRecord, RecordInfo, RecordKind, Slide, SlideAction,
};
pub use stream::RawRecord;

/// Error types for container parsing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record stream: {0}")]
    InvalidStream(String),

    #[error("Protobuf decoding error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("No presentation root record in stream")]
    MissingRoot,

    #[error("Multiple presentation root records in stream")]
    DuplicateRoot,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
