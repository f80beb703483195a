//! Unified error type for chordslide operations.
//!
//! Internal subsystems (container stream, rich-text codec) carry their own
//! error enums; this type is what the high-level annotation and session
//! APIs return to callers.
use thiserror::Error;

/// Main error type for chordslide operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container bytes do not decode to the expected record graph shape
    #[error("Container format error: {0}")]
    Format(String),

    /// The presentation has no arrangement, but the requested flow needs one
    /// to establish slide order
    #[error("Presentation contains no arrangement")]
    MissingArrangement,

    /// A cue the caller explicitly asked to annotate has no text-bearing
    /// element
    #[error("Cue '{0}' has no text element")]
    MissingTextElement(String),

    /// Rich-text payload could not be encoded or decoded
    #[error("Rich text error: {0}")]
    RichText(String),
}

/// Result type for chordslide operations.
pub type Result<T> = std::result::Result<T, Error>;
