//! Rich-text payload codec.
//!
//! Slide text payloads are RTF byte streams. This module decodes a payload
//! into plain text plus attribute runs (font, size, fill color, stroke
//! color and width), and encodes plain text back into a payload, applying
//! base attributes uniformly and rendering ChordPro bracket spans invisible
//! by overriding their colors and size.
//!
//! # Architecture
//!
//! - **Lexer**: tokenizes RTF input into control words, symbols, and text
//! - **Document**: builds plain text and attribute runs from tokens
//! - **Writer**: serializes plain text and attributes back to RTF
//!
//! # Example
//!
//! ```rust
//! use chordslide::rtf::{self, TextAttributes};
//!
//! let payload = rtf::encode_payload("Amazing grace", &TextAttributes::default());
//! let decoded = rtf::decode_payload(&payload).unwrap();
//! assert_eq!(decoded.text, "Amazing grace");
//! ```

mod document;
mod error;
mod lexer;
mod types;
mod writer;

// Re-exports
pub use document::RichText;
pub use error::{RtfError, RtfResult};
pub use types::{AttributeRun, Color, ColorTable, TextAttributes};
pub use writer::encode_payload;

use tracing::debug;

/// Decode a rich-text payload to plain text plus attribute runs.
///
/// The primary path parses the payload as RTF. If that fails, the bytes are
/// reinterpreted as raw UTF-8 and trimmed. Returns `None` when both paths
/// fail, in which case the element is treated as having no text.
pub fn decode_payload(payload: &[u8]) -> Option<RichText> {
    if payload.is_empty() {
        return None;
    }

    let lossy = String::from_utf8_lossy(payload);
    let trimmed = lossy.trim_start();
    if trimmed.starts_with("{\\rtf") {
        match RichText::parse(trimmed) {
            Ok(rich) => return Some(rich),
            Err(err) => {
                debug!(%err, "RTF decode failed, falling back to raw UTF-8");
            },
        }
    }

    let text = std::str::from_utf8(payload).ok()?;
    Some(RichText::plain(text.trim()))
}

/// Re-embed chord annotations into a slide's rich-text payload.
///
/// Base attributes are recovered from the first character of the original
/// payload, defaulting to the fixed baseline for empty or plain-text
/// payloads; `chordpro` is then encoded with those attributes applied
/// uniformly and every chord bracket span rendered invisible.
///
/// A payload that declares itself RTF but does not parse is an error:
/// rewriting it would discard formatting that could not be read.
///
/// An empty `chordpro` returns the original payload unchanged; chords are
/// never removed by omission.
pub fn embed_chords(original_payload: &[u8], chordpro: &str) -> RtfResult<Vec<u8>> {
    if chordpro.is_empty() {
        return Ok(original_payload.to_vec());
    }

    Ok(encode_payload(chordpro, &base_attributes(original_payload)?))
}

/// Base attributes for rewriting a payload.
fn base_attributes(payload: &[u8]) -> RtfResult<TextAttributes> {
    let lossy = String::from_utf8_lossy(payload);
    let trimmed = lossy.trim_start();
    if trimmed.starts_with("{\\rtf") {
        return Ok(RichText::parse(trimmed)?.base_attributes());
    }
    Ok(TextAttributes::default())
}
