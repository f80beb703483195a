//! Chordslide - chord annotation and transposition for presentation containers
//!
//! This library edits chord annotations inside presentation container files:
//! flat streams of framed protobuf records that cross-reference each other to
//! form a graph of arrangements, cue groups, cues, and slides. Slide text
//! lives in RTF payloads; chords are embedded as ChordPro bracket spans
//! rendered invisible on screen through transparent colors and a reduced
//! font size, so presentation software displays clean lyrics while chord
//! data rides along in the same text.
//!
//! # Features
//!
//! - **Container graph**: Parse and rewrite the record stream, preserving
//!   every untouched record byte-for-byte
//! - **Rich-text codec**: Decode RTF payloads to plain text plus attribute
//!   runs, and encode annotated text back with the invisibility treatment
//! - **Chord engine**: ChordPro grammar, chromatic transposition with
//!   enharmonic spelling, key detection, and progression analysis
//! - **Slide annotation**: Walk slides in arrangement order and match them
//!   to chords by content-based ordinal, tolerating broken references
//! - **Async sessions**: Coarse load/annotate/transpose/analyze units over
//!   whole files, with a plain-text fallback for bare ChordPro input
//!
//! # Example - Annotating a presentation
//!
//! ```no_run
//! use chordslide::annotate::{self, ChordMap};
//! use chordslide::container::PresentationFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("song.pres")?;
//! let mut file = PresentationFile::load(data)?;
//!
//! let mut chords = ChordMap::new();
//! chords.insert(0, "[C]Amazing [F]grace, how [G]sweet the [C]sound");
//!
//! let report = annotate::annotate(&mut file, &chords)?;
//! println!("annotated {} slides", report.slides_annotated);
//!
//! std::fs::write("song.pres", file.save()?)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Transposing ChordPro text
//!
//! ```rust
//! use chordslide::chord::Transposer;
//!
//! let up_two = Transposer::new().transpose_text("[C]Amazing [F]grace", 2);
//! assert_eq!(up_two, "[D]Amazing [G]grace");
//! ```
//!
//! # Example - Async file session
//!
//! ```no_run
//! use chordslide::session;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let report = session::transpose_file("in.pres", "out.pres", 2).await?;
//! println!("transposed {} slides", report.slides_annotated);
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod chord;
pub mod common;
pub mod container;
pub mod rtf;
pub mod session;

// Re-export the most commonly used types at the crate root
pub use annotate::{AnnotationReport, ChordMap, Warning};
pub use chord::{ProgressionAnalysis, Transposer};
pub use common::{Error, Result};
pub use container::PresentationFile;
pub use rtf::{RichText, TextAttributes};
