//! Chord grammar, transposition, and progression analysis.
//!
//! ChordPro embeds chords in lyrics as bracketed tokens immediately before
//! the text they apply to, e.g. `[C]Amazing [F]grace`. This module scans
//! bracket spans, validates chord spelling, transposes chords through the
//! chromatic scale with sensible enharmonic choices, and derives simple
//! statistics over a progression.
//!
//! # Example
//!
//! ```rust
//! use chordslide::chord::{Transposer, extract_chords};
//!
//! let line = "[C]Amazing [F]grace [G]how [Am]sweet";
//! assert_eq!(extract_chords(line), ["C", "F", "G", "Am"]);
//!
//! let up_two = Transposer::new().transpose_text(line, 2);
//! assert_eq!(up_two, "[D]Amazing [G]grace [A]how [Bm]sweet");
//! ```

pub mod analyze;
pub mod grammar;
pub mod transpose;

// Re-exports
pub use analyze::{Complexity, ProgressionAnalysis, analyze_progression, detect_key};
pub use grammar::{ChordToken, bracket_spans, extract_chords, is_valid_chord};
pub use transpose::{FLAT_NAMES, SHARP_NAMES, Transposer};
