//! Chromatic transposition with enharmonic spelling.

use crate::chord::grammar::{self, ChordToken};

/// Canonical sharp spellings of the 12 pitch classes.
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings used for display when flats are preferred.
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Note name → chromatic index, flat spellings normalized to their sharp
/// equivalents.
static NOTE_INDEX: phf::Map<&'static str, u8> = phf::phf_map! {
    "C" => 0,
    "C#" => 1, "Db" => 1,
    "D" => 2,
    "D#" => 3, "Eb" => 3,
    "E" => 4,
    "F" => 5,
    "F#" => 6, "Gb" => 6,
    "G" => 7,
    "G#" => 8, "Ab" => 8,
    "A" => 9,
    "A#" => 10, "Bb" => 10,
    "B" => 11,
};

/// Keys conventionally spelled with flats.
static FLAT_KEYS: phf::Set<&'static str> = phf::phf_set! {
    "F", "Bb", "Eb", "Ab", "Db", "Gb",
};

/// Chromatic index of a note name, if recognized.
pub(crate) fn note_index(note: &str) -> Option<u8> {
    NOTE_INDEX.get(note).copied()
}

/// Chord transposition engine.
///
/// Carries the optional currently configured key, which biases enharmonic
/// spelling toward flats for the conventionally-flat keys.
#[derive(Debug, Clone, Default)]
pub struct Transposer {
    key: Option<String>,
}

impl Transposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transposer with a configured key.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Transpose a single chord string by `steps` semitones.
    ///
    /// Slash chords transpose root and bass independently. Each part keeps
    /// the spelling of its own explicit accidental; parts without one lean
    /// flat for minor chords and the conventionally-flat keys. Unparseable
    /// tokens pass through unchanged.
    pub fn transpose_chord(&self, chord: &str, steps: i32) -> String {
        let lean_flat = is_minor(chord) || self.key_is_flat();
        match chord.split_once('/') {
            Some((root, bass)) => format!(
                "{}/{}",
                transpose_part(root, steps, lean_flat),
                transpose_part(bass, steps, lean_flat)
            ),
            None => transpose_part(chord, steps, lean_flat),
        }
    }

    /// Transpose every bracketed chord span in `text`, leaving all other
    /// content byte-identical. Space-separated tokens inside one bracket
    /// transpose independently.
    pub fn transpose_text(&self, text: &str, steps: i32) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        for span in grammar::bracket_spans(text) {
            out.push_str(&text[pos..span.start]);
            let inner = &text[span.start + 1..span.end - 1];

            out.push('[');
            let mut first = true;
            for token in inner.split(' ') {
                if !first {
                    out.push(' ');
                }
                first = false;
                out.push_str(&self.transpose_chord(token, steps));
            }
            out.push(']');

            pos = span.end;
        }

        out.push_str(&text[pos..]);
        out
    }

    fn key_is_flat(&self) -> bool {
        self.key.as_deref().is_some_and(|key| FLAT_KEYS.contains(key))
    }
}

/// Transpose a note-plus-modifier part, preserving the modifier suffix.
///
/// An explicit accidental in the note wins over `lean_flat`: a sharp note
/// stays sharp-spelled, a flat note stays flat-spelled.
fn transpose_part(part: &str, steps: i32, lean_flat: bool) -> String {
    let Some(len) = grammar::note_len(part) else {
        return part.to_string();
    };
    let note = &part[..len];
    let Some(index) = note_index(note) else {
        // Unlisted spellings like Cb pass through unchanged
        return part.to_string();
    };

    let prefer_flats = match note.as_bytes().get(1) {
        Some(b'b') => true,
        Some(b'#') => false,
        _ => lean_flat,
    };

    let new_index = (index as i32 + steps).rem_euclid(12) as usize;
    let name = if prefer_flats {
        FLAT_NAMES[new_index]
    } else {
        SHARP_NAMES[new_index]
    };

    format!("{}{}", name, &part[len..])
}

/// Minor quality on the root part: leading `m` that is not `maj`.
fn is_minor(chord: &str) -> bool {
    let root = chord.split('/').next().unwrap_or(chord);
    let Some(len) = grammar::note_len(root) else {
        return false;
    };
    let quality = &root[len..];
    quality.starts_with('m') && !quality.starts_with("maj")
}
