//! Chord bracket scanning and chord-spelling grammar.

use std::ops::Range;

use memchr::memchr;

/// Byte ranges of `[...]` spans, brackets included, in left-to-right order.
///
/// Matching is non-greedy and brackets do not nest: a span runs from the
/// last `[` before a `]` to that `]`. Inner content is not validated here;
/// malformed bracket content still forms a span.
pub fn bracket_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(open_offset) = memchr(b'[', &bytes[pos..]) {
        let mut open = pos + open_offset;
        let Some(close_offset) = memchr(b']', &bytes[open + 1..]) else {
            break;
        };
        let close = open + 1 + close_offset;

        // No nesting: restart the span at the innermost '['
        if let Some(inner) = memchr::memrchr(b'[', &bytes[open + 1..close]) {
            open = open + 1 + inner;
        }

        spans.push(open..close + 1);
        pos = close + 1;
    }

    spans
}

/// The inner strings of all bracket spans, verbatim and in order.
pub fn extract_chords(text: &str) -> Vec<&str> {
    bracket_spans(text)
        .into_iter()
        .map(|span| &text[span.start + 1..span.end - 1])
        .collect()
}

/// Parsed view of a chord string.
///
/// Transient, derived from text; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordToken<'a> {
    /// Root note: letter plus optional accidental, e.g. `C`, `F#`, `Bb`
    pub root: &'a str,
    /// Quality and extension text after the root, possibly empty
    pub quality: &'a str,
    /// Slash bass note, if present
    pub bass: Option<&'a str>,
}

impl<'a> ChordToken<'a> {
    /// Parse a chord string, returning `None` when it does not fit the
    /// grammar.
    pub fn parse(token: &'a str) -> Option<Self> {
        let (chord, bass) = match token.split_once('/') {
            Some((chord, bass)) => (chord, Some(bass)),
            None => (token, None),
        };

        let root_len = note_len(chord)?;
        let quality = &chord[root_len..];
        if !valid_quality(quality) {
            return None;
        }

        // The bass is a bare note of the same root grammar
        if let Some(bass) = bass
            && note_len(bass) != Some(bass.len())
        {
            return None;
        }

        Some(Self {
            root: &chord[..root_len],
            quality,
            bass,
        })
    }
}

/// Grammar check for a chord token.
pub fn is_valid_chord(token: &str) -> bool {
    ChordToken::parse(token).is_some()
}

/// Length in bytes of the leading note (letter A-G plus optional `#`/`b`),
/// or `None` when the input does not start with a root letter.
pub(crate) fn note_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !matches!(bytes.first(), Some(b'A'..=b'G')) {
        return None;
    }
    match bytes.get(1) {
        Some(b'#') | Some(b'b') => Some(2),
        _ => Some(1),
    }
}

/// Quality suffix grammar: empty, or one of the known quality words
/// optionally followed by digits, or bare digits.
fn valid_quality(quality: &str) -> bool {
    if quality.is_empty() {
        return true;
    }

    // "m" last so "maj" wins
    const QUALITIES: [&str; 7] = ["maj", "dim", "aug", "sus2", "sus4", "add", "m"];
    for word in QUALITIES {
        if let Some(rest) = quality.strip_prefix(word) {
            return rest.is_empty() || rest.bytes().all(|b| b.is_ascii_digit());
        }
    }

    quality.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_order() {
        assert_eq!(
            extract_chords("[C]Amazing [F]grace [G]how [Am]sweet"),
            ["C", "F", "G", "Am"]
        );
    }

    #[test]
    fn test_extract_keeps_malformed_content() {
        assert_eq!(extract_chords("[not a chord] and [C]"), ["not a chord", "C"]);
        assert_eq!(extract_chords("[]"), [""]);
    }

    #[test]
    fn test_no_nesting_takes_innermost() {
        assert_eq!(extract_chords("x[a[C]y"), ["C"]);
    }

    #[test]
    fn test_unclosed_bracket_ignored() {
        assert!(extract_chords("no closing [C here").is_empty());
        assert_eq!(extract_chords("[C] trailing [open"), ["C"]);
    }

    #[test]
    fn test_valid_chords() {
        for chord in [
            "C", "F#", "Bb", "Am", "Cmaj7", "G7", "Dsus4", "Esus2", "Badd9", "Cdim", "Gaug",
            "C/E", "Am/C", "F#m7/C#", "A6", "D13",
        ] {
            assert!(is_valid_chord(chord), "{chord} should be valid");
        }
    }

    #[test]
    fn test_invalid_chords() {
        for token in [
            "", "H", "c", "C$", "Csus3x", "C/", "C/Em", "C//E", "Cmaj7b5", "1C",
        ] {
            assert!(!is_valid_chord(token), "{token} should be invalid");
        }
    }

    #[test]
    fn test_token_decomposition() {
        let token = ChordToken::parse("F#m7/C#").unwrap();
        assert_eq!(token.root, "F#");
        assert_eq!(token.quality, "m7");
        assert_eq!(token.bass, Some("C#"));

        let plain = ChordToken::parse("Bb").unwrap();
        assert_eq!(plain.root, "Bb");
        assert_eq!(plain.quality, "");
        assert_eq!(plain.bass, None);
    }
}
