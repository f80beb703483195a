//! Key detection and progression analysis.

use serde::Serialize;

use crate::chord::grammar::{self, extract_chords};

/// Count occurrences in first-seen order.
fn count_first_seen<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

/// Most frequent entry; ties break toward the earlier first appearance.
fn most_frequent<'a>(counts: &[(&'a str, usize)]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for &(item, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((item, count));
        }
    }
    best.map(|(item, _)| item)
}

/// Detect the most likely key of a ChordPro text.
///
/// Counts the root note of every bracketed chord token and returns the most
/// frequent one. Ties break by first-seen order during the scan; this is a
/// documented policy, not a music-theoretic judgment.
pub fn detect_key(text: &str) -> Option<String> {
    let roots = chord_tokens(text)
        .filter_map(|token| grammar::ChordToken::parse(token).map(|t| t.root));
    let counts = count_first_seen(roots);
    most_frequent(&counts).map(str::to_string)
}

/// Complexity bucket for a progression, by unique chord count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// At most 4 unique chords
    Simple,
    /// 5 to 7 unique chords
    Moderate,
    /// 8 or more unique chords
    Complex,
}

impl Complexity {
    fn from_unique_count(unique: usize) -> Self {
        match unique {
            0..=4 => Complexity::Simple,
            5..=7 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

/// Summary statistics over a ChordPro progression.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionAnalysis {
    pub total_chords: usize,
    pub unique_chords: usize,
    pub most_common_chord: Option<String>,
    pub suggested_key: Option<String>,
    pub complexity: Complexity,
}

/// Analyze the chord progression of a ChordPro text.
pub fn analyze_progression(text: &str) -> ProgressionAnalysis {
    let tokens: Vec<&str> = chord_tokens(text).collect();
    let counts = count_first_seen(tokens.iter().copied());

    ProgressionAnalysis {
        total_chords: tokens.len(),
        unique_chords: counts.len(),
        most_common_chord: most_frequent(&counts).map(str::to_string),
        suggested_key: detect_key(text),
        complexity: Complexity::from_unique_count(counts.len()),
    }
}

/// Individual chord tokens: bracket contents split on whitespace.
fn chord_tokens(text: &str) -> impl Iterator<Item = &str> {
    extract_chords(text)
        .into_iter()
        .flat_map(str::split_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_key_by_frequency() {
        assert_eq!(
            detect_key("[C]Amazing [F]grace [G]how [C]sweet"),
            Some("C".to_string())
        );
    }

    #[test]
    fn test_detect_key_tie_breaks_first_seen() {
        assert_eq!(detect_key("[G]one [C]two"), Some("G".to_string()));
        // Roots count across qualities: Am and A share the root A
        assert_eq!(detect_key("[C]x [Am]y [A7]z"), Some("A".to_string()));
    }

    #[test]
    fn test_detect_key_empty() {
        assert_eq!(detect_key("no chords here"), None);
        assert_eq!(detect_key("[not a chord]"), None);
    }

    #[test]
    fn test_analyze_progression() {
        let analysis = analyze_progression("[C]a [F]b [G]c [C]d");
        assert_eq!(analysis.total_chords, 4);
        assert_eq!(analysis.unique_chords, 3);
        assert_eq!(analysis.most_common_chord, Some("C".to_string()));
        assert_eq!(analysis.suggested_key, Some("C".to_string()));
        assert_eq!(analysis.complexity, Complexity::Simple);
    }

    #[test]
    fn test_complexity_thresholds() {
        let moderate = "[C]_[Dm]_[Em]_[F]_[G]_";
        assert_eq!(analyze_progression(moderate).complexity, Complexity::Moderate);

        let complex = "[C]_[C#]_[D]_[D#]_[E]_[F]_[F#]_[G]_";
        assert_eq!(analyze_progression(complex).complexity, Complexity::Complex);
    }

    #[test]
    fn test_multiple_tokens_per_bracket() {
        let analysis = analyze_progression("intro [C F G C]");
        assert_eq!(analysis.total_chords, 4);
        assert_eq!(analysis.unique_chords, 3);
    }
}
