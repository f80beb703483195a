//! Rich-text payload writer.
//!
//! Serializes plain text back into an RTF payload. Base attributes are
//! applied uniformly; chord bracket spans get their fill and stroke colors
//! replaced with fully transparent entries and their size scaled down, so
//! the chord text survives in the payload without rendering visibly.

use std::fmt::Write;
use std::ops::Range;

use smallvec::SmallVec;

use super::types::{Color, ColorTable, TextAttributes};
use crate::chord::grammar;

/// Size factor applied to chord bracket spans.
const CHORD_SIZE_FACTOR: f32 = 0.7;

/// Scale of `\c` color components in the expanded color table.
const COMPONENT_SCALE: i64 = 100_000;

/// Encode plain text into an RTF payload.
///
/// `base` is applied across the whole text; every ChordPro bracket span is
/// re-styled with transparent colors and a scaled-down size.
pub fn encode_payload(text: &str, base: &TextAttributes) -> Vec<u8> {
    let chord_attrs = TextAttributes {
        font: base.font.clone(),
        size: (base.size * CHORD_SIZE_FACTOR).round(),
        fill: Color::transparent(),
        stroke: Color::transparent(),
        stroke_width: base.stroke_width,
    };

    let segments = split_segments(text);

    // The auto slot occupies index 0; referenced colors follow.
    let mut colors = ColorTable::new();
    colors.push(Color::black());
    let base_fill = colors.add(base.fill);
    let base_stroke = colors.add(base.stroke);
    let chord_color = colors.add(Color::transparent());

    let mut out = String::new();
    out.push_str("{\\rtf1\\ansi\\ansicpg1252");

    // Font table
    out.push_str("{\\fonttbl\\f0\\fnil ");
    out.push_str(&base.font);
    out.push_str(";}");

    // Classic color table, auto slot first
    out.push_str("{\\colortbl;");
    for index in 1..colors.len() {
        let color = colors.get(index).unwrap_or_default();
        let _ = write!(
            out,
            "\\red{}\\green{}\\blue{};",
            color.red, color.green, color.blue
        );
    }
    out.push('}');

    // Expanded color table carries alpha, aligned index-for-index
    out.push_str("{\\*\\expandedcolortbl;");
    for index in 1..colors.len() {
        let color = colors.get(index).unwrap_or_default();
        let _ = write!(
            out,
            "\\csgenericrgb\\c{}\\c{}\\c{}\\c{};",
            component(color.red),
            component(color.green),
            component(color.blue),
            component(color.alpha)
        );
    }
    out.push('}');

    out.push_str("\\f0\\uc0");

    for (range, is_chord) in segments {
        let (attrs, fill, stroke) = if is_chord {
            (&chord_attrs, chord_color, chord_color)
        } else {
            (base, base_fill, base_stroke)
        };
        let _ = write!(
            out,
            "\\fs{}\\cf{}\\strokec{}\\strokewidth{} ",
            attrs.size.round() as i32,
            fill,
            stroke,
            attrs.stroke_width
        );
        escape_into(&text[range], &mut out);
    }

    out.push('}');
    out.into_bytes()
}

/// Scale a 0..=255 component to the expanded color table's 0..=100000.
#[inline]
fn component(value: u8) -> i64 {
    (value as i64 * COMPONENT_SCALE + 127) / 255
}

/// Split text into alternating lyric and chord-span byte ranges.
fn split_segments(text: &str) -> SmallVec<[(Range<usize>, bool); 8]> {
    let mut segments = SmallVec::new();
    let mut pos = 0;

    for span in grammar::bracket_spans(text) {
        if span.start > pos {
            segments.push((pos..span.start, false));
        }
        pos = span.end;
        segments.push((span, true));
    }
    if pos < text.len() {
        segments.push((pos..text.len(), false));
    }

    segments
}

/// Escape a text segment into the output buffer.
fn escape_into(segment: &str, out: &mut String) {
    let mut units = [0u16; 2];
    for ch in segment.chars() {
        match ch {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            },
            '\n' => out.push_str("\\par "),
            '\t' => out.push_str("\\tab "),
            ch if ch.is_ascii() => out.push(ch),
            ch => {
                // \uc0 is in effect, so no fallback character is needed;
                // non-BMP characters become UTF-16 surrogate pairs
                for &unit in ch.encode_utf16(&mut units).iter() {
                    let mut value = unit as i32;
                    if value > 32767 {
                        value -= 65536;
                    }
                    let _ = write!(out, "\\u{} ", value);
                }
            },
        }
    }
}
