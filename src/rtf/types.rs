//! Rich-text type definitions.

use std::ops::Range;

/// RGBA color. Classic RTF color tables carry no alpha; entries read from
/// them are fully opaque. Alpha comes from the expanded color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    /// Create a fully opaque color.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Fully transparent black.
    #[inline]
    pub const fn transparent() -> Self {
        Self {
            red: 0,
            green: 0,
            blue: 0,
            alpha: 0,
        }
    }

    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.alpha == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Color table indexed by `\cf`/`\strokec` references. Index 0 is the
/// "auto" color.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: Vec<Color>,
}

impl ColorTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a color and return its index. Deduplicates exact matches.
    pub fn add(&mut self, color: Color) -> usize {
        if let Some(index) = self.colors.iter().position(|&c| c == color) {
            return index;
        }
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Append a color without deduplication. Decoding relies on table
    /// positions matching the source document, so entries must not collapse.
    #[inline]
    pub fn push(&mut self, color: Color) {
        self.colors.push(color);
    }

    /// Overwrite the color at `index`, growing the table as needed.
    pub fn set(&mut self, index: usize, color: Color) {
        if index >= self.colors.len() {
            self.colors.resize(index + 1, Color::black());
        }
        self.colors[index] = color;
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Formatting attributes applied over a range of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAttributes {
    /// Font name
    pub font: String,
    /// Font size, in the units of the `\fs` parameter
    pub size: f32,
    /// Foreground fill color
    pub fill: Color,
    /// Outline stroke color
    pub stroke: Color,
    /// Outline stroke width
    pub stroke_width: i32,
}

impl Default for TextAttributes {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            size: 117.0,
            fill: Color::white(),
            stroke: Color::black(),
            stroke_width: 2,
        }
    }
}

/// A contiguous byte range of the plain text sharing one attribute set.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRun {
    pub range: Range<usize>,
    pub attrs: TextAttributes,
}
