//! Rich-text document parser.
//!
//! Builds plain text plus attribute runs from the token stream. Group
//! braces scope formatting state; header destinations (font table, classic
//! and expanded color tables) are collected into lookup tables before the
//! body is walked.

use std::collections::HashMap;

use smallvec::{SmallVec, smallvec};

use super::error::{RtfError, RtfResult};
use super::lexer::{ControlWord, Lexer, Token};
use super::types::{AttributeRun, Color, ColorTable, TextAttributes};

/// Scale of `\c` color components in the expanded color table.
const COMPONENT_SCALE: i64 = 100_000;

/// Plain text plus attribute runs recovered from a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RichText {
    /// The visible plain text
    pub text: String,
    /// Formatting runs over byte ranges of `text`
    pub runs: Vec<AttributeRun>,
}

impl RichText {
    /// Wrap raw text with a single default-attribute run.
    pub fn plain(text: &str) -> Self {
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![AttributeRun {
                range: 0..text.len(),
                attrs: TextAttributes::default(),
            }]
        };
        Self {
            text: text.to_string(),
            runs,
        }
    }

    /// Attributes of the first character, or the fixed baseline when the
    /// text is empty.
    pub fn base_attributes(&self) -> TextAttributes {
        self.runs
            .first()
            .map(|run| run.attrs.clone())
            .unwrap_or_default()
    }

    /// Parse an RTF document.
    pub fn parse(input: &str) -> RtfResult<Self> {
        Parser::default().parse(input)
    }
}

/// What the current group's content means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Body,
    FontTable,
    ColorTable,
    ExpandedColorTable,
    /// Unrecognized ignorable destination, contents dropped
    Skip,
}

#[derive(Debug, Clone)]
struct GroupState {
    attrs: TextAttributes,
    dest: Destination,
}

#[derive(Default)]
struct Parser {
    text: String,
    runs: Vec<AttributeRun>,
    fonts: HashMap<i32, String>,
    colors: ColorTable,

    // Font table accumulation
    font_slot: i32,
    font_name: String,

    // Classic color table accumulation
    rgb: (u8, u8, u8),
    rgb_seen: bool,

    // Expanded color table accumulation
    expanded_index: usize,
    components: SmallVec<[i32; 4]>,

    // Unicode fallback handling
    uc_skip: usize,
    pending_skip: usize,
    // High surrogate waiting for its low half
    pending_high: Option<u16>,
}

impl Parser {
    fn parse(mut self, input: &str) -> RtfResult<RichText> {
        let tokens = Lexer::new(input).tokenize()?;

        if !matches!(
            (tokens.first(), tokens.get(1)),
            (Some(Token::OpenBrace), Some(Token::Control(ControlWord::Rtf(_))))
        ) {
            return Err(RtfError::MalformedDocument(
                "payload does not start with an \\rtf group".to_string(),
            ));
        }

        self.uc_skip = 1;

        let mut stack: SmallVec<[GroupState; 8]> = smallvec![];
        let mut ignorable_pending = false;

        for token in tokens {
            match token {
                Token::OpenBrace => {
                    let state = stack.last().cloned().unwrap_or(GroupState {
                        attrs: TextAttributes::default(),
                        dest: Destination::Body,
                    });
                    stack.push(state);
                },
                Token::CloseBrace => {
                    if stack.pop().is_none() {
                        return Err(RtfError::MalformedDocument(
                            "unbalanced closing brace".to_string(),
                        ));
                    }
                },
                Token::Control(word) => {
                    let Some(group) = stack.last_mut() else {
                        return Err(RtfError::MalformedDocument(
                            "control word outside any group".to_string(),
                        ));
                    };

                    if ignorable_pending {
                        ignorable_pending = false;
                        if word == ControlWord::ExpandedColorTable {
                            group.dest = Destination::ExpandedColorTable;
                            self.expanded_index = 0;
                            self.components.clear();
                            continue;
                        }
                        group.dest = Destination::Skip;
                        continue;
                    }

                    match group.dest {
                        Destination::Body => match word {
                            ControlWord::IgnorableDestination => ignorable_pending = true,
                            ControlWord::FontTable => {
                                group.dest = Destination::FontTable;
                                self.font_slot = 0;
                                self.font_name.clear();
                            },
                            ControlWord::ColorTable => {
                                group.dest = Destination::ColorTable;
                                self.rgb = (0, 0, 0);
                                self.rgb_seen = false;
                            },
                            ControlWord::FontNumber(n) => {
                                if let Some(name) = self.fonts.get(&n) {
                                    group.attrs.font = name.clone();
                                }
                            },
                            ControlWord::FontSize(n) => group.attrs.size = n as f32,
                            ControlWord::ColorForeground(n) => {
                                if let Some(color) = self.colors.get(n as usize) {
                                    group.attrs.fill = color;
                                }
                            },
                            ControlWord::StrokeColor(n) => {
                                if let Some(color) = self.colors.get(n as usize) {
                                    group.attrs.stroke = color;
                                }
                            },
                            ControlWord::StrokeWidth(n) => group.attrs.stroke_width = n,
                            ControlWord::Par | ControlWord::Line => {
                                let attrs = group.attrs.clone();
                                self.push_text("\n", &attrs);
                            },
                            ControlWord::Tab => {
                                let attrs = group.attrs.clone();
                                self.push_text("\t", &attrs);
                            },
                            ControlWord::UnicodeSkip(n) => self.uc_skip = n.max(0) as usize,
                            ControlWord::Unicode(n) => {
                                let code = (if n < 0 { n + 65536 } else { n }) as u32;
                                let attrs = group.attrs.clone();
                                // Non-BMP characters arrive as two \u words
                                // forming a UTF-16 surrogate pair
                                match (self.pending_high.take(), code) {
                                    (Some(high), 0xDC00..=0xDFFF) => {
                                        let combined = 0x10000
                                            + ((high as u32 - 0xD800) << 10)
                                            + (code - 0xDC00);
                                        if let Some(ch) = char::from_u32(combined) {
                                            self.push_text(&ch.to_string(), &attrs);
                                        }
                                    },
                                    (_, 0xD800..=0xDBFF) => {
                                        self.pending_high = Some(code as u16);
                                    },
                                    (_, code) => {
                                        if let Some(ch) = char::from_u32(code) {
                                            self.push_text(&ch.to_string(), &attrs);
                                        }
                                    },
                                }
                                self.pending_skip = self.uc_skip;
                            },
                            _ => {},
                        },
                        Destination::FontTable => match word {
                            ControlWord::FontNumber(n) => {
                                self.font_slot = n;
                                self.font_name.clear();
                            },
                            _ => {},
                        },
                        Destination::ColorTable => match word {
                            ControlWord::Red(n) => {
                                self.rgb.0 = n.clamp(0, 255) as u8;
                                self.rgb_seen = true;
                            },
                            ControlWord::Green(n) => {
                                self.rgb.1 = n.clamp(0, 255) as u8;
                                self.rgb_seen = true;
                            },
                            ControlWord::Blue(n) => {
                                self.rgb.2 = n.clamp(0, 255) as u8;
                                self.rgb_seen = true;
                            },
                            _ => {},
                        },
                        Destination::ExpandedColorTable => match word {
                            ControlWord::GenericRgb => self.components.clear(),
                            ControlWord::ColorComponent(c) => self.components.push(c),
                            _ => {},
                        },
                        Destination::Skip => {},
                    }
                },
                Token::Text(content) => {
                    let Some(group) = stack.last() else {
                        // Trailing bytes after the final close are tolerated
                        continue;
                    };
                    ignorable_pending = false;

                    match group.dest {
                        Destination::Body => {
                            let attrs = group.attrs.clone();
                            self.push_body_text(&content, &attrs);
                        },
                        Destination::FontTable => self.collect_font_entries(&content),
                        Destination::ColorTable => self.collect_color_entries(&content),
                        Destination::ExpandedColorTable => {
                            self.collect_expanded_entries(&content);
                        },
                        Destination::Skip => {},
                    }
                },
            }
        }

        Ok(RichText {
            text: self.text,
            runs: self.runs,
        })
    }

    /// Append body text, honoring any pending unicode fallback skip.
    fn push_body_text(&mut self, content: &str, attrs: &TextAttributes) {
        let mut content = content;
        while self.pending_skip > 0 && !content.is_empty() {
            let mut chars = content.chars();
            chars.next();
            content = chars.as_str();
            self.pending_skip -= 1;
        }
        self.push_text(content, attrs);
    }

    /// Append text, extending the previous run when attributes match.
    fn push_text(&mut self, content: &str, attrs: &TextAttributes) {
        if content.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(content);

        if let Some(last) = self.runs.last_mut()
            && last.range.end == start
            && last.attrs == *attrs
        {
            last.range.end = self.text.len();
        } else {
            self.runs.push(AttributeRun {
                range: start..self.text.len(),
                attrs: attrs.clone(),
            });
        }
    }

    /// Font table text: entries terminated by ';'.
    fn collect_font_entries(&mut self, content: &str) {
        for ch in content.chars() {
            if ch == ';' {
                let name = self.font_name.trim().to_string();
                if !name.is_empty() {
                    self.fonts.insert(self.font_slot, name);
                }
                self.font_name.clear();
            } else {
                self.font_name.push(ch);
            }
        }
    }

    /// Classic color table text: every ';' finalizes one entry. An entry
    /// with no components is the "auto" slot.
    fn collect_color_entries(&mut self, content: &str) {
        for ch in content.chars() {
            if ch != ';' {
                continue;
            }
            let color = if self.rgb_seen {
                Color::new(self.rgb.0, self.rgb.1, self.rgb.2)
            } else {
                Color::black()
            };
            self.colors.push(color);
            self.rgb = (0, 0, 0);
            self.rgb_seen = false;
        }
    }

    /// Expanded color table text: entries align index-for-index with the
    /// classic table; entries with components override it, adding alpha.
    fn collect_expanded_entries(&mut self, content: &str) {
        for ch in content.chars() {
            if ch != ';' {
                continue;
            }
            if self.components.len() >= 3 {
                let scale = |c: i32| -> u8 {
                    ((c.max(0) as i64 * 255 + COMPONENT_SCALE / 2) / COMPONENT_SCALE).min(255) as u8
                };
                let alpha = self.components.get(3).copied().map_or(255, scale);
                let color = Color {
                    red: scale(self.components[0]),
                    green: scale(self.components[1]),
                    blue: scale(self.components[2]),
                    alpha,
                };
                self.colors.set(self.expanded_index, color);
            }
            self.expanded_index += 1;
            self.components.clear();
        }
    }
}
