//! RTF lexer/tokenizer.
//!
//! Tokenizes the payload dialect used by slide text elements: document
//! header words, font and color tables (classic and expanded), character
//! formatting relevant to chord hiding, and escapes. Everything else
//! surfaces as [`ControlWord::Unknown`] and is skipped by the parser.

use super::error::{RtfError, RtfResult};
use std::borrow::Cow;

/// Control word with optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord<'a> {
    // Document structure
    Rtf(i32),
    Ansi,
    AnsiCodePage(i32),

    // Header groups
    FontTable,
    ColorTable,
    ExpandedColorTable,

    // Font properties
    FontNumber(i32),
    FontSize(i32),
    FontFamily(&'a str),

    // Colors
    Red(i32),
    Green(i32),
    Blue(i32),
    ColorForeground(i32),
    /// `\cN` component inside the expanded color table, scaled 0..=100000
    ColorComponent(i32),
    /// `\csgenericrgb` entry marker inside the expanded color table
    GenericRgb,

    // Outline
    StrokeColor(i32),
    StrokeWidth(i32),

    // Flow
    Par,
    Line,
    Tab,

    // Unicode
    Unicode(i32),
    UnicodeSkip(i32),

    // Ignorable destination marker (`\*`)
    IgnorableDestination,

    // Unknown control word
    Unknown(&'a str, Option<i32>),
}

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Opening brace
    OpenBrace,
    /// Closing brace
    CloseBrace,
    /// Control word
    Control(ControlWord<'a>),
    /// Plain text
    Text(Cow<'a, str>),
}

/// RTF lexer over a borrowed input string.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current position in bytes
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> RtfResult<Vec<Token<'a>>> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            // Raw line breaks are formatting noise in RTF, not content
            if matches!(self.current_byte(), b'\r' | b'\n') {
                self.pos += 1;
                continue;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> RtfResult<Token<'a>> {
        match self.current_byte() {
            b'{' => {
                self.pos += 1;
                Ok(Token::OpenBrace)
            },
            b'}' => {
                self.pos += 1;
                Ok(Token::CloseBrace)
            },
            b'\\' => self.parse_control_word(),
            _ => Ok(self.parse_text()),
        }
    }

    /// Parse a control word or control symbol.
    fn parse_control_word(&mut self) -> RtfResult<Token<'a>> {
        self.pos += 1; // Skip '\'

        if self.pos >= self.input.len() {
            return Err(RtfError::UnexpectedEof);
        }

        match self.current_byte() {
            b'\\' | b'{' | b'}' => {
                let text = &self.input[self.pos..self.pos + 1];
                self.pos += 1;
                return Ok(Token::Text(Cow::Borrowed(text)));
            },
            b'\'' => return self.parse_hex_escape(),
            b'*' => {
                self.pos += 1;
                return Ok(Token::Control(ControlWord::IgnorableDestination));
            },
            b'~' => {
                self.pos += 1;
                return Ok(Token::Text(Cow::Borrowed("\u{00A0}")));
            },
            b'\r' | b'\n' => {
                self.pos += 1;
                return Ok(Token::Control(ControlWord::Par));
            },
            _ => {},
        }

        let start = self.pos;
        while self.pos < self.input.len() && self.current_byte().is_ascii_alphabetic() {
            self.pos += 1;
        }

        if start == self.pos {
            return Err(RtfError::InvalidControlWord(format!(
                "unrecognized control symbol at byte {}",
                self.pos
            )));
        }

        let word = &self.input[start..self.pos];
        let param = self.parse_numeric_parameter()?;

        // A single space after a control word is a delimiter, not content
        if self.pos < self.input.len() && self.current_byte() == b' ' {
            self.pos += 1;
        }

        Ok(Token::Control(Self::match_control_word(word, param)))
    }

    /// Parse optional numeric parameter after a control word.
    fn parse_numeric_parameter(&mut self) -> RtfResult<Option<i32>> {
        if self.pos >= self.input.len() {
            return Ok(None);
        }

        let byte = self.current_byte();
        if !byte.is_ascii_digit() && byte != b'-' {
            return Ok(None);
        }

        let start = self.pos;
        if byte == b'-' {
            self.pos += 1;
        }
        while self.pos < self.input.len() && self.current_byte().is_ascii_digit() {
            self.pos += 1;
        }

        let num = self.input[start..self.pos].parse::<i32>()?;
        Ok(Some(num))
    }

    fn match_control_word(word: &'a str, param: Option<i32>) -> ControlWord<'a> {
        let param_value = param.unwrap_or(1);

        match word {
            // Document
            "rtf" => ControlWord::Rtf(param_value),
            "ansi" => ControlWord::Ansi,
            "ansicpg" => ControlWord::AnsiCodePage(param_value),

            // Headers
            "fonttbl" => ControlWord::FontTable,
            "colortbl" => ControlWord::ColorTable,
            "expandedcolortbl" => ControlWord::ExpandedColorTable,

            // Fonts
            "f" => ControlWord::FontNumber(param_value),
            "fs" => ControlWord::FontSize(param_value),
            "fnil" => ControlWord::FontFamily("nil"),
            "froman" => ControlWord::FontFamily("roman"),
            "fswiss" => ControlWord::FontFamily("swiss"),
            "fmodern" => ControlWord::FontFamily("modern"),

            // Colors
            "red" => ControlWord::Red(param_value),
            "green" => ControlWord::Green(param_value),
            "blue" => ControlWord::Blue(param_value),
            "cf" => ControlWord::ColorForeground(param_value),
            "c" => ControlWord::ColorComponent(param_value),
            "csgenericrgb" => ControlWord::GenericRgb,

            // Outline
            "strokec" => ControlWord::StrokeColor(param_value),
            "strokewidth" => ControlWord::StrokeWidth(param_value),

            // Flow
            "par" => ControlWord::Par,
            "line" => ControlWord::Line,
            "tab" => ControlWord::Tab,

            // Unicode
            "u" => ControlWord::Unicode(param_value),
            "uc" => ControlWord::UnicodeSkip(param_value),

            _ => ControlWord::Unknown(word, param),
        }
    }

    /// Parse a hexadecimal character escape (`\'xx`).
    fn parse_hex_escape(&mut self) -> RtfResult<Token<'a>> {
        self.pos += 1; // Skip '\''

        // Boundary check also rejects multibyte characters where the two
        // hex digits should be
        if self.pos + 2 > self.input.len() || !self.input.is_char_boundary(self.pos + 2) {
            return Err(RtfError::InvalidEscape("incomplete hex escape".to_string()));
        }

        let hex = &self.input[self.pos..self.pos + 2];
        self.pos += 2;

        let byte = u8::from_str_radix(hex, 16)
            .map_err(|_| RtfError::InvalidEscape(format!("invalid hex escape: {}", hex)))?;

        // Hex escapes encode the document code page, Windows-1252 here
        let bytes = [byte];
        let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes);
        Ok(Token::Text(Cow::Owned(decoded.into_owned())))
    }

    /// Parse plain text until a special character.
    fn parse_text(&mut self) -> Token<'a> {
        let start = self.pos;
        while self.pos < self.input.len()
            && !matches!(self.current_byte(), b'\\' | b'{' | b'}' | b'\r' | b'\n')
        {
            self.pos += 1;
        }
        Token::Text(Cow::Borrowed(&self.input[start..self.pos]))
    }

    #[inline]
    fn current_byte(&self) -> u8 {
        self.input.as_bytes()[self.pos]
    }
}
