use crate::geometry::{Rect, Segment};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Digits only: no sign, decimal point or grouping characters.
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// A word as handed over by the document decoder.
///
/// `y1` and `y2` play different roles during line reconstruction: `y2` is the
/// primary sort key, `y1` the clustering reference. Keep them separate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub text: String,
    pub font_name: String,
    pub font_size: f64,
    /// Width of one space glyph in this word's font
    pub space_width: f64,
    /// Assigned by line clustering; `None` straight out of the decoder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_nb: Option<u32>,
}

impl WordToken {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, text: &str) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            text: text.to_string(),
            font_name: String::new(),
            font_size: 0.0,
            space_width: 0.0,
            line_nb: None,
        }
    }

    pub fn with_font(mut self, font_name: &str, font_size: f64, space_width: f64) -> Self {
        self.font_name = font_name.to_string();
        self.font_size = font_size;
        self.space_width = space_width;
        self
    }

    pub fn is_number(&self) -> bool {
        NUMBER_REGEX.is_match(&self.text)
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            left: self.x1.min(self.x2),
            top: self.y1.min(self.y2),
            right: self.x1.max(self.x2),
            bottom: self.y1.max(self.y2),
        }
    }

    /// Centre of the bounding box, used to place the word in a grid cell.
    pub fn reference_point(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Absorb `other` (the word to the right) into this one.
    ///
    /// Text is concatenated without a separator; the box grows to the union of
    /// both boxes. Font data and line number stay from `self`.
    pub fn merge(&mut self, other: WordToken) {
        self.text.push_str(&other.text);
        self.x1 = self.x1.min(other.x1);
        self.x2 = self.x2.max(other.x2);
        self.y1 = self.y1.min(other.y1);
        self.y2 = self.y2.max(other.y2);
    }

    /// Render as one line-oriented record (without the trailing newline).
    ///
    /// Field order: page, line, x1, y1, x2, y2, font name, font size,
    /// space width, text.
    pub fn to_record(&self, page_number: u32, delimiter: &str) -> String {
        let line = self
            .line_nb
            .map(|n| n.to_string())
            .unwrap_or_default();
        [
            page_number.to_string(),
            line,
            self.x1.to_string(),
            self.y1.to_string(),
            self.x2.to_string(),
            self.y2.to_string(),
            self.font_name.clone(),
            self.font_size.to_string(),
            self.space_width.to_string(),
            self.text.clone(),
        ]
        .join(delimiter)
    }
}

/// Everything the decoder yields for one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    /// 1-based page number
    pub page_number: u32,
    pub words: Vec<WordToken>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// Words sharing one line number, left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub number: u32,
    pub words: Vec<WordToken>,
}

/// Split a line-tagged, line-ordered word list into consecutive lines.
///
/// Words without a line number are gathered under line 0; callers run line
/// clustering first so this does not happen in the pipeline.
pub fn group_into_lines(words: Vec<WordToken>) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    for word in words {
        let number = word.line_nb.unwrap_or(0);
        match lines.last_mut() {
            Some(line) if line.number == number => line.words.push(word),
            _ => lines.push(Line {
                number,
                words: vec![word],
            }),
        }
    }
    lines
}

/// Inverse of [`group_into_lines`].
pub fn flatten_lines(lines: Vec<Line>) -> Vec<WordToken> {
    lines.into_iter().flat_map(|line| line.words).collect()
}
