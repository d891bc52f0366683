//! JSON page dumps
//!
//! Reads the word/segment dump written by an external decoder:
//!
//! ```json
//! {"pages": [{"words": [{"x1": 10.0, "y1": 100.0, "x2": 30.0, "y2": 100.0,
//!                        "text": "Foo", "font_name": "Helvetica",
//!                        "font_size": 10.0, "space_width": 2.78}],
//!             "segments": [{"x1": 5.0, "y1": 90.0, "x2": 200.0, "y2": 90.0}]}]}
//! ```
//!
//! The outer document is parsed eagerly; each page is only deserialized when
//! requested, so a malformed page fails alone.

use super::traits::{PageSource, SourceLoader};
use crate::error::SourceError;
use crate::geometry::Segment;
use crate::types::{PageContent, WordToken};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Deserialize)]
struct RawDocument {
    pages: Vec<Value>,
}

#[derive(Deserialize)]
struct RawPage {
    words: Vec<WordToken>,
    #[serde(default)]
    segments: Vec<Segment>,
}

pub struct JsonPageSource {
    pages: Vec<Value>,
}

impl JsonPageSource {
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let document: RawDocument = serde_json::from_str(json)?;
        Ok(Self {
            pages: document.pages,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

impl PageSource for JsonPageSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn load_page(&self, page_number: u32) -> Result<PageContent, SourceError> {
        let raw = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or(SourceError::PageOutOfRange {
                page: page_number,
                page_count: self.page_count(),
            })?;

        let page = RawPage::deserialize(raw).map_err(|source| SourceError::MalformedPage {
            page: page_number,
            source,
        })?;

        // Line numbers are ours to assign, whatever the dump says.
        let words = page
            .words
            .into_iter()
            .map(|mut w| {
                w.line_nb = None;
                w
            })
            .collect();

        Ok(PageContent {
            page_number,
            words,
            segments: page.segments,
        })
    }

    fn name(&self) -> &str {
        "JsonPageSource"
    }
}

/// Loader for `.json` page dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSourceLoader;

impl SourceLoader for JsonSourceLoader {
    type Source = JsonPageSource;

    fn open(&self, path: &Path) -> Result<JsonPageSource, SourceError> {
        JsonPageSource::from_file(path)
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}
