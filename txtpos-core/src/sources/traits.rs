// Page source abstraction
//
// This module defines the boundary between document decoding (native format ->
// words and rule segments) and geometric reconstruction (words -> lines and
// grids). Everything after this point is format-agnostic.

use crate::error::SourceError;
use crate::types::PageContent;
use std::path::Path;

/// A decoded document that hands out one page at a time.
///
/// Pages are loaded independently so that a broken page only costs itself.
pub trait PageSource {
    /// Number of pages in the document
    fn page_count(&self) -> u32;

    /// Load one page (1-based)
    fn load_page(&self, page_number: u32) -> Result<PageContent, SourceError>;

    /// Source name for logging/debugging
    fn name(&self) -> &str;
}

/// Opens files into page sources.
pub trait SourceLoader {
    type Source: PageSource;

    fn open(&self, path: &Path) -> Result<Self::Source, SourceError>;

    /// Check if the loader supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Pages already in memory, e.g. produced by an embedded decoder.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pages: Vec<PageContent>,
}

impl InMemorySource {
    /// Page numbers are taken from position; any `page_number` set on the
    /// input is overwritten.
    pub fn new(pages: Vec<PageContent>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, mut page)| {
                page.page_number = i as u32 + 1;
                page
            })
            .collect();
        Self { pages }
    }
}

impl PageSource for InMemorySource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn load_page(&self, page_number: u32) -> Result<PageContent, SourceError> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .cloned()
            .ok_or(SourceError::PageOutOfRange {
                page: page_number,
                page_count: self.page_count(),
            })
    }

    fn name(&self) -> &str {
        "InMemorySource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_numbered_from_one() {
        let source = InMemorySource::new(vec![PageContent::default(), PageContent::default()]);
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.load_page(2).unwrap().page_number, 2);
        assert!(matches!(
            source.load_page(0),
            Err(SourceError::PageOutOfRange { page: 0, page_count: 2 })
        ));
        assert!(source.load_page(3).is_err());
    }
}
