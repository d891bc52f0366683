use crate::geometry::Rect;
use crate::types::WordToken;
use serde::{Deserialize, Serialize};

/// Rows of cells, each cell holding the text of the words placed in it.
pub type CellMatrix = Vec<Vec<String>>;

/// A rectangular partition of part of a page into row and column bands.
///
/// `rows` holds y boundaries and `columns` x boundaries, both strictly
/// increasing with at least two entries, so there is always at least one
/// band in each direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub bounds: Rect,
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
    /// Rule segments that produced this grid
    pub segment_count: usize,
}

impl Grid {
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// Cell of `word`, judged by the centre of its box.
    ///
    /// Without vertical lines every row is a single cell, so the column is
    /// always 0 (but the word must still lie inside the grid's x-extent).
    pub fn locate(&self, word: &WordToken, use_vertical_lines: bool) -> Option<(usize, usize)> {
        let (x, y) = word.reference_point();
        let row = band_index(&self.rows, y)?;
        let column = band_index(&self.columns, x)?;
        Some((row, if use_vertical_lines { column } else { 0 }))
    }

    /// Place every word in its cell. Words are expected in reading order;
    /// words outside the grid are skipped.
    pub fn map_words(&self, words: &[WordToken], use_vertical_lines: bool) -> CellMatrix {
        let width = if use_vertical_lines {
            self.column_count()
        } else {
            1
        };
        let mut cells = vec![vec![String::new(); width]; self.row_count()];

        for word in words {
            let Some((row, column)) = self.locate(word, use_vertical_lines) else {
                continue;
            };
            let cell = &mut cells[row][column];
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(&word.text);
        }
        cells
    }
}

/// Index of the band containing `value`.
///
/// Bands are half-open `[b[i], b[i+1])` except the last, which also takes
/// its upper boundary, so each value falls in at most one band.
fn band_index(boundaries: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (*boundaries.first()?, *boundaries.last()?);
    if boundaries.len() < 2 || value.is_nan() || value < first || value > last {
        return None;
    }
    let at_or_below = boundaries.partition_point(|b| *b <= value);
    Some((at_or_below - 1).min(boundaries.len() - 2))
}
