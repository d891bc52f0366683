use super::grid::CellMatrix;

/// One delimiter-joined string per row.
///
/// Cell text is written as-is; a delimiter inside a cell is not escaped.
pub fn to_delimited_rows(cells: &CellMatrix, delimiter: &str) -> Vec<String> {
    cells.iter().map(|row| row.join(delimiter)).collect()
}
