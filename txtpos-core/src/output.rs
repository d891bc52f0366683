use crate::grids::{to_delimited_rows, CellMatrix};
use crate::types::WordToken;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Field legend for line records, in output order.
pub const LINE_RECORD_FIELDS: [&str; 10] = [
    "page",
    "line",
    "x1",
    "y1",
    "x2",
    "y2",
    "font name",
    "font size",
    "space width",
    "text",
];

/// Where the record files for `input` go: next to it, same stem.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub lines: PathBuf,
    pub grid: PathBuf,
}

impl OutputPaths {
    pub fn for_input(input: &Path) -> Self {
        Self {
            lines: input.with_extension("info"),
            grid: input.with_extension("grid"),
        }
    }
}

/// Writes one record per word.
pub struct LineRecordWriter<W: Write> {
    out: W,
    delimiter: String,
    records: usize,
}

impl<W: Write> LineRecordWriter<W> {
    pub fn new(out: W, delimiter: &str) -> Self {
        Self {
            out,
            delimiter: delimiter.to_string(),
            records: 0,
        }
    }

    /// Words must already be line-tagged and in reading order.
    pub fn write_page(&mut self, page_number: u32, words: &[WordToken]) -> io::Result<usize> {
        for word in words {
            writeln!(self.out, "{}", word.to_record(page_number, &self.delimiter))?;
        }
        self.records += words.len();
        Ok(words.len())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Writes grid cell matrices, one row per line.
pub struct GridRecordWriter<W: Write> {
    out: W,
    delimiter: String,
    rows: usize,
}

impl<W: Write> GridRecordWriter<W> {
    pub fn new(out: W, delimiter: &str) -> Self {
        Self {
            out,
            delimiter: delimiter.to_string(),
            rows: 0,
        }
    }

    pub fn write_grid(&mut self, cells: &CellMatrix) -> io::Result<usize> {
        let rows = to_delimited_rows(cells, &self.delimiter);
        for row in &rows {
            writeln!(self.out, "{row}")?;
        }
        self.rows += rows.len();
        Ok(rows.len())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Both record streams of one document. The grid stream is optional.
pub struct RecordSink<W: Write> {
    pub lines: LineRecordWriter<W>,
    pub grids: Option<GridRecordWriter<W>>,
}

impl<W: Write> RecordSink<W> {
    pub fn new(lines: LineRecordWriter<W>, grids: Option<GridRecordWriter<W>>) -> Self {
        Self { lines, grids }
    }

    pub fn finish(self) -> io::Result<(W, Option<W>)> {
        let lines = self.lines.finish()?;
        let grids = self.grids.map(GridRecordWriter::finish).transpose()?;
        Ok((lines, grids))
    }
}
