// txtpos Core Library
//
// Rebuilds reading-order lines and rule-line grids from position-tagged word
// tokens. Document decoding happens elsewhere; pages come in through the
// `PageSource` boundary.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grids;
pub mod output;
pub mod processor;
pub mod rules;
pub mod sources;
pub mod types;

// Re-export main types and functions for easy use
pub use config::TxtposConfig;
pub use error::SourceError;
pub use geometry::{Rect, Segment};
pub use grids::{CellMatrix, Grid, GridBuilder};
pub use output::{GridRecordWriter, LineRecordWriter, OutputPaths, RecordSink, LINE_RECORD_FIELDS};
pub use processor::{DocumentProcessor, DocumentSummary, PipelineStages, StepProfiler};
pub use sources::{InMemorySource, JsonPageSource, JsonSourceLoader, PageSource, SourceLoader};
pub use types::*;
