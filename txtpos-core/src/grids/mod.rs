pub mod builder;
pub mod grid;
pub mod serialization;

// Re-export for easy access
pub use builder::GridBuilder;
pub use grid::{CellMatrix, Grid};
pub use serialization::to_delimited_rows;
