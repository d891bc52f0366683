// Word rules. Line clustering always runs first; the rest are picked and
// ordered by the pipeline config.
// - engine.rs: RuleEngine and the ParseRule trait
// - line_clustering.rs: baseline sort and line numbering
// - number_merge.rs: rejoining numbers split on separator spaces

pub mod engine;
pub mod line_clustering;
pub mod number_merge;

pub use engine::*;
