use crate::config::TxtposConfig;
use crate::grids::{to_delimited_rows, CellMatrix, Grid, GridBuilder};
use crate::output::{GridRecordWriter, LineRecordWriter, OutputPaths, RecordSink};
use crate::rules::RuleEngine;
use crate::sources::{JsonSourceLoader, PageSource, SourceLoader};
use crate::types::{PageContent, WordToken};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs of one page
/// Used for diagnostics: lets you inspect/compare each boundary
#[derive(Debug, Clone, Serialize)]
pub struct PageStages {
    pub page: PageContent,
    pub clustered: Vec<WordToken>,
    pub merged: Vec<WordToken>,
    pub grids: Vec<Grid>,
    pub grid_rows: Vec<Vec<String>>,
}

/// Captured intermediate outputs of every page in the range
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStages {
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub pages: Vec<PageStages>,
    pub failed_pages: Vec<u32>,
}

/// Per-document counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub pages_processed: u32,
    pub pages_failed: u32,
    pub word_records: usize,
    pub grid_rows: usize,
}

/// One page after reconstruction.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page_number: u32,
    /// Merged, line-tagged words in reading order
    pub words: Vec<WordToken>,
    pub grids: Vec<Grid>,
    /// One cell matrix per grid, same order
    pub cells: Vec<CellMatrix>,
}

/// Simple profiler that collects timings for pipeline steps
///
/// Steps with the same name accumulate, so per-page steps add up over a
/// document.
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        self.record(step_name, start.elapsed());
        result
    }

    pub fn record(&mut self, step_name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        log::debug!("{}: {}µs", step_name, elapsed.as_micros());
        match self.timings.iter_mut().find(|(name, _)| name == step_name) {
            Some((_, total)) => *total += elapsed,
            None => self.timings.push((step_name.to_string(), elapsed)),
        }
    }

    /// Summary lines, one per step plus a total; empty when disabled.
    pub fn summary(&self) -> Vec<String> {
        if !self.enabled || self.timings.is_empty() {
            return Vec::new();
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        let mut lines: Vec<String> = self
            .timings
            .iter()
            .map(|(step, duration)| {
                let percentage = if total.is_zero() {
                    0.0
                } else {
                    duration.as_secs_f64() / total.as_secs_f64() * 100.0
                };
                format!(
                    "{:.<35} {:.3}ms ({:.1}%)",
                    step,
                    duration.as_secs_f64() * 1000.0,
                    percentage
                )
            })
            .collect();
        lines.push(format!("{:.<35} {:.3}ms", "Total", total.as_secs_f64() * 1000.0));
        lines
    }
}

pub struct DocumentProcessor {
    config: TxtposConfig,
    rule_engine: RuleEngine,
}

impl DocumentProcessor {
    pub fn new(config: TxtposConfig) -> Self {
        Self {
            config,
            rule_engine: RuleEngine::new(),
        }
    }

    pub fn config(&self) -> &TxtposConfig {
        &self.config
    }

    /// Run one page through line reconstruction, merging and grid mapping.
    pub fn process_page(
        &self,
        page: PageContent,
        profiler: &mut StepProfiler,
    ) -> Result<PageResult> {
        Ok(self.run_page(page, profiler)?.0)
    }

    fn run_page(
        &self,
        page: PageContent,
        profiler: &mut StepProfiler,
    ) -> Result<(PageResult, Vec<WordToken>)> {
        let PageContent {
            page_number,
            words,
            segments,
        } = page;

        let output = self.rule_engine.apply_rules(words, &self.config)?;
        for (name, elapsed) in self.rule_engine.rule_timings.borrow().iter() {
            profiler.record(name, *elapsed);
        }

        let grid_config = &self.config.grid;
        let (grids, cells) = if grid_config.enabled {
            let grids = profiler.time_step("Grid Construction", || {
                GridBuilder::new(grid_config).build(&segments)
            });
            let cells = profiler.time_step("Grid Mapping", || {
                grids
                    .iter()
                    .map(|g| g.map_words(&output.words, grid_config.use_vertical_lines))
                    .collect::<Vec<_>>()
            });
            (grids, cells)
        } else {
            (Vec::new(), Vec::new())
        };

        log::debug!(
            "page {}: {} words, {} segments, {} grids",
            page_number,
            output.words.len(),
            segments.len(),
            grids.len()
        );

        Ok((
            PageResult {
                page_number,
                words: output.words,
                grids,
                cells,
            },
            output.clustered,
        ))
    }

    /// Process the configured page range of `source` into `sink`.
    ///
    /// A page that fails to load is logged and skipped.
    pub fn process_source<S, W>(
        &self,
        source: &S,
        sink: &mut RecordSink<W>,
        profiler: &mut StepProfiler,
    ) -> Result<DocumentSummary>
    where
        S: PageSource + ?Sized,
        W: Write,
    {
        let mut summary = DocumentSummary::default();
        let Some((start, end)) = self.config.pages.resolve(source.page_count()) else {
            log::info!("{}: no pages in range", source.name());
            return Ok(summary);
        };

        let records_before = sink.lines.records();
        let rows_before = sink.grids.as_ref().map_or(0, GridRecordWriter::rows);

        for page_number in start..=end {
            let page = match profiler.time_step("Page Load", || source.load_page(page_number)) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Skipping page {page_number}: {e}");
                    summary.pages_failed += 1;
                    continue;
                }
            };

            let result = self.process_page(page, profiler)?;
            profiler.time_step("Record Output", || -> Result<()> {
                sink.lines
                    .write_page(result.page_number, &result.words)
                    .context("writing line records")?;
                if let Some(grids) = sink.grids.as_mut() {
                    for cells in &result.cells {
                        grids.write_grid(cells).context("writing grid records")?;
                    }
                }
                Ok(())
            })?;
            summary.pages_processed += 1;
        }

        summary.word_records = sink.lines.records() - records_before;
        summary.grid_rows = sink.grids.as_ref().map_or(0, GridRecordWriter::rows) - rows_before;

        log::info!(
            "{}: {} pages processed, {} failed, {} records, {} grid rows",
            source.name(),
            summary.pages_processed,
            summary.pages_failed,
            summary.word_records,
            summary.grid_rows
        );
        Ok(summary)
    }

    /// Process a JSON page dump, writing `<stem>.info` (and `<stem>.grid`
    /// when grid output is enabled) next to it.
    pub fn process_file(&self, input: &Path, profiler: &mut StepProfiler) -> Result<DocumentSummary> {
        let source = profiler
            .time_step("Source Open", || JsonSourceLoader.open(input))
            .with_context(|| format!("opening {}", input.display()))?;

        let paths = OutputPaths::for_input(input);
        let lines = LineRecordWriter::new(create_output(&paths.lines)?, &self.config.output.delimiter);
        let grids = if self.config.grid.enabled {
            Some(GridRecordWriter::new(
                create_output(&paths.grid)?,
                &self.config.grid.delimiter,
            ))
        } else {
            None
        };

        let mut sink = RecordSink::new(lines, grids);
        let summary = self.process_source(&source, &mut sink, profiler)?;
        sink.finish()
            .with_context(|| format!("flushing output for {}", input.display()))?;
        Ok(summary)
    }

    /// Run the page range and keep every intermediate result instead of
    /// writing records.
    pub fn capture_stages<S>(&self, source: &S) -> Result<PipelineStages>
    where
        S: PageSource + ?Sized,
    {
        let mut stages = PipelineStages {
            source: source.name().to_string(),
            captured_at: Utc::now(),
            pages: Vec::new(),
            failed_pages: Vec::new(),
        };
        let Some((start, end)) = self.config.pages.resolve(source.page_count()) else {
            return Ok(stages);
        };

        let mut profiler = StepProfiler::new(false);
        for page_number in start..=end {
            let page = match source.load_page(page_number) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Skipping page {page_number}: {e}");
                    stages.failed_pages.push(page_number);
                    continue;
                }
            };

            let (result, clustered) = self.run_page(page.clone(), &mut profiler)?;
            let grid_rows = result
                .cells
                .iter()
                .map(|cells| to_delimited_rows(cells, &self.config.grid.delimiter))
                .collect();
            stages.pages.push(PageStages {
                page,
                clustered,
                merged: result.words,
                grids: result.grids,
                grid_rows,
            });
        }
        Ok(stages)
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::sources::InMemorySource;

    fn word(x1: f64, y: f64, x2: f64, text: &str) -> WordToken {
        WordToken::new(x1, y, x2, y + 8.0, text).with_font("F", 10.0, 4.0)
    }

    fn table_page() -> PageContent {
        PageContent {
            page_number: 1,
            words: vec![
                word(110.0, 25.0, 130.0, "3"),
                word(10.0, 5.0, 40.0, "Item"),
                word(110.0, 5.0, 140.0, "Qty"),
                word(10.0, 25.0, 40.0, "Pen"),
            ],
            segments: vec![
                Segment::new(0.0, 0.0, 200.0, 0.0),
                Segment::new(0.0, 20.0, 200.0, 20.0),
                Segment::new(0.0, 40.0, 200.0, 40.0),
                Segment::new(0.0, 0.0, 0.0, 40.0),
                Segment::new(100.0, 0.0, 100.0, 40.0),
                Segment::new(200.0, 0.0, 200.0, 40.0),
            ],
        }
    }

    fn grid_config() -> TxtposConfig {
        let mut config = TxtposConfig::default();
        config.grid.enabled = true;
        config
    }

    #[test]
    fn page_with_table_yields_lines_and_cells() {
        let processor = DocumentProcessor::new(grid_config());
        let result = processor
            .process_page(table_page(), &mut StepProfiler::new(false))
            .unwrap();

        let texts: Vec<_> = result.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Item", "Qty", "Pen", "3"]);
        assert_eq!(result.grids.len(), 1);
        assert_eq!(
            result.cells[0],
            vec![
                vec!["Item".to_string(), "Qty".to_string()],
                vec!["Pen".to_string(), "3".to_string()],
            ]
        );
    }

    #[test]
    fn grids_are_skipped_when_disabled() {
        let processor = DocumentProcessor::new(TxtposConfig::default());
        let result = processor
            .process_page(table_page(), &mut StepProfiler::new(false))
            .unwrap();
        assert!(result.grids.is_empty());
        assert!(result.cells.is_empty());
        assert_eq!(result.words.len(), 4);
    }

    #[test]
    fn empty_page_produces_nothing() {
        let processor = DocumentProcessor::new(grid_config());
        let result = processor
            .process_page(PageContent::default(), &mut StepProfiler::new(false))
            .unwrap();
        assert!(result.words.is_empty());
        assert!(result.grids.is_empty());
    }

    #[test]
    fn page_range_limits_processing() {
        let mut config = grid_config();
        config.pages.start = Some(2);
        let processor = DocumentProcessor::new(config);
        let source = InMemorySource::new(vec![table_page(), table_page(), table_page()]);

        let mut sink = RecordSink::new(
            LineRecordWriter::new(Vec::new(), ";"),
            Some(GridRecordWriter::new(Vec::new(), ";")),
        );
        let summary = processor
            .process_source(&source, &mut sink, &mut StepProfiler::new(false))
            .unwrap();

        assert_eq!(
            summary,
            DocumentSummary {
                pages_processed: 2,
                pages_failed: 0,
                word_records: 8,
                grid_rows: 4,
            }
        );
        let (lines, grids) = sink.finish().unwrap();
        let lines = String::from_utf8(lines).unwrap();
        assert!(lines.starts_with("2;0;10;5;40;13;F;10;4;Item\n"));
        assert!(!lines.contains("\n1;"));
        assert_eq!(
            String::from_utf8(grids.unwrap()).unwrap(),
            "Item;Qty\nPen;3\nItem;Qty\nPen;3\n"
        );
    }

    #[test]
    fn profiler_accumulates_steps_by_name() {
        let mut profiler = StepProfiler::new(true);
        profiler.record("Rules", Duration::from_millis(2));
        profiler.record("Rules", Duration::from_millis(3));
        profiler.record("Grid Mapping", Duration::from_millis(5));
        let summary = profiler.summary();
        assert_eq!(summary.len(), 3);
        assert!(summary[0].starts_with("Rules"));
        assert!(summary[0].contains(" 5.000ms"));
        assert!(summary[2].contains(" 10.000ms"));
        assert!(summary[0].ends_with("(50.0%)"));
        assert!(summary[2].starts_with("Total"));

        let mut off = StepProfiler::new(false);
        assert_eq!(off.time_step("Rules", || 7), 7);
        assert!(off.summary().is_empty());
    }

    #[test]
    fn stage_capture_keeps_every_boundary() {
        let processor = DocumentProcessor::new(grid_config());
        let source = InMemorySource::new(vec![table_page()]);
        let stages = processor.capture_stages(&source).unwrap();

        assert_eq!(stages.source, "InMemorySource");
        assert_eq!(stages.pages.len(), 1);
        let page = &stages.pages[0];
        assert_eq!(page.page.words.len(), 4);
        assert!(page.clustered.iter().all(|w| w.line_nb.is_some()));
        assert_eq!(page.merged.len(), 4);
        assert_eq!(page.grid_rows, vec![vec!["Item;Qty".to_string(), "Pen;3".to_string()]]);
    }
}
