use crate::geometry::DEFAULT_LINE_MARGIN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_delimiter() -> String {
    ";".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TxtposConfig {
    #[serde(default)]
    pub line_clustering: LineClusteringConfig,
    #[serde(default)]
    pub number_merge: NumberMergeConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub pages: PageRange,
    /// Rules to run after line clustering, in order
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: vec![RuleConfig {
                name: "NumberMerge".to_string(),
                enabled: true,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineClusteringConfig {
    /// Max distance between a word's y1 and the current line reference
    /// before a new line starts (page units)
    pub line_margin: f64,
    /// Two y2 (then x1) values closer than this compare equal when sorting
    pub sort_delta: f64,
}

impl Default for LineClusteringConfig {
    fn default() -> Self {
        Self {
            line_margin: 1.5,
            sort_delta: 1e-5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberMergeConfig {
    /// Gap below `gap_factor * space_width` joins two numeric words
    pub gap_factor: f64,
}

impl Default for NumberMergeConfig {
    fn default() -> Self {
        Self { gap_factor: 1.5 }
    }
}

/// How rule segments on one page are split into separate grids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridPartition {
    /// Segments whose boxes (grown by `join_tolerance`) touch share a grid.
    /// Tables ruled only by parallel lines have nothing joining their rules
    /// and form no grid; use `Single` for those.
    Connected,
    /// All segments on a page form one grid
    Single,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Emit the grid-oriented record file
    pub enabled: bool,
    /// Classification margin for segments (LINE_MARGIN)
    pub segment_margin: f64,
    pub partition: GridPartition,
    /// Max gap between two segments of the same grid (Connected only)
    pub join_tolerance: f64,
    /// Boundaries closer than this collapse into one; falls back to
    /// `segment_margin` when unset
    pub snap_tolerance: Option<f64>,
    /// Honor column boundaries; when false each row is one full-width cell
    pub use_vertical_lines: bool,
    pub delimiter: String,
}

impl GridConfig {
    pub fn effective_snap_tolerance(&self) -> f64 {
        self.snap_tolerance.unwrap_or(self.segment_margin)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            segment_margin: DEFAULT_LINE_MARGIN,
            partition: GridPartition::Connected,
            join_tolerance: 3.0,
            snap_tolerance: None,
            use_vertical_lines: true,
            delimiter: default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Field delimiter of the line-oriented record file
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

/// Inclusive, 1-based page range. Unset ends mean "first" / "last".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl PageRange {
    /// Clamp to `1..=page_count`. Returns `None` when nothing is left.
    pub fn resolve(&self, page_count: u32) -> Option<(u32, u32)> {
        let start = self.start.unwrap_or(1).max(1);
        let end = self.end.unwrap_or(page_count).min(page_count);
        if page_count == 0 || start > end {
            None
        } else {
            Some((start, end))
        }
    }
}

impl TxtposConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {path}"))?;
        let config: TxtposConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {p}: {e:#}; using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TxtposConfig::default();
        assert_eq!(config.line_clustering.line_margin, 1.5);
        assert_eq!(config.line_clustering.sort_delta, 1e-5);
        assert_eq!(config.number_merge.gap_factor, 1.5);
        assert_eq!(config.grid.segment_margin, 2.0);
        assert_eq!(config.grid.effective_snap_tolerance(), 2.0);
        assert_eq!(config.grid.delimiter, ";");
        assert_eq!(config.output.delimiter, ";");
        assert!(config.grid.use_vertical_lines);
        assert_eq!(config.pipeline.rules[0].name, "NumberMerge");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r#"
line_clustering:
  line_margin: 3.0
grid:
  enabled: true
  partition: single
  delimiter: "|"
pipeline:
  rules:
    - name: NumberMerge
      enabled: false
"#;
        let config: TxtposConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.line_clustering.line_margin, 3.0);
        assert_eq!(config.line_clustering.sort_delta, 1e-5);
        assert!(config.grid.enabled);
        assert_eq!(config.grid.partition, GridPartition::Single);
        assert_eq!(config.grid.delimiter, "|");
        assert_eq!(config.grid.join_tolerance, 3.0);
        assert!(!config.pipeline.rules[0].enabled);
        assert_eq!(config.output.delimiter, ";");
    }

    #[test]
    fn page_range_is_clamped() {
        let all = PageRange::default();
        assert_eq!(all.resolve(5), Some((1, 5)));

        let wide = PageRange {
            start: Some(0),
            end: Some(40),
        };
        assert_eq!(wide.resolve(5), Some((1, 5)));

        let inverted = PageRange {
            start: Some(4),
            end: Some(2),
        };
        assert_eq!(inverted.resolve(5), None);
        assert_eq!(all.resolve(0), None);
    }

    #[test]
    fn missing_config_file_falls_back() {
        let config = TxtposConfig::load_with_fallback(Some("/definitely/not/here.yaml"));
        assert_eq!(config.line_clustering.line_margin, 1.5);
    }
}
