use super::engine::ParseRule;
use crate::config::LineClusteringConfig;
use crate::types::WordToken;
use anyhow::Result;
use std::cmp::Ordering;

/// Assigns line numbers to the words of one page and puts them in reading
/// order (line, then x1).
pub struct LineClusteringRule<'a> {
    config: &'a LineClusteringConfig,
}

impl<'a> LineClusteringRule<'a> {
    pub fn new(config: &'a LineClusteringConfig) -> Self {
        Self { config }
    }
}

impl<'a> ParseRule for LineClusteringRule<'a> {
    fn apply(&self, words: Vec<WordToken>) -> Result<Vec<WordToken>> {
        Ok(cluster_lines(words, self.config))
    }

    fn name(&self) -> &str {
        "LineClustering"
    }
}

/// Pairwise baseline comparison: `y2` first, `x1` when the `y2` values are
/// within `delta`, equal when both are.
pub fn compare_words(a: &WordToken, b: &WordToken, delta: f64) -> Ordering {
    let dy = a.y2 - b.y2;
    if dy.abs() < delta {
        let dx = a.x1 - b.x1;
        if dx.abs() < delta {
            Ordering::Equal
        } else if dx < 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    } else if dy < 0.0 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Sort words into baseline order.
///
/// The `delta` tie rule is not transitive, so it cannot be handed to
/// `sort_by` directly. Words are ordered by `y2`, consecutive words whose `y2`
/// differ by less than `delta` form a run, and each run is ordered by `x1`.
/// This agrees with [`compare_words`] whenever a run is tighter than `delta`.
/// A run can chain past `delta` through close neighbours; it is still ordered
/// by `x1` as a whole. Words whose `x1` also tie keep their input order.
pub fn sort_by_baseline(words: &mut [WordToken], delta: f64) {
    words.sort_by(|a, b| a.y2.total_cmp(&b.y2));

    let mut start = 0;
    while start < words.len() {
        let mut end = start + 1;
        while end < words.len() && (words[end].y2 - words[end - 1].y2).abs() < delta {
            end += 1;
        }
        if end - start > 1 {
            words[start..end].sort_by(|a, b| a.x1.total_cmp(&b.x1));
        }
        start = end;
    }
}

/// Tag every word with a line number and return them in reading order.
///
/// The line reference `y1` is fixed at the first word of each line and only
/// moves when a new line starts, so a slanted line cannot drift into the next.
pub fn cluster_lines(mut words: Vec<WordToken>, config: &LineClusteringConfig) -> Vec<WordToken> {
    if words.is_empty() {
        return words;
    }

    sort_by_baseline(&mut words, config.sort_delta);
    let mut line_y = words[0].y1;

    let mut line_nb = 0u32;
    for word in words.iter_mut() {
        if (line_y - word.y1).abs() > config.line_margin {
            line_nb += 1;
            line_y = word.y1;
        }
        word.line_nb = Some(line_nb);
    }

    words.sort_by(|a, b| {
        a.line_nb
            .cmp(&b.line_nb)
            .then_with(|| a.x1.total_cmp(&b.x1))
    });

    log::debug!(
        "line clustering: {} words on {} lines",
        words.len(),
        line_nb + 1
    );
    words
}
