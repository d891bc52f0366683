use super::engine::ParseRule;
use crate::config::NumberMergeConfig;
use crate::types::{flatten_lines, group_into_lines, WordToken};
use anyhow::Result;

/// Joins numbers that the decoder split on a thousands-separator space,
/// e.g. "1 234 567" → "1234567".
pub struct NumberMergeRule<'a> {
    config: &'a NumberMergeConfig,
}

impl<'a> NumberMergeRule<'a> {
    pub fn new(config: &'a NumberMergeConfig) -> Self {
        Self { config }
    }
}

impl<'a> ParseRule for NumberMergeRule<'a> {
    fn apply(&self, words: Vec<WordToken>) -> Result<Vec<WordToken>> {
        let before = words.len();
        let mut lines = group_into_lines(words);
        for line in &mut lines {
            merge_split_numbers(&mut line.words, self.config.gap_factor);
        }
        let merged = flatten_lines(lines);

        if merged.len() != before {
            log::debug!(
                "number merge: {} words collapsed into {}",
                before,
                merged.len()
            );
        }
        Ok(merged)
    }

    fn name(&self) -> &str {
        "NumberMerge"
    }
}

/// Whether `right` continues the number in `left`.
///
/// With a zero or negative space width this is a plain overlap/adjacency test
/// on the x-extent.
pub fn should_merge(left: &WordToken, right: &WordToken, gap_factor: f64) -> bool {
    left.is_number()
        && right.is_number()
        && left.x2 + gap_factor * left.space_width > right.x1
}

/// Merge split numeric words of one line in place. `line` must be in x order.
///
/// The index only advances when no merge happened, so a chain of fragments
/// collapses in a single pass.
pub fn merge_split_numbers(line: &mut Vec<WordToken>, gap_factor: f64) {
    let mut i = 0;
    while i + 1 < line.len() {
        if should_merge(&line[i], &line[i + 1], gap_factor) {
            let next = line.remove(i + 1);
            line[i].merge(next);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(x1: f64, x2: f64, text: &str, space_width: f64) -> WordToken {
        WordToken::new(x1, 100.0, x2, 108.0, text).with_font("Helvetica", 10.0, space_width)
    }

    fn tagged(mut words: Vec<WordToken>, line: u32) -> Vec<WordToken> {
        for w in &mut words {
            w.line_nb = Some(line);
        }
        words
    }

    #[test]
    fn merges_when_gap_is_below_one_and_a_half_spaces() {
        // 50 + 1.5 * 4 = 56 > 55
        let mut line = vec![num(30.0, 50.0, "12", 4.0), num(55.0, 70.0, "345", 4.0)];
        merge_split_numbers(&mut line, 1.5);
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].text, "12345");
        assert_eq!(line[0].x1, 30.0);
        assert_eq!(line[0].x2, 70.0);
    }

    #[test]
    fn keeps_words_apart_when_gap_is_too_wide() {
        // 56 < 57
        let mut line = vec![num(30.0, 50.0, "12", 4.0), num(57.0, 70.0, "345", 4.0)];
        merge_split_numbers(&mut line, 1.5);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn chain_of_fragments_collapses_in_one_pass() {
        let mut line = vec![
            num(10.0, 15.0, "1", 3.0),
            num(18.0, 33.0, "234", 3.0),
            num(36.0, 51.0, "567", 3.0),
        ];
        line[1].y1 = 99.0;
        line[2].y2 = 109.0;
        merge_split_numbers(&mut line, 1.5);

        assert_eq!(line.len(), 1);
        let merged = &line[0];
        assert_eq!(merged.text, "1234567");
        assert_eq!((merged.x1, merged.y1, merged.x2, merged.y2), (10.0, 99.0, 51.0, 109.0));
    }

    #[test]
    fn never_merges_text() {
        let mut line = vec![
            num(10.0, 20.0, "12", 4.0),
            num(21.0, 30.0, "apples", 4.0),
            num(31.0, 40.0, "34", 4.0),
        ];
        merge_split_numbers(&mut line, 1.5);
        assert_eq!(line.len(), 3);

        let mut line = vec![num(10.0, 20.0, "1,000", 4.0), num(21.0, 30.0, "000", 4.0)];
        merge_split_numbers(&mut line, 1.5);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn degenerate_space_width_falls_back_to_adjacency() {
        // Touching or overlapping boxes still merge.
        let mut overlapping = vec![num(10.0, 20.0, "1", 0.0), num(19.5, 30.0, "000", 0.0)];
        merge_split_numbers(&mut overlapping, 1.5);
        assert_eq!(overlapping.len(), 1);

        let mut apart = vec![num(10.0, 20.0, "1", -3.0), num(20.5, 30.0, "000", -3.0)];
        merge_split_numbers(&mut apart, 1.5);
        assert_eq!(apart.len(), 2);
    }

    #[test]
    fn empty_and_single_word_lines_are_untouched() {
        let mut empty: Vec<WordToken> = Vec::new();
        merge_split_numbers(&mut empty, 1.5);
        assert!(empty.is_empty());

        let mut single = vec![num(10.0, 20.0, "7", 4.0)];
        merge_split_numbers(&mut single, 1.5);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn rule_never_merges_across_lines() {
        let config = NumberMergeConfig::default();
        let mut words = tagged(vec![num(10.0, 20.0, "1", 4.0)], 0);
        words.extend(tagged(vec![num(21.0, 30.0, "000", 4.0)], 1));

        let out = NumberMergeRule::new(&config).apply(words).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].line_nb, Some(0));
        assert_eq!(out[1].line_nb, Some(1));
    }

    #[test]
    fn rule_keeps_line_tags_on_merged_words() {
        let config = NumberMergeConfig::default();
        let words = tagged(
            vec![
                num(5.0, 9.0, "Total", 4.0),
                num(40.0, 45.0, "2", 4.0),
                num(48.0, 63.0, "500", 4.0),
            ],
            4,
        );
        let out = NumberMergeRule::new(&config).apply(words).unwrap();
        let texts: Vec<_> = out.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["Total", "2500"]);
        assert!(out.iter().all(|w| w.line_nb == Some(4)));
    }
}
