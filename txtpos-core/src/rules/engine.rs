use crate::config::TxtposConfig;
use crate::types::WordToken;
use anyhow::Result;
use std::cell::RefCell;
use std::time::{Duration, Instant};

use super::line_clustering::LineClusteringRule;
use super::number_merge::NumberMergeRule;

// Sequential rule pipeline infrastructure
pub trait ParseRule {
    fn apply(&self, words: Vec<WordToken>) -> Result<Vec<WordToken>>;
    fn name(&self) -> &str;
}

/// Output of one engine run, split at the clustering boundary so the
/// stage dump can show both sides.
#[derive(Debug, Clone)]
pub struct RuleOutput {
    pub clustered: Vec<WordToken>,
    pub words: Vec<WordToken>,
}

#[derive(Default)]
pub struct RuleEngine {
    pub rule_timings: RefCell<Vec<(String, Duration)>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cluster lines, then run the configured pipeline rules in order.
    pub fn apply_rules(&self, words: Vec<WordToken>, config: &TxtposConfig) -> Result<RuleOutput> {
        self.rule_timings.borrow_mut().clear();

        // Line clustering always runs: every later rule and both record
        // files rely on line numbers being set.
        let clustering = LineClusteringRule::new(&config.line_clustering);
        let clustered = self.timed(&clustering, words)?;

        let mut words = clustered.clone();
        for rule_config in &config.pipeline.rules {
            if !rule_config.enabled {
                log::debug!("skipping disabled rule {}", rule_config.name);
                continue;
            }
            words = self.apply_rule_by_name(&rule_config.name, words, config)?;
        }

        Ok(RuleOutput { clustered, words })
    }

    fn apply_rule_by_name(
        &self,
        rule_name: &str,
        words: Vec<WordToken>,
        config: &TxtposConfig,
    ) -> Result<Vec<WordToken>> {
        match rule_name {
            "NumberMerge" => self.timed(&NumberMergeRule::new(&config.number_merge), words),
            "LineClustering" => {
                log::debug!("LineClustering already ran; ignoring pipeline entry");
                Ok(words)
            }
            _ => {
                log::warn!("Unknown rule: {rule_name}. Skipping...");
                Ok(words)
            }
        }
    }

    fn timed(&self, rule: &dyn ParseRule, words: Vec<WordToken>) -> Result<Vec<WordToken>> {
        let start = Instant::now();
        let count = words.len();
        let result = rule.apply(words)?;
        log::debug!("{}: {} -> {} words", rule.name(), count, result.len());
        self.rule_timings
            .borrow_mut()
            .push((rule.name().to_string(), start.elapsed()));
        Ok(result)
    }
}
