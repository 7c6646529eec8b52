//! Optimizer configuration.
//!
//! Every numeric knob of the two search phases lives here: lookahead
//! schedules, metric weights, scoring targets and the random seed. The
//! defaults reproduce the tuned production values; none of them affect
//! correctness, only which of the legal timetables is preferred and how
//! fast it is found.

use serde::{Deserialize, Serialize};

use crate::pairing::MetricTable;
use crate::search::LookaheadSchedule;

/// Targets the pair-phase metrics measure against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringTargets {
    /// Lower bound of the comfortable number of defenses per person per day.
    pub min_daily_assignments: u32,
    /// Upper bound of the comfortable number of defenses per person per day.
    pub max_daily_assignments: u32,
    /// Longest run of consecutive defenses that is not penalized.
    pub max_block_length: u32,
    /// Widest first-to-last span per day that is not penalized, in slots.
    pub max_daily_spread: u32,
    /// Reward per free day, penalty per busy day.
    pub vacation_day_reward: f64,
}

impl Default for ScoringTargets {
    fn default() -> Self {
        Self {
            min_daily_assignments: 6,
            max_daily_assignments: 9,
            max_block_length: 9,
            max_daily_spread: 9,
            vacation_day_reward: 10.0,
        }
    }
}

/// Configuration of a full two-phase optimization.
///
/// # Example
/// ```
/// use defense_schedule::config::OptimizerConfig;
/// use defense_schedule::search::LookaheadSchedule;
///
/// let config = OptimizerConfig::default()
///     .with_seed(42)
///     .with_pair_lookahead(LookaheadSchedule::annealed(1e-3));
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Seed of the lookahead random source; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    /// Lookahead schedule of the chairperson phase.
    pub chair_lookahead: LookaheadSchedule,
    /// Lookahead schedule of the pair phase.
    pub pair_lookahead: LookaheadSchedule,
    /// Pair-phase metric weights.
    pub metrics: MetricTable,
    /// Pair-phase scoring targets.
    pub targets: ScoringTargets,
    /// Weight of slot preferences in the chairperson phase score.
    pub chair_preference_weight: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            chair_lookahead: LookaheadSchedule::greedy(),
            pair_lookahead: LookaheadSchedule::annealed(1e-5),
            metrics: MetricTable::default(),
            targets: ScoringTargets::default(),
            chair_preference_weight: 0.01,
        }
    }
}

impl OptimizerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the random seed, making runs replayable.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the chairperson-phase lookahead schedule.
    pub fn with_chair_lookahead(mut self, schedule: LookaheadSchedule) -> Self {
        self.chair_lookahead = schedule;
        self
    }

    /// Sets the pair-phase lookahead schedule.
    pub fn with_pair_lookahead(mut self, schedule: LookaheadSchedule) -> Self {
        self.pair_lookahead = schedule;
        self
    }

    /// Sets the pair-phase metric weights.
    pub fn with_metrics(mut self, metrics: MetricTable) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets the pair-phase scoring targets.
    pub fn with_targets(mut self, targets: ScoringTargets) -> Self {
        self.targets = targets;
        self
    }

    /// Sets the chairperson-phase preference weight.
    pub fn with_chair_preference_weight(mut self, weight: f64) -> Self {
        self.chair_preference_weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::MetricKind;

    #[test]
    fn test_defaults() {
        let c = OptimizerConfig::default();
        assert_eq!(c.seed, None);
        assert_eq!(c.chair_lookahead, LookaheadSchedule::greedy());
        assert_eq!(c.pair_lookahead.floor, 1e-5);
        assert_eq!(c.targets.min_daily_assignments, 6);
        assert_eq!(c.targets.max_daily_assignments, 9);
    }

    #[test]
    fn test_builders() {
        let c = OptimizerConfig::new()
            .with_seed(3)
            .with_chair_preference_weight(0.5)
            .with_metrics(MetricTable::default().with_weight(MetricKind::RoleSwitching, 0.2));
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.chair_preference_weight, 0.5);
        assert_eq!(c.metrics.get(MetricKind::RoleSwitching).weight, 0.2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: OptimizerConfig = serde_json::from_str(r#"{ "seed": 11 }"#).unwrap();
        assert_eq!(c.seed, Some(11));
        assert_eq!(c.targets, ScoringTargets::default());
        assert_eq!(c.metrics, MetricTable::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let c = OptimizerConfig::default().with_seed(99);
        let json = serde_json::to_string(&c).unwrap();
        let back: OptimizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
