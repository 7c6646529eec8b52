//! Lookahead strategies and their annealing schedule.
//!
//! A [`LookaheadStrategy`] bounds the simulated continuation used to rank
//! one frontier: how deep to simulate, which fraction of children to
//! sample at the first simulated level, and how fast that fraction decays.
//!
//! A [`LookaheadSchedule`] derives a strategy from how far the real search
//! has progressed. With `x = floor^(1 - p)` where `p = (depth + 1) / maxDepth`,
//! `x` is close to `floor` near the root and reaches 1 at the leaves, so
//! sampling is sparse and shallow early and exhaustive late.

use serde::{Deserialize, Serialize};

/// Bounds of one lookahead pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookaheadStrategy {
    /// Simulated levels below the candidate's own successor state.
    pub depth: usize,
    /// Fraction of children sampled at the first simulated level (0..=1).
    pub proportion: f64,
    /// Multiplicative decay of `proportion` per simulated level.
    pub persistence: f64,
}

impl LookaheadStrategy {
    /// Ranks candidates by the score of their immediate successor only.
    pub fn greedy() -> Self {
        Self {
            depth: 0,
            proportion: 1.0,
            persistence: 1.0,
        }
    }

    /// Creates a strategy; `proportion` is clamped to `0..=1` and
    /// `persistence` to be non-negative.
    pub fn new(depth: usize, proportion: f64, persistence: f64) -> Self {
        Self {
            depth,
            proportion: sanitize(proportion).clamp(0.0, 1.0),
            persistence: sanitize(persistence).max(0.0),
        }
    }

    /// Proportion used one simulated level deeper.
    #[inline]
    pub fn decay(proportion: f64, persistence: f64) -> f64 {
        (proportion * persistence).clamp(0.0, 1.0)
    }
}

impl Default for LookaheadStrategy {
    fn default() -> Self {
        Self::greedy()
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// Annealing schedule mapping search progress to a [`LookaheadStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookaheadSchedule {
    /// Value of the curve at the root, in `(0, 1]`. 1 disables annealing.
    pub floor: f64,
    /// Lookahead depth as a fraction of `maxDepth`, scaled by the curve.
    pub depth_scale: f64,
}

impl LookaheadSchedule {
    /// Smallest accepted floor; keeps `powf` away from zero.
    pub const MIN_FLOOR: f64 = 1e-12;

    /// No simulated continuation; candidates ranked by successor score.
    pub fn greedy() -> Self {
        Self {
            floor: 1.0,
            depth_scale: 0.0,
        }
    }

    /// Exponential schedule starting at `floor` near the root.
    pub fn annealed(floor: f64) -> Self {
        Self {
            floor,
            depth_scale: 1.0,
        }
    }

    /// Sets the depth scale.
    pub fn with_depth_scale(mut self, depth_scale: f64) -> Self {
        self.depth_scale = depth_scale;
        self
    }

    /// Annealing curve value for a state at `depth` of `max_depth`.
    pub fn curve(&self, depth: usize, max_depth: usize) -> f64 {
        if max_depth == 0 {
            return 1.0;
        }
        let floor = sanitize(self.floor).clamp(Self::MIN_FLOOR, 1.0);
        let p = ((depth + 1) as f64 / max_depth as f64).clamp(0.0, 1.0);
        floor.powf(1.0 - p)
    }

    /// Strategy for a state at `depth` of `max_depth`.
    pub fn strategy_for(&self, depth: usize, max_depth: usize) -> LookaheadStrategy {
        let x = self.curve(depth, max_depth);
        let scale = sanitize(self.depth_scale).max(0.0);
        let lookahead_depth = (max_depth as f64 * scale * x).floor() as usize;
        LookaheadStrategy::new(lookahead_depth, x, x)
    }
}

impl Default for LookaheadSchedule {
    fn default() -> Self {
        Self::greedy()
    }
}
