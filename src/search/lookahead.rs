//! Bounded stochastic lookahead used to rank candidate actions.
//!
//! Ranking simulates a shallow continuation below each candidate. At every
//! simulated level a fraction of the children is sampled (all of them when
//! the proportion reaches 1), and the fraction decays by `persistence` per
//! level. Leaves of the simulation are complete states, the depth budget,
//! or dead-ends, which yield no value.
//!
//! A node's value blends the best and the mean of its valid children:
//!
//! ```text
//! coverage = valid / children
//! value    = (1 - coverage) · (mean + own) / 2 + coverage · max
//! ```
//!
//! so a well-covered node trusts its best continuation while a sparsely
//! sampled one is pulled towards the average and its own score.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use rayon::prelude::*;

use super::{LookaheadStrategy, RankedAction, SearchProblem, SearchProgress, SearchState};

/// Ranks candidates of one phase, counting every score evaluation.
pub(crate) struct Lookahead<'a, P: SearchProblem> {
    problem: &'a P,
    progress: &'a SearchProgress<P::Output>,
}

impl<'a, P: SearchProblem> Lookahead<'a, P> {
    pub(crate) fn new(problem: &'a P, progress: &'a SearchProgress<P::Output>) -> Self {
        Self { problem, progress }
    }

    /// Scores `state` and counts the evaluation.
    #[inline]
    pub(crate) fn evaluate(&self, state: &P::State) -> f64 {
        self.progress.record_evaluation();
        self.problem.score(state)
    }

    /// Ranks every action in parallel, drops those without a value and
    /// sorts the rest by descending rank.
    ///
    /// Each candidate gets its own RNG derived from `seed` and its index,
    /// so the ranking does not depend on thread scheduling.
    pub(crate) fn rank_all(
        &self,
        state: &P::State,
        actions: Vec<P::Action>,
        strategy: &LookaheadStrategy,
        seed: u64,
    ) -> Vec<RankedAction<P::Action>> {
        let total = actions.len();
        let done = AtomicUsize::new(0);
        self.progress.set_depth_completeness(0.0);

        let mut ranked: Vec<RankedAction<P::Action>> = actions
            .into_par_iter()
            .enumerate()
            .filter_map(|(index, action)| {
                let mut rng = SmallRng::seed_from_u64(mix_seed(seed, index as u64));
                let rank = self.rank(state, &action, strategy, &mut rng);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress
                    .advance_depth_completeness(finished as f64 / total as f64);
                rank.map(|rank| RankedAction { action, rank })
            })
            .collect();
        self.progress.set_depth_completeness(1.0);

        // Stable: equal ranks keep generation order.
        ranked.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        ranked
    }

    /// Rank of `action` applied to `state`, or `None` if every simulated
    /// continuation dead-ends.
    pub(crate) fn rank(
        &self,
        state: &P::State,
        action: &P::Action,
        strategy: &LookaheadStrategy,
        rng: &mut SmallRng,
    ) -> Option<f64> {
        let mut next = state.clone();
        self.problem.apply(action, &mut next);
        self.deep_score(
            &next,
            strategy.depth,
            strategy.proportion,
            strategy.persistence,
            rng,
        )
    }

    fn deep_score(
        &self,
        state: &P::State,
        depth: usize,
        proportion: f64,
        persistence: f64,
        rng: &mut SmallRng,
    ) -> Option<f64> {
        if state.is_complete() || depth == 0 {
            return Some(self.evaluate(state));
        }

        let mut children = self.problem.collect_actions(state);
        let total = children.len();
        if total < state.remaining_depth() {
            return None;
        }

        let proportion = proportion.clamp(0.0, 1.0);
        let count = ((proportion * total as f64).floor() as usize).max(1);
        let sampled: Vec<P::Action> = if count >= total {
            children
        } else if count == 1 {
            children.choose(rng).copied().into_iter().collect()
        } else {
            children.shuffle(rng);
            children.truncate(count);
            children
        };

        let next_proportion = LookaheadStrategy::decay(proportion, persistence);
        let mut valid = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        for action in &sampled {
            let mut child = state.clone();
            self.problem.apply(action, &mut child);
            if let Some(v) = self.deep_score(&child, depth - 1, next_proportion, persistence, rng) {
                valid += 1;
                sum += v;
                max = max.max(v);
            }
        }

        if valid == 0 {
            return None;
        }

        let own = self.evaluate(state);
        let mean = sum / valid as f64;
        let coverage = valid as f64 / total as f64;
        Some((1.0 - coverage) * (mean + own) / 2.0 + coverage * max)
    }
}

/// Derives an independent seed from `base` and `salt` (SplitMix64 finalizer).
pub(crate) fn mix_seed(base: u64, salt: u64) -> u64 {
    let mut z = base ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
