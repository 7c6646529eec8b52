//! Generic backtracking search with stochastic lookahead.
//!
//! Explores an assignment tree depth-first over an explicit stack of
//! [`Level`]s. Each level owns one state snapshot and the legal actions
//! generated from it, ranked by a bounded Monte-Carlo lookahead; children
//! are produced by copying the parent state and applying one action.
//!
//! # Components
//!
//! - [`SearchProblem`]: what a phase plugs in (start state, action
//!   generation, transition, scoring, output projection)
//! - [`BacktrackingSearch`]: the sequential DFS driver
//! - [`LookaheadSchedule`] / [`LookaheadStrategy`]: annealed ranking budget
//! - [`SearchProgress`]: lock-light progress and best-result publication
//! - [`RuleSet`]: conjunction of hard constraints used by action generators
//! - [`CancelToken`]: cooperative cancellation
//!
//! # Reference
//! Browne et al. (2012), "A Survey of Monte Carlo Tree Search Methods"

mod cancel;
mod engine;
mod level;
mod lookahead;
mod progress;
mod rules;
mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancelToken;
pub use engine::{BacktrackingSearch, TerminationPolicy};
pub use level::{Level, RankedAction};
pub use progress::{ProgressSnapshot, SearchOutcome, SearchProgress};
pub use rules::{Rule, RuleSet, Violation};
pub use strategy::{LookaheadSchedule, LookaheadStrategy};

use std::fmt::Debug;

/// A node of the search tree.
///
/// States are owned by exactly one [`Level`]; `Clone` must produce a
/// fully independent copy of everything an action can mutate.
pub trait SearchState: Clone + Send + Sync {
    /// Number of actions applied since the start state.
    fn depth(&self) -> usize;

    /// Depth of a complete assignment.
    fn max_depth(&self) -> usize;

    /// A state is complete exactly when `depth == max_depth`.
    #[inline]
    fn is_complete(&self) -> bool {
        self.depth() >= self.max_depth()
    }

    /// Actions still required to complete this state.
    #[inline]
    fn remaining_depth(&self) -> usize {
        self.max_depth().saturating_sub(self.depth())
    }
}

/// One phase of the optimization, as seen by the search engine.
///
/// Implementations hold the phase's precomputed, read-only context. All
/// methods take `&self` and must be safe to call from several threads at
/// once on independent states.
pub trait SearchProblem: Sync {
    /// Partial assignment.
    type State: SearchState;
    /// Atomic assignment step.
    type Action: Copy + Send + Sync + Debug;
    /// Projection of a complete state handed to observers.
    type Output: Send + Sync;

    /// The root of the tree.
    fn start_state(&self) -> Self::State;

    /// Applies `action` to `state`, increasing its depth by exactly one.
    fn apply(&self, action: &Self::Action, state: &mut Self::State);

    /// Legal actions from `state`, in a deterministic order.
    fn collect_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Same set as [`Self::collect_actions`], possibly generated in parallel.
    ///
    /// Used for real frontiers; lookahead uses the sequential variant since
    /// it already runs inside a parallel batch.
    fn collect_actions_parallel(&self, state: &Self::State) -> Vec<Self::Action> {
        self.collect_actions(state)
    }

    /// Heuristic quality of `state`; higher is better. Must be pure.
    fn score(&self, state: &Self::State) -> f64;

    /// Lookahead budget for ranking the children of `state`.
    fn strategy(&self, _state: &Self::State) -> LookaheadStrategy {
        LookaheadStrategy::greedy()
    }

    /// Builds the published result for a complete `state`.
    fn output(&self, state: &Self::State, score: f64) -> Self::Output;
}
