//! Sequential depth-first driver over an explicit stack of [`Level`]s.
//!
//! # Algorithm
//!
//! 1. Stop if cancellation was requested.
//! 2. Finish when the stack is empty.
//! 3. Publish progress for the top level.
//! 4. Take the top level's next action, or pop the level when exhausted.
//! 5. Copy the level's state and apply the action. A complete child is
//!    scored and installed if strictly better than the best result; an
//!    incomplete child is expanded into a new level (or counted as a
//!    dead-end when it cannot be finished).
//!
//! Only candidate ranking runs in parallel; the walk itself is sequential
//! so its order is fully determined by the rankings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::lookahead::{mix_seed, Lookahead};
use super::{CancelToken, Level, SearchOutcome, SearchProblem, SearchProgress, SearchState};

/// When a search phase stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerminationPolicy {
    /// Explore the whole tree and keep the best complete result.
    #[default]
    Exhaustive,
    /// Stop as soon as the first complete result is installed.
    FirstSolution,
}

/// Depth-first backtracking search for one [`SearchProblem`].
///
/// # Example
/// ```ignore
/// let progress = Arc::new(SearchProgress::new());
/// let outcome = BacktrackingSearch::new(&problem, Arc::clone(&progress), cancel)
///     .with_policy(TerminationPolicy::FirstSolution)
///     .with_seed(Some(7))
///     .run();
/// let best = progress.best_result();
/// ```
pub struct BacktrackingSearch<'a, P: SearchProblem> {
    problem: &'a P,
    progress: Arc<SearchProgress<P::Output>>,
    cancel: CancelToken,
    policy: TerminationPolicy,
    seed: Option<u64>,
    levels: Vec<Level<P::State, P::Action>>,
}

impl<'a, P: SearchProblem> BacktrackingSearch<'a, P> {
    /// Creates a search that publishes into `progress`.
    pub fn new(
        problem: &'a P,
        progress: Arc<SearchProgress<P::Output>>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            problem,
            progress,
            cancel,
            policy: TerminationPolicy::Exhaustive,
            seed: None,
            levels: Vec::new(),
        }
    }

    /// Sets the termination policy.
    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fixes the lookahead random source; `None` draws a fresh seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Runs the search to completion, first solution or cancellation.
    #[tracing::instrument(level = "info", skip_all, fields(policy = ?self.policy))]
    pub fn run(mut self) -> SearchOutcome {
        let seed = self.seed.unwrap_or_else(rand::random::<u64>);
        let start = self.problem.start_state();
        self.progress.begin(start.max_depth());
        info!(max_depth = start.max_depth(), seed, "search started");

        let outcome = if self.cancel.is_cancelled() {
            SearchOutcome::Cancelled
        } else if start.is_complete() {
            let score = Lookahead::new(self.problem, &self.progress).evaluate(&start);
            self.install(&start, score);
            SearchOutcome::Exhausted
        } else {
            if let Some(root) = self.expand(start, seed) {
                self.levels.push(root);
            }
            self.walk(seed)
        };

        self.progress.finish(outcome);
        info!(
            ?outcome,
            operations = self.progress.operations_done(),
            dead_ends = self.progress.dead_ends(),
            evaluations = self.progress.score_evaluations(),
            best = ?self.progress.best_score(),
            "search finished"
        );
        outcome
    }

    fn walk(&mut self, seed: u64) -> SearchOutcome {
        loop {
            if self.cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }

            let percent = self.percent_domain_seen();
            let child = {
                let Some(level) = self.levels.last_mut() else {
                    return SearchOutcome::Exhausted;
                };
                self.progress
                    .publish_level(level.state().depth(), level.score(), percent);

                level.take_next().map(|ranked| {
                    let mut child = level.state().clone();
                    self.problem.apply(&ranked.action, &mut child);
                    debug_assert_eq!(child.depth(), level.state().depth() + 1);
                    child
                })
            };

            match child {
                None => {
                    self.levels.pop();
                }
                Some(child) if child.is_complete() => {
                    let score = Lookahead::new(self.problem, &self.progress).evaluate(&child);
                    if self.install(&child, score)
                        && self.policy == TerminationPolicy::FirstSolution
                    {
                        self.progress.record_operation();
                        return SearchOutcome::FirstSolution;
                    }
                }
                Some(child) => {
                    let salt = self.progress.operations_done();
                    if let Some(level) = self.expand(child, mix_seed(seed, salt)) {
                        self.levels.push(level);
                    }
                }
            }
            self.progress.record_operation();
        }
    }

    /// Generates and ranks the children of `state`.
    ///
    /// Returns `None` (and counts a dead-end) when the frontier cannot be
    /// completed or lookahead drops every candidate.
    fn expand(&self, state: P::State, seed: u64) -> Option<Level<P::State, P::Action>> {
        let actions = self.problem.collect_actions_parallel(&state);
        if actions.len() < state.remaining_depth() {
            trace!(
                depth = state.depth(),
                actions = actions.len(),
                needed = state.remaining_depth(),
                "dead-end"
            );
            self.progress.record_dead_end();
            return None;
        }

        let lookahead = Lookahead::new(self.problem, &self.progress);
        let strategy = self.problem.strategy(&state);
        let ranked = lookahead.rank_all(&state, actions, &strategy, seed);
        if ranked.is_empty() {
            trace!(depth = state.depth(), "dead-end after lookahead");
            self.progress.record_dead_end();
            return None;
        }

        let score = lookahead.evaluate(&state);
        Some(Level::new(state, score, ranked))
    }

    fn install(&self, state: &P::State, score: f64) -> bool {
        let previous = self.progress.best_score();
        let installed = self
            .progress
            .try_install(score, || self.problem.output(state, score));
        if installed {
            debug!(?previous, score, "better solution installed");
        }
        installed
    }

    /// Explored share of the tree: each level's finished fraction, weighted
    /// by the size of the subtree one of its siblings represents.
    fn percent_domain_seen(&self) -> f64 {
        let mut weight = 1.0;
        let mut seen = 0.0;
        for level in &self.levels {
            seen += level.seen_fraction() * weight;
            weight /= level.candidate_count().max(1) as f64;
        }
        (seen * 100.0).clamp(0.0, 100.0)
    }
}
