//! Chairperson phase as a [`SearchProblem`].

use rayon::prelude::*;

use super::assignment::ChairAssignment;
use super::rules::{default_rules, ChairRules};
use super::score::chair_score;
use super::state::{ChairAction, ChairState};
use super::transform::{BlockPosition, ChairInput};
use crate::config::OptimizerConfig;
use crate::models::Input;
use crate::search::{LookaheadSchedule, LookaheadStrategy, SearchProblem, SearchState};

/// Assigns one chairperson to every block.
#[derive(Debug, Clone)]
pub struct ChairProblem {
    input: ChairInput,
    rules: ChairRules,
    schedule: LookaheadSchedule,
    preference_weight: f64,
}

impl ChairProblem {
    /// Builds the phase from a validated input.
    pub fn new(input: &Input, config: &OptimizerConfig) -> Self {
        Self {
            input: ChairInput::new(input),
            rules: default_rules(),
            schedule: config.chair_lookahead,
            preference_weight: config.chair_preference_weight,
        }
    }

    /// Replaces the rule set.
    pub fn with_rules(mut self, rules: ChairRules) -> Self {
        self.rules = rules;
        self
    }

    /// The phase context.
    pub fn input(&self) -> &ChairInput {
        &self.input
    }

    fn actions_at(&self, state: &ChairState, position: BlockPosition) -> Vec<ChairAction> {
        if !state.is_open(position) {
            return Vec::new();
        }
        self.input
            .chairs
            .iter()
            .map(|&chair| ChairAction { position, chair })
            .filter(|a| self.rules.passes_all(a, state, &self.input))
            .collect()
    }
}

impl SearchProblem for ChairProblem {
    type State = ChairState;
    type Action = ChairAction;
    type Output = ChairAssignment;

    fn start_state(&self) -> ChairState {
        ChairState::new(&self.input)
    }

    fn apply(&self, action: &ChairAction, state: &mut ChairState) {
        state.apply(action, &self.input);
    }

    fn collect_actions(&self, state: &ChairState) -> Vec<ChairAction> {
        self.input
            .positions
            .iter()
            .flat_map(|&pos| self.actions_at(state, pos))
            .collect()
    }

    fn collect_actions_parallel(&self, state: &ChairState) -> Vec<ChairAction> {
        self.input
            .positions
            .par_iter()
            .flat_map_iter(|&pos| self.actions_at(state, pos))
            .collect()
    }

    fn score(&self, state: &ChairState) -> f64 {
        chair_score(state, &self.input, self.preference_weight)
    }

    fn strategy(&self, state: &ChairState) -> LookaheadStrategy {
        self.schedule.strategy_for(state.depth(), state.max_depth())
    }

    fn output(&self, state: &ChairState, score: f64) -> ChairAssignment {
        ChairAssignment::from_state(state, &self.input, score)
    }
}
