//! Small problem used to exercise the engine in isolation.
//!
//! Places a multiset of values into cells. A cell holds at most one value
//! and some `(cell, value)` combinations are forbidden. The score rewards
//! large values in later cells, so the optimum is the sorted placement.

use super::{CancelToken, LookaheadStrategy, SearchProblem, SearchState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellState {
    pub cells: Vec<Option<u8>>,
    pub remaining: Vec<u32>,
    pub depth: usize,
    pub max_depth: usize,
}

impl SearchState for CellState {
    fn depth(&self) -> usize {
        self.depth
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Place {
    pub cell: usize,
    pub value: u8,
}

#[derive(Debug, Clone)]
pub(crate) struct CellProblem {
    pub cells: usize,
    /// `counts[v]` copies of value `v`.
    pub counts: Vec<u32>,
    pub forbidden: Vec<(usize, u8)>,
    pub strategy: LookaheadStrategy,
    /// Tripped whenever a result is built, stopping the search right after
    /// its first install.
    pub cancel_on_output: Option<CancelToken>,
}

impl CellProblem {
    pub fn new(cells: usize, counts: Vec<u32>) -> Self {
        Self {
            cells,
            counts,
            forbidden: Vec::new(),
            strategy: LookaheadStrategy::greedy(),
            cancel_on_output: None,
        }
    }

    pub fn with_forbidden(mut self, cell: usize, value: u8) -> Self {
        self.forbidden.push((cell, value));
        self
    }

    pub fn with_strategy(mut self, strategy: LookaheadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cancel_on_output(mut self, cancel: CancelToken) -> Self {
        self.cancel_on_output = Some(cancel);
        self
    }
}

impl SearchProblem for CellProblem {
    type State = CellState;
    type Action = Place;
    type Output = Vec<Option<u8>>;

    fn start_state(&self) -> CellState {
        CellState {
            cells: vec![None; self.cells],
            remaining: self.counts.clone(),
            depth: 0,
            max_depth: self.counts.iter().sum::<u32>() as usize,
        }
    }

    fn apply(&self, action: &Place, state: &mut CellState) {
        debug_assert!(state.cells[action.cell].is_none());
        state.cells[action.cell] = Some(action.value);
        state.remaining[action.value as usize] -= 1;
        state.depth += 1;
    }

    fn collect_actions(&self, state: &CellState) -> Vec<Place> {
        let mut actions = Vec::new();
        for (cell, slot) in state.cells.iter().enumerate() {
            if slot.is_some() {
                continue;
            }
            for (value, &left) in state.remaining.iter().enumerate() {
                let value = value as u8;
                if left > 0 && !self.forbidden.contains(&(cell, value)) {
                    actions.push(Place { cell, value });
                }
            }
        }
        actions
    }

    fn score(&self, state: &CellState) -> f64 {
        state
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i + 1) as f64 * f64::from(v)))
            .sum()
    }

    fn strategy(&self, _state: &CellState) -> LookaheadStrategy {
        self.strategy
    }

    fn output(&self, state: &CellState, _score: f64) -> Vec<Option<u8>> {
        if let Some(cancel) = &self.cancel_on_output {
            cancel.cancel();
        }
        state.cells.clone()
    }
}
