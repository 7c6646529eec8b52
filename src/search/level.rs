//! Stack frames of the backtracking search.

/// A candidate action together with its lookahead rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedAction<A> {
    /// The action.
    pub action: A,
    /// Estimated quality of the subtree below it (higher is better).
    pub rank: f64,
}

/// One frame of the DFS stack: a state, its ranked children and a cursor
/// to the next child to try.
#[derive(Debug, Clone)]
pub struct Level<S, A> {
    state: S,
    score: f64,
    actions: Vec<RankedAction<A>>,
    cursor: usize,
}

impl<S, A: Copy> Level<S, A> {
    /// Creates a frame; `actions` must already be in descending rank order.
    pub fn new(state: S, score: f64, actions: Vec<RankedAction<A>>) -> Self {
        debug_assert!(actions.windows(2).all(|w| w[0].rank >= w[1].rank));
        Self {
            state,
            score,
            actions,
            cursor: 0,
        }
    }

    /// The frame's state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Score of the frame's own state.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Number of ranked actions.
    pub fn candidate_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns the next untried action and advances the cursor.
    pub fn take_next(&mut self) -> Option<RankedAction<A>> {
        let next = self.actions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(next)
    }

    /// Whether every action has been tried.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.actions.len()
    }

    /// Share of this frame's subtrees already finished.
    ///
    /// The action under the cursor is still being explored, so it does not
    /// count as seen yet.
    pub fn seen_fraction(&self) -> f64 {
        if self.actions.is_empty() {
            return 0.0;
        }
        self.cursor.saturating_sub(1) as f64 / self.actions.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(ranks: &[f64]) -> Vec<RankedAction<usize>> {
        ranks
            .iter()
            .enumerate()
            .map(|(action, &rank)| RankedAction { action, rank })
            .collect()
    }

    #[test]
    fn test_take_next_in_order() {
        let mut level = Level::new((), 0.0, ranked(&[3.0, 2.0, 2.0]));
        assert_eq!(level.take_next().map(|r| r.action), Some(0));
        assert_eq!(level.take_next().map(|r| r.action), Some(1));
        assert_eq!(level.take_next().map(|r| r.action), Some(2));
        assert!(level.is_exhausted());
        assert!(level.take_next().is_none());
    }

    #[test]
    fn test_seen_fraction() {
        let mut level = Level::new((), 0.0, ranked(&[4.0, 3.0, 2.0, 1.0]));
        assert_eq!(level.seen_fraction(), 0.0);
        level.take_next();
        assert_eq!(level.seen_fraction(), 0.0);
        level.take_next();
        assert_eq!(level.seen_fraction(), 0.25);
        level.take_next();
        level.take_next();
        assert_eq!(level.seen_fraction(), 0.75);
    }

    #[test]
    fn test_empty_level() {
        let mut level: Level<(), usize> = Level::new((), -1.0, Vec::new());
        assert!(level.is_exhausted());
        assert_eq!(level.seen_fraction(), 0.0);
        assert!(level.take_next().is_none());
        assert_eq!(level.score(), -1.0);
    }
}
