//! Chairperson-phase heuristic.
//!
//! Balances total appearances (reviewer + supervisor + chaired slots)
//! across the available chairpersons, nudged by their slot preferences:
//!
//! ```text
//! score = -σ(workload over available chairs) + w · Σ(preferred - undesired)
//! ```
//!
//! σ is the population standard deviation, chairs without any work
//! included.

use super::state::ChairState;
use super::transform::ChairInput;

/// Population standard deviation of the available chairs' workload.
pub fn workload_deviation(state: &ChairState, input: &ChairInput) -> f64 {
    let n = input.chairs.len();
    if n == 0 {
        return 0.0;
    }
    let loads = input
        .chairs
        .iter()
        .map(|&c| f64::from(state.workload()[c as usize]));
    let mean = loads.clone().sum::<f64>() / n as f64;
    let variance = loads.map(|l| (l - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt()
}

/// Score of a (partial) chairperson assignment; higher is better.
pub fn chair_score(state: &ChairState, input: &ChairInput, preference_weight: f64) -> f64 {
    -workload_deviation(state, input) + preference_weight * state.preference_balance() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chair::state::ChairAction;
    use crate::chair::transform::BlockPosition;
    use crate::models::{Input, InputClassroom, InputDay, PreferenceType};

    fn input() -> ChairInput {
        // Person 0 and 1 each have demand 2; chairs 1 and 2.
        ChairInput::new(
            &Input::new()
                .with_chair_persons([1, 2])
                .with_defense(0, 1, 2)
                .with_day(InputDay::new(0).with_classroom(
                    InputClassroom::new(0, vec![2, 1])
                        .with_preference(2, 2, PreferenceType::Undesired),
                )),
        )
    }

    fn at(block: u16) -> BlockPosition {
        BlockPosition {
            day: 0,
            classroom: 0,
            block,
        }
    }

    #[test]
    fn test_deviation_of_start_state() {
        let ci = input();
        let state = ChairState::new(&ci);
        // Loads 2 and 0 -> σ = 1.
        assert!((workload_deviation(&state, &ci) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_assignment_scores_higher() {
        let ci = input();
        let start = ChairState::new(&ci);

        let mut balanced = start.clone();
        balanced.apply(&ChairAction { position: at(0), chair: 2 }, &ci);
        let mut skewed = start.clone();
        skewed.apply(&ChairAction { position: at(0), chair: 1 }, &ci);

        // Loads 2/2 vs 4/0.
        assert_eq!(workload_deviation(&balanced, &ci), 0.0);
        assert!((workload_deviation(&skewed, &ci) - 2.0).abs() < 1e-12);
        assert!(chair_score(&balanced, &ci, 0.01) > chair_score(&skewed, &ci, 0.01));
    }

    #[test]
    fn test_preference_term() {
        let ci = input();
        let mut state = ChairState::new(&ci);
        state.apply(&ChairAction { position: at(1), chair: 2 }, &ci);
        // Loads 2/1 -> σ = 0.5; one undesired slot.
        let score = chair_score(&state, &ci, 0.1);
        assert!((score - (-0.5 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let ci = input();
        let state = ChairState::new(&ci);
        assert_eq!(chair_score(&state, &ci, 0.01), chair_score(&state, &ci, 0.01));
    }
}
