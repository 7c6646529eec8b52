//! Hard constraints of the chairperson phase.

use super::state::{ChairAction, ChairState};
use super::transform::ChairInput;
use crate::search::{Rule, RuleSet};

/// Rule set type of the chairperson phase.
pub type ChairRules = RuleSet<ChairInput, ChairState, ChairAction>;

/// The block must not have a chairperson yet.
#[derive(Debug, Clone, Copy)]
pub struct TargetBlockOpen;

impl Rule<ChairInput, ChairState, ChairAction> for TargetBlockOpen {
    fn name(&self) -> &'static str {
        "TargetBlockOpen"
    }

    fn passes(&self, action: &ChairAction, state: &ChairState, _input: &ChairInput) -> bool {
        state.is_open(action.position)
    }
}

/// A chairperson with a `NotAllowed` preference on any slot of the block
/// cannot chair it.
#[derive(Debug, Clone, Copy)]
pub struct NoChairVeto;

impl Rule<ChairInput, ChairState, ChairAction> for NoChairVeto {
    fn name(&self) -> &'static str {
        "NoChairVeto"
    }

    fn passes(&self, action: &ChairAction, _state: &ChairState, input: &ChairInput) -> bool {
        input.block(action.position).tally[action.chair as usize].not_allowed == 0
    }

    fn description(&self) -> &'static str {
        "Chairperson not vetoed on any slot of the block"
    }
}

/// A chairperson cannot chair two blocks that share a time position.
#[derive(Debug, Clone, Copy)]
pub struct NoOverlappingChair;

impl Rule<ChairInput, ChairState, ChairAction> for NoOverlappingChair {
    fn name(&self) -> &'static str {
        "NoOverlappingChair"
    }

    fn passes(&self, action: &ChairAction, state: &ChairState, input: &ChairInput) -> bool {
        input
            .block(action.position)
            .overlapping
            .iter()
            .all(|&other| state.chair_at(other) != Some(action.chair))
    }

    fn description(&self) -> &'static str {
        "Chairperson not already chairing a concurrent block"
    }
}

/// Rules applied to every chairperson candidate, cheapest first.
pub fn default_rules() -> ChairRules {
    RuleSet::new()
        .with_rule(TargetBlockOpen)
        .with_rule(NoChairVeto)
        .with_rule(NoOverlappingChair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chair::transform::BlockPosition;
    use crate::models::{Input, InputClassroom, InputDay, PreferenceType};

    fn input() -> ChairInput {
        ChairInput::new(
            &Input::new()
                .with_chair_persons([2, 3])
                .with_defense(0, 1, 1)
                .with_day(
                    InputDay::new(0)
                        .with_classroom(
                            InputClassroom::new(0, vec![2])
                                .with_preference(1, 3, PreferenceType::NotAllowed),
                        )
                        .with_classroom(InputClassroom::new(1, vec![1, 1])),
                ),
        )
    }

    fn at(classroom: u16, block: u16) -> BlockPosition {
        BlockPosition {
            day: 0,
            classroom,
            block,
        }
    }

    #[test]
    fn test_target_block_open() {
        let ci = input();
        let mut state = ChairState::new(&ci);
        let action = ChairAction { position: at(0, 0), chair: 2 };
        assert!(TargetBlockOpen.passes(&action, &state, &ci));
        state.apply(&action, &ci);
        assert!(!TargetBlockOpen.passes(&action, &state, &ci));
    }

    #[test]
    fn test_veto_anywhere_in_block() {
        let ci = input();
        let state = ChairState::new(&ci);
        let vetoed = ChairAction { position: at(0, 0), chair: 3 };
        let allowed = ChairAction { position: at(1, 1), chair: 3 };
        assert!(!NoChairVeto.passes(&vetoed, &state, &ci));
        assert!(NoChairVeto.passes(&allowed, &state, &ci));
    }

    #[test]
    fn test_overlapping_blocks() {
        let ci = input();
        let mut state = ChairState::new(&ci);
        state.apply(&ChairAction { position: at(1, 0), chair: 2 }, &ci);

        // Room 0's single block spans both time positions of room 1.
        let clash = ChairAction { position: at(0, 0), chair: 2 };
        let sequential = ChairAction { position: at(1, 1), chair: 2 };
        assert!(!NoOverlappingChair.passes(&clash, &state, &ci));
        assert!(NoOverlappingChair.passes(&sequential, &state, &ci));
    }

    #[test]
    fn test_default_rules_report_violation() {
        let ci = input();
        let state = ChairState::new(&ci);
        let rules = default_rules();
        assert_eq!(rules.len(), 3);
        let vetoed = ChairAction { position: at(0, 0), chair: 3 };
        let violation = rules.first_violation(&vetoed, &state, &ci).unwrap();
        assert_eq!(violation.rule, "NoChairVeto");
    }
}
