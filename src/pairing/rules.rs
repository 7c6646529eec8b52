//! Hard constraints of the pair phase.
//!
//! Slots sharing an index on the same day run at the same time, so the
//! collision rules look at the whole time column of the target slot.

use super::state::{PairAction, PairState};
use super::transform::PairInput;
use crate::search::{Rule, RuleSet};

/// Rule set type of the pair phase.
pub type PairRules = RuleSet<PairInput, PairState, PairAction>;

/// The slot must be empty.
#[derive(Debug, Clone, Copy)]
pub struct TargetSlotOpen;

impl Rule<PairInput, PairState, PairAction> for TargetSlotOpen {
    fn name(&self) -> &'static str {
        "TargetSlotOpen"
    }

    fn passes(&self, action: &PairAction, state: &PairState, _input: &PairInput) -> bool {
        state.is_open(action.position)
    }
}

/// The slot must have a chairperson.
#[derive(Debug, Clone, Copy)]
pub struct SlotStaffed;

impl Rule<PairInput, PairState, PairAction> for SlotStaffed {
    fn name(&self) -> &'static str {
        "SlotStaffed"
    }

    fn passes(&self, action: &PairAction, _state: &PairState, input: &PairInput) -> bool {
        input.slot(action.position).chair.is_some()
    }
}

/// The pair must have defenses left to place.
#[derive(Debug, Clone, Copy)]
pub struct PairDemandLeft;

impl Rule<PairInput, PairState, PairAction> for PairDemandLeft {
    fn name(&self) -> &'static str {
        "PairDemandLeft"
    }

    fn passes(&self, action: &PairAction, state: &PairState, _input: &PairInput) -> bool {
        state.remaining_for_pair(action.pair) > 0
    }
}

/// Neither member may have a `NotAllowed` preference at this time.
#[derive(Debug, Clone, Copy)]
pub struct NoVetoedPerson;

impl Rule<PairInput, PairState, PairAction> for NoVetoedPerson {
    fn name(&self) -> &'static str {
        "NoVetoedPerson"
    }

    fn passes(&self, action: &PairAction, _state: &PairState, input: &PairInput) -> bool {
        let row = &input.days[action.position.day as usize].vetoed[action.position.slot as usize];
        !row[action.a as usize] && !row[action.b as usize]
    }

    fn description(&self) -> &'static str {
        "No member vetoes the time position"
    }
}

/// Neither member may chair any slot at this time, the target included.
#[derive(Debug, Clone, Copy)]
pub struct NoChairConflict;

impl Rule<PairInput, PairState, PairAction> for NoChairConflict {
    fn name(&self) -> &'static str {
        "NoChairConflict"
    }

    fn passes(&self, action: &PairAction, _state: &PairState, input: &PairInput) -> bool {
        input.days[action.position.day as usize]
            .concurrent(action.position.slot as usize)
            .all(|(_, slot)| slot.chair.map_or(true, |chair| !action.involves(chair)))
    }

    fn description(&self) -> &'static str {
        "Pair members are not chairing at the same time"
    }
}

/// Neither member may attend another defense at this time.
#[derive(Debug, Clone, Copy)]
pub struct NoConcurrentCollision;

impl Rule<PairInput, PairState, PairAction> for NoConcurrentCollision {
    fn name(&self) -> &'static str {
        "NoConcurrentCollision"
    }

    fn passes(&self, action: &PairAction, state: &PairState, input: &PairInput) -> bool {
        let pos = action.position;
        let day = &input.days[pos.day as usize];
        day.concurrent(pos.slot as usize).all(|(c, _)| {
            match state.pair_at_index(pos.day as usize, c, pos.slot as usize) {
                Some(other) => {
                    let other = &input.pairs[other as usize];
                    !other.involves(action.a) && !other.involves(action.b)
                }
                None => true,
            }
        })
    }

    fn description(&self) -> &'static str {
        "Pair members are not in another defense at the same time"
    }
}

/// Rules applied to every pair candidate, cheapest first.
pub fn default_rules() -> PairRules {
    RuleSet::new()
        .with_rule(TargetSlotOpen)
        .with_rule(PairDemandLeft)
        .with_rule(SlotStaffed)
        .with_rule(NoVetoedPerson)
        .with_rule(NoChairConflict)
        .with_rule(NoConcurrentCollision)
}
