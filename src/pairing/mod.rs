//! Reviewer/supervisor phase.
//!
//! With every block chaired, places each defense demand (an unordered
//! reviewer/supervisor pair with a count) into one staffed slot. Slots with
//! the same index on the same day run concurrently across classrooms; the
//! rules keep every person in at most one room per time. The pipeline
//! searches this phase exhaustively and publishes each better timetable.
//!
//! # Rules
//!
//! | Rule | Rejects |
//! |------|---------|
//! | [`TargetSlotOpen`] | slots already holding a defense |
//! | [`PairDemandLeft`] | pairs with no defenses left |
//! | [`SlotStaffed`] | slots without a chairperson |
//! | [`NoVetoedPerson`] | members with `NotAllowed` at this time in any room |
//! | [`NoChairConflict`] | members chairing at this time |
//! | [`NoConcurrentCollision`] | members already in a defense at this time |

mod metric;
mod problem;
mod rules;
mod score;
mod state;
mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use metric::{MetricKind, MetricTable, MetricWeight};
pub use problem::PairProblem;
pub use rules::{
    default_rules, NoChairConflict, NoConcurrentCollision, NoVetoedPerson, PairDemandLeft,
    PairRules, SlotStaffed, TargetSlotOpen,
};
pub use score::GeneralPeopleScore;
pub use state::{PairAction, PairState};
pub use transform::{
    Orientation, Pair, PairClassroom, PairDay, PairInput, PairSlot, SlotPosition,
};
