//! Chairperson phase.
//!
//! Assigns exactly one chairperson to every block (a contiguous run of
//! slots in one classroom) so that total appearances are balanced across
//! the chairperson pool. The pipeline stops this phase at the first
//! complete assignment; see [`crate::pipeline`].
//!
//! # Rules
//!
//! | Rule | Rejects |
//! |------|---------|
//! | [`TargetBlockOpen`] | blocks that already have a chairperson |
//! | [`NoChairVeto`] | chairs with `NotAllowed` on any slot of the block |
//! | [`NoOverlappingChair`] | chairs already presiding at the same time elsewhere |

mod assignment;
mod problem;
mod rules;
mod score;
mod state;
mod transform;

pub use assignment::{
    AssignedBlock, ChairAssignment, ChairAssignmentClassroom, ChairAssignmentDay, ChairWorkload,
};
pub use problem::ChairProblem;
pub use rules::{default_rules, ChairRules, NoChairVeto, NoOverlappingChair, TargetBlockOpen};
pub use score::{chair_score, workload_deviation};
pub use state::{ChairAction, ChairState};
pub use transform::{
    BlockInfo, BlockPosition, ChairClassroom, ChairDay, ChairInput, PreferenceTally,
};
