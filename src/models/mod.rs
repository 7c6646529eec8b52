//! Defense scheduling domain models.
//!
//! Provides the problem definition handed to the optimizer and the
//! finished timetable it produces. Both are plain serde-friendly data;
//! the search itself works on the derived, dense views built by the
//! [`crate::chair`] and [`crate::pairing`] transforms.
//!
//! # Domain Mappings
//!
//! | defense-schedule | Institution |
//! |------------------|-------------|
//! | Day | Exam session day |
//! | Classroom | Defense room |
//! | Block | Sitting under one chairperson |
//! | Slot | One defense |
//! | Pair | Reviewer + supervisor of a thesis |

mod input;
mod solution;

pub use input::{
    DefenseDemand, Input, InputClassroom, InputDay, InputSlot, PersonId, PreferenceType,
    SlotPreference,
};
pub(crate) use input::compact_person;
pub use solution::{Solution, SolutionClassroom, SolutionDay, SolutionSlot};
