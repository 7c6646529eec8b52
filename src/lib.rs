//! Defense-session timetabling.
//!
//! Schedules thesis defenses into days, classrooms and slots in two phases,
//! each a depth-first backtracking search whose candidates are ranked by a
//! bounded, stochastic lookahead:
//!
//! 1. [`chair`]: one chairperson per block of consecutive slots, balancing
//!    chairperson workload.
//! 2. [`pairing`]: every reviewer/supervisor pair into a staffed slot,
//!    scored by a weighted table of per-person comfort metrics.
//!
//! # Modules
//!
//! - **`models`**: Input problem and output timetable (serde-friendly)
//! - **`validation`**: Pre-flight input checks
//! - **`config`**: Lookahead schedules, metric weights, scoring targets
//! - **`search`**: Generic backtracking engine, lookahead ranking, progress
//! - **`chair`** / **`pairing`**: The two search phases
//! - **`pipeline`**: Background worker running both phases
//!
//! # Example
//! ```no_run
//! use defense_schedule::prelude::*;
//!
//! let input = Input::new()
//!     .with_chair_persons([2])
//!     .with_defense(0, 1, 1)
//!     .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![1])));
//! let run = Optimization::start(input, OptimizerConfig::default(), CancelToken::new())?;
//! run.wait();
//! if let Some(timetable) = run.result() {
//!     println!("score {}", timetable.score);
//! }
//! # Ok::<(), ScheduleError>(())
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

pub mod chair;
pub mod config;
pub mod error;
pub mod models;
pub mod pairing;
pub mod pipeline;
pub mod search;
pub mod validation;

/// Types needed to run an optimization end to end.
pub mod prelude {
    pub use crate::config::{OptimizerConfig, ScoringTargets};
    pub use crate::error::ScheduleError;
    pub use crate::models::{
        Input, InputClassroom, InputDay, PreferenceType, Solution, SolutionSlot,
    };
    pub use crate::pairing::{MetricKind, MetricTable};
    pub use crate::pipeline::{Optimization, PhaseRules, PipelinePhase};
    pub use crate::search::{CancelToken, LookaheadSchedule, ProgressSnapshot, SearchProgress};
}
