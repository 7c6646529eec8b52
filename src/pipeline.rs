//! Two-phase optimization on a background worker.
//!
//! [`Optimization::start`] validates the input, then runs on one dedicated
//! thread:
//!
//! 1. **Chairperson phase**: [`ChairProblem`], stopped at the first complete
//!    assignment.
//! 2. **Pair phase**: [`PairProblem`] over that assignment, searched
//!    exhaustively until the tree is spent or the caller cancels.
//!
//! The handle returns immediately. Each phase publishes into its own
//! [`SearchProgress`], readable at any time; the final timetable is the
//! pair phase's best result. A panic on the worker is caught and reported
//! through [`Optimization::fault`].
//!
//! Extra hard constraints can be added per phase through [`PhaseRules`] and
//! [`Optimization::start_with_rules`].
//!
//! Dropping the handle detaches the worker; cancel first to stop it.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chair::{self, ChairAssignment, ChairProblem, ChairRules};
use crate::config::OptimizerConfig;
use crate::error::ScheduleError;
use crate::models::{Input, Solution};
use crate::pairing::{self, PairProblem, PairRules};
use crate::search::{
    BacktrackingSearch, CancelToken, SearchOutcome, SearchProgress, TerminationPolicy,
};
use crate::validation::validate_input;

/// Where the worker currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PipelinePhase {
    /// Worker spawned, no phase entered yet.
    Starting = 0,
    /// Assigning chairpersons to blocks.
    ChairPersonAssignment = 1,
    /// Assigning reviewer/supervisor pairs to slots.
    PairAssignment = 2,
    /// Worker finished, whatever the outcome.
    Done = 3,
}

impl PipelinePhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PipelinePhase::Starting,
            1 => PipelinePhase::ChairPersonAssignment,
            2 => PipelinePhase::PairAssignment,
            _ => PipelinePhase::Done,
        }
    }
}

/// State shared between the handle and the worker.
#[derive(Debug)]
struct Shared {
    phase: AtomicU8,
    fault: Mutex<Option<String>>,
    chair_progress: Arc<SearchProgress<ChairAssignment>>,
    pair_progress: Arc<SearchProgress<Solution>>,
}

impl Shared {
    fn enter(&self, phase: PipelinePhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn record_fault(&self, message: String) {
        warn!(fault = %message, "optimization worker panicked");
        *self.fault.lock() = Some(message);
        // Stop whichever phase the panic interrupted.
        self.chair_progress.abort();
        self.pair_progress.abort();
    }
}

/// Hard constraints of both phases.
#[derive(Debug, Clone)]
pub struct PhaseRules {
    /// Rules of the chairperson phase.
    pub chair: ChairRules,
    /// Rules of the pair phase.
    pub pair: PairRules,
}

impl Default for PhaseRules {
    fn default() -> Self {
        Self {
            chair: chair::default_rules(),
            pair: pairing::default_rules(),
        }
    }
}

impl PhaseRules {
    /// Replaces the chairperson-phase rules.
    pub fn with_chair(mut self, rules: ChairRules) -> Self {
        self.chair = rules;
        self
    }

    /// Replaces the pair-phase rules.
    pub fn with_pair(mut self, rules: PairRules) -> Self {
        self.pair = rules;
        self
    }
}

/// Handle to a running (or finished) two-phase optimization.
///
/// # Example
/// ```no_run
/// use defense_schedule::config::OptimizerConfig;
/// use defense_schedule::models::{Input, InputClassroom, InputDay};
/// use defense_schedule::pipeline::Optimization;
/// use defense_schedule::search::CancelToken;
///
/// let input = Input::new()
///     .with_chair_persons([2])
///     .with_defense(0, 1, 1)
///     .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![1])));
/// let run = Optimization::start(input, OptimizerConfig::default(), CancelToken::new()).unwrap();
/// run.wait();
/// let timetable = run.result().unwrap();
/// assert_eq!(timetable.assignment_count(), 1);
/// ```
#[derive(Debug)]
pub struct Optimization {
    shared: Arc<Shared>,
    cancel: CancelToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Optimization {
    /// Validates `input` and starts the worker.
    ///
    /// Returns without waiting for any search work. Fails only when the
    /// input is rejected or the thread cannot be spawned.
    pub fn start(
        input: Input,
        config: OptimizerConfig,
        cancel: CancelToken,
    ) -> Result<Self, ScheduleError> {
        Self::start_with_rules(input, config, PhaseRules::default(), cancel)
    }

    /// Like [`Optimization::start`], with custom hard constraints.
    pub fn start_with_rules(
        input: Input,
        config: OptimizerConfig,
        rules: PhaseRules,
        cancel: CancelToken,
    ) -> Result<Self, ScheduleError> {
        validate_input(&input)?;

        let shared = Arc::new(Shared {
            phase: AtomicU8::new(PipelinePhase::Starting as u8),
            fault: Mutex::new(None),
            chair_progress: Arc::new(SearchProgress::new()),
            pair_progress: Arc::new(SearchProgress::new()),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            thread::Builder::new()
                .name("defense-schedule-worker".into())
                .spawn(move || {
                    let res = catch_unwind(AssertUnwindSafe(|| {
                        run_phases(&input, &config, rules, &shared, &cancel)
                    }));
                    if let Err(payload) = res {
                        shared.record_fault(panic_message(payload.as_ref()));
                    }
                    shared.enter(PipelinePhase::Done);
                })?
        };

        Ok(Self {
            shared,
            cancel,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Current phase of the worker.
    pub fn phase(&self) -> PipelinePhase {
        PipelinePhase::from_u8(self.shared.phase.load(Ordering::Acquire))
    }

    /// Whether the worker has not finished yet.
    pub fn is_running(&self) -> bool {
        self.phase() != PipelinePhase::Done
    }

    /// Requests cooperative cancellation of whichever phase is running.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token observed by the worker.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Progress of the chairperson phase.
    pub fn chair_progress(&self) -> &Arc<SearchProgress<ChairAssignment>> {
        &self.shared.chair_progress
    }

    /// Progress of the pair phase.
    pub fn pair_progress(&self) -> &Arc<SearchProgress<Solution>> {
        &self.shared.pair_progress
    }

    /// Chairperson assignment the pair phase builds on, once found.
    pub fn chair_assignment(&self) -> Option<Arc<ChairAssignment>> {
        self.shared.chair_progress.best_result()
    }

    /// Best complete timetable published so far.
    pub fn result(&self) -> Option<Arc<Solution>> {
        self.shared.pair_progress.best_result()
    }

    /// Panic message captured on the worker, if it crashed.
    pub fn fault(&self) -> Option<String> {
        self.shared.fault.lock().clone()
    }

    /// Blocks until the worker has finished. Later calls return at once.
    pub fn wait(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(payload) = handle.join() {
                self.shared.record_fault(panic_message(payload.as_ref()));
                self.shared.enter(PipelinePhase::Done);
            }
        }
    }
}

fn run_phases(
    input: &Input,
    config: &OptimizerConfig,
    rules: PhaseRules,
    shared: &Shared,
    cancel: &CancelToken,
) {
    shared.enter(PipelinePhase::ChairPersonAssignment);
    let problem = ChairProblem::new(input, config).with_rules(rules.chair);
    let outcome = run_chair_phase(&problem, config, &shared.chair_progress, cancel);

    let Some(chairs) = shared.chair_progress.best_result() else {
        info!(?outcome, "no chairperson assignment, pair phase skipped");
        shared
            .pair_progress
            .skip(outcome == SearchOutcome::Cancelled);
        return;
    };

    shared.enter(PipelinePhase::PairAssignment);
    let problem = PairProblem::new(input, &chairs, config).with_rules(rules.pair);
    run_pair_phase(&problem, config, &shared.pair_progress, cancel);
}

#[tracing::instrument(level = "info", skip_all, name = "chair_phase")]
fn run_chair_phase(
    problem: &ChairProblem,
    config: &OptimizerConfig,
    progress: &Arc<SearchProgress<ChairAssignment>>,
    cancel: &CancelToken,
) -> SearchOutcome {
    BacktrackingSearch::new(problem, Arc::clone(progress), cancel.clone())
        .with_policy(TerminationPolicy::FirstSolution)
        .with_seed(config.seed)
        .run()
}

#[tracing::instrument(level = "info", skip_all, name = "pair_phase")]
fn run_pair_phase(
    problem: &PairProblem,
    config: &OptimizerConfig,
    progress: &Arc<SearchProgress<Solution>>,
    cancel: &CancelToken,
) -> SearchOutcome {
    BacktrackingSearch::new(problem, Arc::clone(progress), cancel.clone())
        .with_policy(TerminationPolicy::Exhaustive)
        .with_seed(config.seed)
        .run()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputClassroom, InputDay, PreferenceType, SolutionSlot};
    use crate::pairing::{PairAction, PairInput, PairState};
    use crate::search::Rule;
    use crate::validation::ValidationErrorKind;
    use std::sync::OnceLock;
    use std::time::Duration;

    struct Explodes;

    impl Rule<PairInput, PairState, PairAction> for Explodes {
        fn name(&self) -> &'static str {
            "Explodes"
        }

        fn passes(&self, _: &PairAction, _: &PairState, _: &PairInput) -> bool {
            panic!("pair rule exploded")
        }
    }

    /// Accepts everything, but once a timetable is published every further
    /// check parks until the run is cancelled.
    struct HoldAfterFirstResult {
        progress: Arc<OnceLock<Arc<SearchProgress<Solution>>>>,
        cancel: CancelToken,
    }

    impl Rule<PairInput, PairState, PairAction> for HoldAfterFirstResult {
        fn name(&self) -> &'static str {
            "HoldAfterFirstResult"
        }

        fn passes(&self, _: &PairAction, _: &PairState, _: &PairInput) -> bool {
            let progress = loop {
                if let Some(p) = self.progress.get() {
                    break p;
                }
                thread::sleep(Duration::from_millis(1));
            };
            while progress.best_result().is_some() && !self.cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            true
        }
    }

    fn run(input: Input) -> Optimization {
        let run =
            Optimization::start(input, OptimizerConfig::default().with_seed(1), CancelToken::new())
                .unwrap();
        run.wait();
        run
    }

    #[test]
    fn test_single_slot_scenario() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 1)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![1])));
        let run = run(input);

        assert_eq!(run.phase(), PipelinePhase::Done);
        assert!(!run.is_running());
        assert!(run.fault().is_none());
        let solution = run.result().unwrap();
        assert_eq!(
            solution.days[0].classrooms[0].slots[0],
            Some(SolutionSlot {
                reviewer_id: 0,
                supervisor_id: 1,
                chair_person_id: 2,
            })
        );
        assert_eq!(run.pair_progress().dead_ends(), 0);
        assert!(run.pair_progress().is_complete());
        assert_eq!(run.pair_progress().percent_domain_seen(), 100.0);
    }

    #[test]
    fn test_insufficient_capacity_is_rejected() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 3)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![2])));
        let err = Optimization::start(input, OptimizerConfig::default(), CancelToken::new())
            .unwrap_err();
        match err {
            ScheduleError::Validation(errors) => assert!(errors
                .iter()
                .any(|e| e.kind == ValidationErrorKind::InsufficientCapacity)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_vetoed_only_slot_has_no_result() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 1)
            .with_day(InputDay::new(0).with_classroom(
                InputClassroom::new(0, vec![1]).with_preference(0, 0, PreferenceType::NotAllowed),
            ));
        let run = run(input);

        assert!(run.chair_assignment().is_some());
        assert!(run.result().is_none());
        assert!(run.pair_progress().dead_ends() >= 1);
        assert!(run.pair_progress().is_complete());
        assert!(run.fault().is_none());
    }

    #[test]
    fn test_immediate_cancel() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let input = Input::new()
            .with_chair_persons([2, 3])
            .with_defense(0, 1, 2)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![2, 2])));
        let run = Optimization::start(input, OptimizerConfig::default(), cancel).unwrap();
        run.wait();

        assert_eq!(run.phase(), PipelinePhase::Done);
        assert!(run.chair_progress().was_cancelled());
        assert!(run.pair_progress().was_cancelled());
        assert!(run.result().is_none());
    }

    #[test]
    fn test_complete_timetable_invariants() {
        // Chairs 4 and 5 staff two parallel rooms for three pairs.
        let input = Input::new()
            .with_chair_persons([4, 5])
            .with_defense(0, 1, 1)
            .with_defense(2, 3, 1)
            .with_defense(0, 2, 1)
            .with_day(
                InputDay::new(0)
                    .with_classroom(InputClassroom::new(0, vec![2]))
                    .with_classroom(InputClassroom::new(1, vec![2])),
            );
        let run = run(input.clone());
        let solution = run.result().unwrap();

        assert_eq!(solution.assignment_count() as u64, input.required_assignments());
        for demand in &input.defenses {
            let placed = solution
                .assigned_slots()
                .filter(|(_, _, _, s)| {
                    s.reviewer_id == demand.reviewer_id && s.supervisor_id == demand.supervisor_id
                })
                .count();
            assert_eq!(placed as u32, demand.count);
        }
        for (d, c, s, slot) in solution.assigned_slots() {
            for (d2, c2, s2, other) in solution.assigned_slots() {
                if d == d2 && s == s2 && c != c2 {
                    for p in [slot.reviewer_id, slot.supervisor_id, slot.chair_person_id] {
                        assert!(!other.involves(p), "person {p} double-booked at slot {s}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_cancel_after_first_timetable_keeps_it() {
        let input = Input::new()
            .with_chair_persons([4])
            .with_defense(0, 1, 1)
            .with_defense(2, 3, 1)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![3])));
        let cancel = CancelToken::new();
        let slot = Arc::new(OnceLock::new());
        let rules = PhaseRules::default().with_pair(pairing::default_rules().with_rule(
            HoldAfterFirstResult {
                progress: Arc::clone(&slot),
                cancel: cancel.clone(),
            },
        ));
        let run = Optimization::start_with_rules(
            input,
            OptimizerConfig::default().with_seed(9),
            rules,
            cancel,
        )
        .unwrap();
        let rx = run.pair_progress().subscribe();
        assert!(slot.set(Arc::clone(run.pair_progress())).is_ok());

        let first = rx.recv_timeout(Duration::from_secs(60)).unwrap();
        run.cancel();
        run.wait();

        assert_eq!(run.phase(), PipelinePhase::Done);
        assert!(run.fault().is_none());
        let pair = run.pair_progress();
        assert!(pair.was_cancelled());
        assert!(!pair.is_complete());
        assert!(!pair.is_running());
        assert!(pair.percent_domain_seen() < 100.0);

        let last = rx.try_iter().last().unwrap_or(first);
        let result = run.result().unwrap();
        assert!(Arc::ptr_eq(&result, &last));
        assert_eq!(result.assignment_count(), 2);
    }

    #[test]
    fn test_panicking_rule_is_reported_as_fault() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 1)
            .with_day(InputDay::new(0).with_classroom(InputClassroom::new(0, vec![1])));
        let rules =
            PhaseRules::default().with_pair(pairing::default_rules().with_rule(Explodes));
        let run = Optimization::start_with_rules(
            input,
            OptimizerConfig::default().with_seed(1),
            rules,
            CancelToken::new(),
        )
        .unwrap();
        run.wait();

        assert_eq!(run.phase(), PipelinePhase::Done);
        assert!(!run.is_running());
        assert!(run.fault().unwrap().contains("pair rule exploded"));
        assert!(run.chair_assignment().is_some());
        assert!(run.result().is_none());
        let pair = run.pair_progress();
        assert!(!pair.is_running());
        assert!(!pair.is_complete());
        assert!(!pair.was_cancelled());
        // A second wait returns at once.
        run.wait();
    }

    #[test]
    fn test_phase_round_trip() {
        for phase in [
            PipelinePhase::Starting,
            PipelinePhase::ChairPersonAssignment,
            PipelinePhase::PairAssignment,
            PipelinePhase::Done,
        ] {
            assert_eq!(PipelinePhase::from_u8(phase as u8), phase);
        }
    }
}
