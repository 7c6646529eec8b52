//! Live progress of one search phase.
//!
//! [`SearchProgress`] is written by exactly one worker and read by any
//! number of observers. Scalar counters are lock-free atomics; only the
//! best result and the subscriber list sit behind a mutex. Readers may
//! therefore see counters from slightly different moments, but each
//! individual value is consistent and the best result is published
//! atomically together with its score.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// `f64` stored as raw bits in an [`AtomicU64`].
#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    /// Raises the value to `v` if larger. Only valid for non-negative
    /// values, whose bit patterns order like the numbers.
    #[inline]
    fn fetch_max(&self, v: f64) {
        debug_assert!(v >= 0.0);
        self.0.fetch_max(v.to_bits(), Ordering::AcqRel);
    }
}

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// The whole tree was explored (or pruned).
    Exhausted,
    /// Stopped on the first complete assignment.
    FirstSolution,
    /// Stopped by a cancel request.
    Cancelled,
}

#[derive(Debug)]
struct BestResult<O> {
    score: f64,
    output: Arc<O>,
}

/// Shared, observable progress of one search phase.
#[derive(Debug)]
pub struct SearchProgress<O> {
    running: AtomicBool,
    complete: AtomicBool,
    cancelled: AtomicBool,
    current_depth: AtomicUsize,
    max_depth: AtomicUsize,
    operations_done: AtomicU64,
    dead_ends: AtomicU64,
    score_evaluations: AtomicU64,
    percent_domain_seen: AtomicF64,
    current_depth_completeness: AtomicF64,
    partial_score: AtomicF64,
    best_score: AtomicF64, // NaN until the first result; peek without locking
    best: Mutex<Option<BestResult<O>>>,
    subscribers: Mutex<Vec<Sender<Arc<O>>>>,
}

/// Point-in-time copy of every progress counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Worker is inside this phase.
    pub is_running: bool,
    /// Phase ended on its own (exhausted or first solution).
    pub is_complete: bool,
    /// Phase ended because of a cancel request.
    pub was_cancelled: bool,
    /// Depth of the state currently at the top of the stack.
    pub current_depth: usize,
    /// Depth of a complete assignment.
    pub max_depth: usize,
    /// Outer-loop iterations so far.
    pub operations_done: u64,
    /// Frontiers that turned out to have no viable action.
    pub dead_ends: u64,
    /// Calls to the scoring function, including lookahead.
    pub score_evaluations: u64,
    /// Rough estimate of the explored share of the tree, in percent.
    pub percent_domain_seen: f64,
    /// Share of the current ranking batch already evaluated (0..=1).
    pub current_depth_completeness: f64,
    /// Score of the state at the top of the stack.
    pub partial_score: f64,
    /// Score of the best complete result, if any.
    pub best_score: Option<f64>,
}

impl<O> SearchProgress<O> {
    /// Creates an idle progress record with no result.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            complete: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            current_depth: AtomicUsize::new(0),
            max_depth: AtomicUsize::new(0),
            operations_done: AtomicU64::new(0),
            dead_ends: AtomicU64::new(0),
            score_evaluations: AtomicU64::new(0),
            percent_domain_seen: AtomicF64::new(0.0),
            current_depth_completeness: AtomicF64::new(0.0),
            partial_score: AtomicF64::new(0.0),
            best_score: AtomicF64::new(f64::NAN),
            best: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    // ---- observer side ----

    /// Whether the worker is inside this phase.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether this phase ended on its own, without a cancel request.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Whether this phase ended because of a cancel request.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Depth of the state at the top of the stack.
    pub fn current_depth(&self) -> usize {
        self.current_depth.load(Ordering::Acquire)
    }

    /// Depth of a complete assignment.
    pub fn max_depth(&self) -> usize {
        self.max_depth.load(Ordering::Acquire)
    }

    /// Outer-loop iterations so far.
    pub fn operations_done(&self) -> u64 {
        self.operations_done.load(Ordering::Acquire)
    }

    /// Frontiers found to have no viable action.
    pub fn dead_ends(&self) -> u64 {
        self.dead_ends.load(Ordering::Acquire)
    }

    /// Calls to the scoring function.
    pub fn score_evaluations(&self) -> u64 {
        self.score_evaluations.load(Ordering::Acquire)
    }

    /// Estimated explored share of the tree, in percent.
    pub fn percent_domain_seen(&self) -> f64 {
        self.percent_domain_seen.load()
    }

    /// Share of the current ranking batch already evaluated.
    pub fn current_depth_completeness(&self) -> f64 {
        self.current_depth_completeness.load()
    }

    /// Score of the state at the top of the stack.
    pub fn partial_score(&self) -> f64 {
        self.partial_score.load()
    }

    /// Score of the best result, without locking.
    pub fn best_score(&self) -> Option<f64> {
        let s = self.best_score.load();
        (!s.is_nan()).then_some(s)
    }

    /// Best complete result published so far.
    pub fn best_result(&self) -> Option<Arc<O>> {
        self.best.lock().as_ref().map(|b| Arc::clone(&b.output))
    }

    /// Receives every future improvement of the best result, in order.
    ///
    /// The receiver is dropped from the list once it hangs up.
    pub fn subscribe(&self) -> Receiver<Arc<O>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Copies every counter.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            is_running: self.is_running(),
            is_complete: self.is_complete(),
            was_cancelled: self.was_cancelled(),
            current_depth: self.current_depth(),
            max_depth: self.max_depth(),
            operations_done: self.operations_done(),
            dead_ends: self.dead_ends(),
            score_evaluations: self.score_evaluations(),
            percent_domain_seen: self.percent_domain_seen(),
            current_depth_completeness: self.current_depth_completeness(),
            partial_score: self.partial_score(),
            best_score: self.best_score(),
        }
    }

    // ---- worker side ----

    pub(crate) fn begin(&self, max_depth: usize) {
        self.max_depth.store(max_depth, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }

    pub(crate) fn finish(&self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Exhausted => {
                self.percent_domain_seen.store(100.0);
                self.complete.store(true, Ordering::Release);
            }
            SearchOutcome::FirstSolution => self.complete.store(true, Ordering::Release),
            SearchOutcome::Cancelled => self.cancelled.store(true, Ordering::Release),
        }
        self.running.store(false, Ordering::Release);
    }

    /// Marks a phase that never ran (e.g. skipped after a failed phase).
    pub(crate) fn skip(&self, cancelled: bool) {
        self.cancelled.store(cancelled, Ordering::Release);
        self.complete.store(!cancelled, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }

    /// Stops a phase interrupted by a fault; it is neither complete nor
    /// cancelled.
    pub(crate) fn abort(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub(crate) fn record_operation(&self) {
        self.operations_done.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn record_dead_end(&self) {
        self.dead_ends.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn record_evaluation(&self) {
        self.score_evaluations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_depth_completeness(&self, v: f64) {
        self.current_depth_completeness.store(v);
    }

    /// Raises the depth completeness; concurrent rankers never move it back.
    #[inline]
    pub(crate) fn advance_depth_completeness(&self, v: f64) {
        self.current_depth_completeness.fetch_max(v);
    }

    pub(crate) fn publish_level(&self, depth: usize, partial_score: f64, percent: f64) {
        self.current_depth.store(depth, Ordering::Release);
        self.partial_score.store(partial_score);
        self.percent_domain_seen.store(percent);
    }

    /// Installs `output` if `score` strictly beats the current best.
    ///
    /// `make` is only called when the result is actually installed.
    pub(crate) fn try_install(&self, score: f64, make: impl FnOnce() -> O) -> bool {
        if self.best_score().is_some_and(|best| score <= best) {
            return false;
        }

        let mut guard = self.best.lock();
        if guard.as_ref().is_some_and(|best| score <= best.score) {
            return false;
        }

        let output = Arc::new(make());
        *guard = Some(BestResult {
            score,
            output: Arc::clone(&output),
        });
        self.best_score.store(score);
        drop(guard);

        self.subscribers
            .lock()
            .retain(|tx| tx.send(Arc::clone(&output)).is_ok());
        true
    }
}

impl<O> Default for SearchProgress<O> {
    fn default() -> Self {
        Self::new()
    }
}
