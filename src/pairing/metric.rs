//! Weighted metric table of the pair-phase scorer.
//!
//! The metric set is closed, so weights live in a fixed array indexed by
//! [`MetricKind`]. A depth-dependent metric is scaled by `depth / max_depth`
//! of the scored state; early partial states are judged more leniently.
//!
//! # Defaults
//!
//! | Metric | Weight | Depth-dependent |
//! |--------|--------|-----------------|
//! | VacationDay | 0.0001 | no |
//! | EveningStarting | 0.00001 | yes |
//! | DailyAssignmentsCount | 0.3 | no |
//! | DailyOverspread | 0.9 | no |
//! | BlockLength | 0.01 | no |
//! | SwitchingClassesByChairPerson | 0.01 | no |
//! | SwitchingClassesByOthers | 0.01 | no |
//! | AssignmentGaps | 0.032 | no |
//! | RoleSwitching | 0.0 | no |
//! | ChairPersonAssignmentsLeft | 1.0 | yes |
//! | SlotPreference | 0.05 | no |
//! | UnusedChairPersons | 0.05 | yes |
//! | ChairWorkloadDeviation | 0.1 | yes |

use serde::{Deserialize, Serialize};

/// A scored aspect of a pair assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Reward per free day, penalty per busy day.
    VacationDay,
    /// Penalty growing with the first occupied slot of a day.
    EveningStarting,
    /// Defenses per day measured against the target band.
    DailyAssignmentsCount,
    /// Penalty for a first-to-last span wider than the target.
    DailyOverspread,
    /// Consecutive defenses measured against the target block length.
    BlockLength,
    /// Classroom changes where one side is a chairing block.
    SwitchingClassesByChairPerson,
    /// Classroom changes between reviewer/supervisor blocks.
    SwitchingClassesByOthers,
    /// Idle slots between two blocks of the same day.
    AssignmentGaps,
    /// Changes between chairing and reviewing/supervising.
    RoleSwitching,
    /// Share of an assigned chairperson's own defenses still unplaced.
    ChairPersonAssignmentsLeft,
    /// Reviewers and supervisors on preferred or undesired slots.
    SlotPreference,
    /// Available chairpersons with no appearance at all.
    UnusedChairPersons,
    /// Spread of appearances across the chairperson pool.
    ChairWorkloadDeviation,
}

impl MetricKind {
    /// Number of metric kinds.
    pub const COUNT: usize = 13;

    /// Every kind, in table order.
    pub const ALL: [MetricKind; Self::COUNT] = [
        MetricKind::VacationDay,
        MetricKind::EveningStarting,
        MetricKind::DailyAssignmentsCount,
        MetricKind::DailyOverspread,
        MetricKind::BlockLength,
        MetricKind::SwitchingClassesByChairPerson,
        MetricKind::SwitchingClassesByOthers,
        MetricKind::AssignmentGaps,
        MetricKind::RoleSwitching,
        MetricKind::ChairPersonAssignmentsLeft,
        MetricKind::SlotPreference,
        MetricKind::UnusedChairPersons,
        MetricKind::ChairWorkloadDeviation,
    ];

    /// Position in [`MetricKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable name, used in score breakdowns.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::VacationDay => "VacationDay",
            MetricKind::EveningStarting => "EveningStarting",
            MetricKind::DailyAssignmentsCount => "DailyAssignmentsCount",
            MetricKind::DailyOverspread => "DailyOverspread",
            MetricKind::BlockLength => "BlockLength",
            MetricKind::SwitchingClassesByChairPerson => "SwitchingClassesByChairPerson",
            MetricKind::SwitchingClassesByOthers => "SwitchingClassesByOthers",
            MetricKind::AssignmentGaps => "AssignmentGaps",
            MetricKind::RoleSwitching => "RoleSwitching",
            MetricKind::ChairPersonAssignmentsLeft => "ChairPersonAssignmentsLeft",
            MetricKind::SlotPreference => "SlotPreference",
            MetricKind::UnusedChairPersons => "UnusedChairPersons",
            MetricKind::ChairWorkloadDeviation => "ChairWorkloadDeviation",
        }
    }
}

/// Weight of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeight {
    /// Factor applied to the raw metric value.
    pub weight: f64,
    /// Whether the contribution is scaled by search depth.
    pub depth_dependent: bool,
}

impl MetricWeight {
    const fn new(weight: f64, depth_dependent: bool) -> Self {
        Self {
            weight,
            depth_dependent,
        }
    }
}

/// Weights of every [`MetricKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    weights: [MetricWeight; MetricKind::COUNT],
}

impl Default for MetricTable {
    fn default() -> Self {
        Self {
            weights: [
                MetricWeight::new(0.0001, false),
                MetricWeight::new(0.00001, true),
                MetricWeight::new(0.3, false),
                MetricWeight::new(0.9, false),
                MetricWeight::new(0.01, false),
                MetricWeight::new(0.01, false),
                MetricWeight::new(0.01, false),
                MetricWeight::new(0.032, false),
                MetricWeight::new(0.0, false),
                MetricWeight::new(1.0, true),
                MetricWeight::new(0.05, false),
                MetricWeight::new(0.05, true),
                MetricWeight::new(0.1, true),
            ],
        }
    }
}

impl MetricTable {
    /// Weight entry of `kind`.
    #[inline]
    pub fn get(&self, kind: MetricKind) -> MetricWeight {
        self.weights[kind.index()]
    }

    /// Sets the factor of `kind`.
    pub fn with_weight(mut self, kind: MetricKind, weight: f64) -> Self {
        self.weights[kind.index()].weight = weight;
        self
    }

    /// Sets whether `kind` is scaled by search depth.
    pub fn with_depth_dependent(mut self, kind: MetricKind, depth_dependent: bool) -> Self {
        self.weights[kind.index()].depth_dependent = depth_dependent;
        self
    }

    /// Weighted contribution of a raw metric value.
    ///
    /// `depth_ratio` is `depth / max_depth` of the scored state.
    #[inline]
    pub fn apply(&self, kind: MetricKind, raw: f64, depth_ratio: f64) -> f64 {
        let w = self.get(kind);
        if w.depth_dependent {
            raw * w.weight * depth_ratio
        } else {
            raw * w.weight
        }
    }

    /// Iterates over `(kind, weight)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, MetricWeight)> + '_ {
        MetricKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}
