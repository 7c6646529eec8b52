//! Finished timetable model.
//!
//! A [`Solution`] is the read-only projection of a complete search state:
//! nested day → room → slot records, each slot either empty or holding a
//! `{reviewer, supervisor, chairperson}` triple. This is the shape the
//! export layer consumes.

use serde::{Deserialize, Serialize};

/// A complete defense timetable with its heuristic score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    /// Heuristic score; only comparable with scores of the same phase.
    pub score: f64,
    /// Scheduled days, in input order.
    pub days: Vec<SolutionDay>,
    /// Per-metric contribution to `score`, keyed by metric name.
    pub metric_totals: Vec<(String, f64)>,
}

/// One day of the timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionDay {
    /// Day id from the input.
    pub id: u32,
    /// Rooms, in input order.
    pub classrooms: Vec<SolutionClassroom>,
}

/// One room on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionClassroom {
    /// Room id from the input.
    pub id: u32,
    /// `None` marks a slot without a defense.
    pub slots: Vec<Option<SolutionSlot>>,
}

/// A scheduled defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSlot {
    /// Reviewer person id.
    pub reviewer_id: u32,
    /// Supervisor person id.
    pub supervisor_id: u32,
    /// Chairperson id.
    pub chair_person_id: u32,
}

impl SolutionSlot {
    /// Whether `person_id` takes any role in this defense.
    pub fn involves(&self, person_id: u32) -> bool {
        self.reviewer_id == person_id
            || self.supervisor_id == person_id
            || self.chair_person_id == person_id
    }
}

impl Solution {
    /// Number of scheduled defenses.
    pub fn assignment_count(&self) -> usize {
        self.assigned_slots().count()
    }

    /// Iterates `(day_index, classroom_index, slot_index, slot)` over filled slots.
    pub fn assigned_slots(&self) -> impl Iterator<Item = (usize, usize, usize, &SolutionSlot)> {
        self.days.iter().enumerate().flat_map(|(d, day)| {
            day.classrooms.iter().enumerate().flat_map(move |(c, room)| {
                room.slots
                    .iter()
                    .enumerate()
                    .filter_map(move |(s, slot)| slot.as_ref().map(|slot| (d, c, s, slot)))
            })
        })
    }

    /// Number of defenses a person attends in any role.
    pub fn appearances_of(&self, person_id: u32) -> usize {
        self.assigned_slots()
            .filter(|(_, _, _, slot)| slot.involves(person_id))
            .count()
    }
}
