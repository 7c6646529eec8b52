//! Result of the chairperson phase.

use serde::{Deserialize, Serialize};

use super::state::ChairState;
use super::transform::{BlockPosition, ChairInput};
use crate::search::SearchState;

/// Chairperson of every block, plus the resulting workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairAssignment {
    /// Chairperson-phase score.
    pub score: f64,
    /// Day → classroom → block assignments, in input order.
    pub days: Vec<ChairAssignmentDay>,
    /// Workload of every available chairperson, ascending by id.
    pub workload: Vec<ChairWorkload>,
}

/// One day of chairperson assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairAssignmentDay {
    /// Day id from the input.
    pub id: u32,
    /// Classrooms in input order.
    pub classrooms: Vec<ChairAssignmentClassroom>,
}

/// Blocks of one classroom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairAssignmentClassroom {
    /// Room id from the input.
    pub id: u32,
    /// Blocks in slot order.
    pub blocks: Vec<AssignedBlock>,
}

/// A block and its chairperson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedBlock {
    /// First slot index (inclusive).
    pub first: usize,
    /// Last slot index (inclusive).
    pub last: usize,
    /// Chairperson id.
    pub chair_person_id: u32,
}

/// Total appearances of one chairperson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairWorkload {
    /// Person id.
    pub person_id: u32,
    /// Reviewer/supervisor demand plus chaired slots.
    pub workload: u32,
}

impl ChairAssignment {
    /// Projects a complete state.
    pub(crate) fn from_state(state: &ChairState, input: &ChairInput, score: f64) -> Self {
        debug_assert!(state.is_complete());
        let days = input
            .days
            .iter()
            .enumerate()
            .map(|(d, day)| ChairAssignmentDay {
                id: day.id,
                classrooms: day
                    .classrooms
                    .iter()
                    .enumerate()
                    .map(|(c, room)| ChairAssignmentClassroom {
                        id: room.id,
                        blocks: room
                            .blocks
                            .iter()
                            .enumerate()
                            .filter_map(|(b, block)| {
                                let pos = BlockPosition {
                                    day: d as u16,
                                    classroom: c as u16,
                                    block: b as u16,
                                };
                                state.chair_at(pos).map(|chair| AssignedBlock {
                                    first: block.first as usize,
                                    last: block.last as usize,
                                    chair_person_id: u32::from(chair),
                                })
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let workload = input
            .chairs
            .iter()
            .map(|&c| ChairWorkload {
                person_id: u32::from(c),
                workload: state.workload()[c as usize],
            })
            .collect();

        Self {
            score,
            days,
            workload,
        }
    }

    /// Chairperson presiding over slot `slot` of the given classroom.
    ///
    /// Indices are positions in the input, not ids.
    pub fn chair_for_slot(&self, day: usize, classroom: usize, slot: usize) -> Option<u32> {
        self.days
            .get(day)?
            .classrooms
            .get(classroom)?
            .blocks
            .iter()
            .find(|b| b.first <= slot && slot <= b.last)
            .map(|b| b.chair_person_id)
    }

    /// Number of blocks chaired by `person_id`.
    pub fn blocks_chaired_by(&self, person_id: u32) -> usize {
        self.days
            .iter()
            .flat_map(|d| &d.classrooms)
            .flat_map(|c| &c.blocks)
            .filter(|b| b.chair_person_id == person_id)
            .count()
    }
}
