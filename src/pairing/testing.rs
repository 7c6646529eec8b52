//! Shared fixtures for the pair-phase tests.

use super::transform::{PairInput, SlotPosition};
use crate::chair::{AssignedBlock, ChairAssignment, ChairAssignmentClassroom, ChairAssignmentDay};
use crate::models::{Input, InputClassroom, InputDay};

/// Builds a chairperson assignment from `(first, last, chair)` triples per
/// day and classroom. Ids equal indices.
pub(crate) fn chairs(layout: &[&[&[(usize, usize, u32)]]]) -> ChairAssignment {
    ChairAssignment {
        score: 0.0,
        days: layout
            .iter()
            .enumerate()
            .map(|(d, rooms)| ChairAssignmentDay {
                id: d as u32,
                classrooms: rooms
                    .iter()
                    .enumerate()
                    .map(|(c, blocks)| ChairAssignmentClassroom {
                        id: c as u32,
                        blocks: blocks
                            .iter()
                            .map(|&(first, last, chair)| AssignedBlock {
                                first,
                                last,
                                chair_person_id: chair,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
        workload: Vec::new(),
    }
}

/// People 0..=4, chairs {3, 4}; pairs (0,1)×2 and (1,2)×1.
///
/// Day 0: two rooms of two slots, chaired by 3 and 4.
/// Day 1: one room of two slots, chaired by 3.
pub(crate) fn fixture() -> (Input, ChairAssignment) {
    let input = Input::new()
        .with_chair_persons([3, 4])
        .with_defense(0, 1, 2)
        .with_defense(2, 1, 1)
        .with_day(
            InputDay::new(0)
                .with_classroom(InputClassroom::new(0, vec![2]))
                .with_classroom(InputClassroom::new(1, vec![2])),
        )
        .with_day(InputDay::new(1).with_classroom(InputClassroom::new(0, vec![2])));
    let chairs = chairs(&[&[&[(0, 1, 3)], &[(0, 1, 4)]], &[&[(0, 1, 3)]]]);
    (input, chairs)
}

pub(crate) fn pair_input() -> PairInput {
    let (input, chairs) = fixture();
    PairInput::new(&input, &chairs)
}

/// Slot `slot` of classroom `classroom` on day 0.
pub(crate) fn slot(classroom: u16, slot: u16) -> SlotPosition {
    SlotPosition {
        day: 0,
        classroom,
        slot,
    }
}
