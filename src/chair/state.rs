//! Partial chairperson assignment.

use super::transform::{BlockPosition, ChairInput};
use crate::models::PersonId;
use crate::search::SearchState;

/// A chairperson proposal for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChairAction {
    /// Target block.
    pub position: BlockPosition,
    /// Proposed chairperson.
    pub chair: PersonId,
}

/// Chairperson assignment under construction.
///
/// Owns every collection an action can mutate, so `clone` yields a fully
/// independent branch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChairState {
    /// day → classroom → block → chairperson.
    blocks: Vec<Vec<Vec<Option<PersonId>>>>,
    /// Total appearances per person (demand plus chaired slots).
    workload: Vec<u32>,
    /// Sum of `preferred - undesired` over assigned chairs' blocks.
    preference_balance: i64,
    depth: usize,
    max_depth: usize,
}

impl ChairState {
    /// Empty assignment over `input`'s layout.
    pub fn new(input: &ChairInput) -> Self {
        Self {
            blocks: input
                .days
                .iter()
                .map(|day| {
                    day.classrooms
                        .iter()
                        .map(|room| vec![None; room.blocks.len()])
                        .collect()
                })
                .collect(),
            workload: input.base_workload.clone(),
            preference_balance: 0,
            depth: 0,
            max_depth: input.block_count(),
        }
    }

    /// Chairperson of the block at `pos`, if assigned.
    #[inline]
    pub fn chair_at(&self, pos: BlockPosition) -> Option<PersonId> {
        self.blocks[pos.day as usize][pos.classroom as usize][pos.block as usize]
    }

    /// Whether the block at `pos` still needs a chairperson.
    #[inline]
    pub fn is_open(&self, pos: BlockPosition) -> bool {
        self.chair_at(pos).is_none()
    }

    /// Current workload per person.
    pub fn workload(&self) -> &[u32] {
        &self.workload
    }

    /// Accumulated preference balance of the assigned chairs.
    pub fn preference_balance(&self) -> i64 {
        self.preference_balance
    }

    /// Assigns `action.chair` to its block.
    pub(crate) fn apply(&mut self, action: &ChairAction, input: &ChairInput) {
        let pos = action.position;
        let cell = &mut self.blocks[pos.day as usize][pos.classroom as usize][pos.block as usize];
        debug_assert!(cell.is_none(), "block {pos:?} assigned twice");
        *cell = Some(action.chair);

        let block = input.block(pos);
        self.workload[action.chair as usize] += u32::from(block.len());
        self.preference_balance += block.tally[action.chair as usize].balance();
        self.depth += 1;
    }
}

impl SearchState for ChairState {
    #[inline]
    fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn max_depth(&self) -> usize {
        self.max_depth
    }
}
