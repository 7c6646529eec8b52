//! Partial pair assignment.

use super::transform::{PairInput, SlotPosition};
use crate::models::PersonId;
use crate::search::SearchState;

/// A proposal to hold one defense of pair `pair` at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairAction {
    /// Target slot.
    pub position: SlotPosition,
    /// Index into [`PairInput::pairs`].
    pub pair: u16,
    /// First member of the pair.
    pub a: PersonId,
    /// Second member of the pair.
    pub b: PersonId,
}

impl PairAction {
    /// Whether `person` is one of the pair.
    #[inline]
    pub fn involves(&self, person: PersonId) -> bool {
        self.a == person || self.b == person
    }
}

/// Pair assignment under construction.
///
/// Owns every collection an action can mutate, so `clone` yields a fully
/// independent branch.
#[derive(Debug, Clone, PartialEq)]
pub struct PairState {
    /// day → classroom → slot → pair index.
    slots: Vec<Vec<Vec<Option<u16>>>>,
    /// Defenses left per pair.
    pair_left: Vec<u32>,
    /// Defenses left per person.
    person_left: Vec<u32>,
    depth: usize,
    max_depth: usize,
}

impl PairState {
    /// Empty assignment over `input`'s layout.
    pub fn new(input: &PairInput) -> Self {
        Self {
            slots: input
                .days
                .iter()
                .map(|day| {
                    day.classrooms
                        .iter()
                        .map(|room| vec![None; room.slots.len()])
                        .collect()
                })
                .collect(),
            pair_left: input.pairs.iter().map(|p| p.count).collect(),
            person_left: input.person_demand.clone(),
            depth: 0,
            max_depth: input.total_demand(),
        }
    }

    /// Pair index held at `pos`, if any.
    #[inline]
    pub fn pair_at(&self, pos: SlotPosition) -> Option<u16> {
        self.slots[pos.day as usize][pos.classroom as usize][pos.slot as usize]
    }

    /// Pair index held at the given indices; `None` for empty or missing slots.
    #[inline]
    pub fn pair_at_index(&self, day: usize, classroom: usize, slot: usize) -> Option<u16> {
        self.slots[day][classroom].get(slot).copied().flatten()
    }

    /// Whether `pos` is still free.
    #[inline]
    pub fn is_open(&self, pos: SlotPosition) -> bool {
        self.pair_at(pos).is_none()
    }

    /// Defenses still to place for pair `pair`.
    #[inline]
    pub fn remaining_for_pair(&self, pair: u16) -> u32 {
        self.pair_left[pair as usize]
    }

    /// Defenses still to place that involve `person`.
    #[inline]
    pub fn remaining_for_person(&self, person: PersonId) -> u32 {
        self.person_left[person as usize]
    }

    /// Places one defense of `action.pair` at its slot.
    pub(crate) fn apply(&mut self, action: &PairAction) {
        let pos = action.position;
        let cell = &mut self.slots[pos.day as usize][pos.classroom as usize][pos.slot as usize];
        debug_assert!(cell.is_none(), "slot {pos:?} assigned twice");
        *cell = Some(action.pair);

        let left = &mut self.pair_left[action.pair as usize];
        debug_assert!(*left > 0, "pair {} over-assigned", action.pair);
        *left = left.saturating_sub(1);
        for person in [action.a, action.b] {
            let left = &mut self.person_left[person as usize];
            *left = left.saturating_sub(1);
        }
        self.depth += 1;
    }
}

impl SearchState for PairState {
    #[inline]
    fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn max_depth(&self) -> usize {
        self.max_depth
    }
}
