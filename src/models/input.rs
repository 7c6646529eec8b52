//! Problem definition model.
//!
//! An [`Input`] describes one defense-session planning problem: who may
//! chair a session, which reviewer/supervisor pairs must be scheduled and
//! how often, and the day → classroom → slot layout with per-slot
//! personal preferences.
//!
//! Ids in this model are raw `u32` values as produced by the importing
//! layer. [`crate::validation::validate_input`] checks that they fit the
//! compact [`PersonId`] width used by the search.

use serde::{Deserialize, Serialize};

/// Compact person id used inside the search (dense, starting at 0).
pub type PersonId = u8;

/// A complete scheduling problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    /// People that may chair a defense block.
    pub chair_person_ids: Vec<u32>,
    /// Reviewer/supervisor pairs and how many defenses each pair holds.
    pub defenses: Vec<DefenseDemand>,
    /// Available days, in chronological order.
    pub days: Vec<InputDay>,
}

/// One row of the demand table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseDemand {
    /// Reviewer person id.
    pub reviewer_id: u32,
    /// Supervisor (promoter) person id.
    pub supervisor_id: u32,
    /// Number of defenses this pair must attend together.
    pub count: u32,
}

/// A day of defenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDay {
    /// Day identifier (unique within the input).
    pub id: u32,
    /// Rooms open on this day.
    pub classrooms: Vec<InputClassroom>,
}

/// A room on a given day, split into chairperson blocks.
///
/// Slot `i` of every classroom on the same day starts at the same
/// physical time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputClassroom {
    /// Room identifier (unique within its day).
    pub id: u32,
    /// Lengths of consecutive blocks; they must sum to `slots.len()`.
    pub block_lengths: Vec<u32>,
    /// Schedulable slots in chronological order.
    pub slots: Vec<InputSlot>,
}

/// A single schedulable slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSlot {
    /// Personal preferences attached to this slot.
    pub preferences: Vec<SlotPreference>,
}

/// A person's attitude towards a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPreference {
    /// Person the preference belongs to.
    pub person_id: u32,
    /// Preference strength.
    pub kind: PreferenceType,
}

/// Preference strength.
///
/// Variants are ordered by restrictiveness, so `max` picks the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PreferenceType {
    /// The person would like to be scheduled here.
    Preferred,
    /// The person would rather not be scheduled here.
    Undesired,
    /// The person must not be scheduled here.
    NotAllowed,
}

/// Converts a raw id into a [`PersonId`] below `people_count`.
pub(crate) fn compact_person(id: u32, people_count: usize) -> Option<PersonId> {
    PersonId::try_from(id)
        .ok()
        .filter(|&p| (p as usize) < people_count)
}

impl Input {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds chairpersons.
    pub fn with_chair_persons(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.chair_person_ids.extend(ids);
        self
    }

    /// Adds a demand row.
    pub fn with_defense(mut self, reviewer_id: u32, supervisor_id: u32, count: u32) -> Self {
        self.defenses.push(DefenseDemand {
            reviewer_id,
            supervisor_id,
            count,
        });
        self
    }

    /// Adds a day.
    pub fn with_day(mut self, day: InputDay) -> Self {
        self.days.push(day);
        self
    }

    /// Total number of defenses to schedule.
    pub fn required_assignments(&self) -> u64 {
        self.defenses.iter().map(|d| u64::from(d.count)).sum()
    }

    /// Total number of slots across all days and rooms.
    pub fn slot_capacity(&self) -> u64 {
        self.days
            .iter()
            .flat_map(|d| &d.classrooms)
            .map(|c| c.slots.len() as u64)
            .sum()
    }

    /// Sorted, deduplicated ids of everyone mentioned as chairperson,
    /// reviewer or supervisor.
    pub fn people(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .chair_person_ids
            .iter()
            .copied()
            .chain(
                self.defenses
                    .iter()
                    .flat_map(|d| [d.reviewer_id, d.supervisor_id]),
            )
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl InputDay {
    /// Creates an empty day.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            classrooms: Vec::new(),
        }
    }

    /// Adds a classroom.
    pub fn with_classroom(mut self, classroom: InputClassroom) -> Self {
        self.classrooms.push(classroom);
        self
    }
}

impl InputClassroom {
    /// Creates a classroom with one empty slot per block position.
    pub fn new(id: u32, block_lengths: impl Into<Vec<u32>>) -> Self {
        let block_lengths = block_lengths.into();
        let total: u32 = block_lengths.iter().sum();
        Self {
            id,
            block_lengths,
            slots: vec![InputSlot::default(); total as usize],
        }
    }

    /// Attaches a preference to slot `slot`. Out-of-range slots are ignored.
    pub fn with_preference(mut self, slot: usize, person_id: u32, kind: PreferenceType) -> Self {
        if let Some(s) = self.slots.get_mut(slot) {
            s.preferences.push(SlotPreference { person_id, kind });
        }
        self
    }

    /// `(first, last)` slot index of each block, both inclusive.
    ///
    /// Zero-length blocks are skipped.
    pub fn block_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges = Vec::with_capacity(self.block_lengths.len());
        let mut start = 0usize;
        for &len in &self.block_lengths {
            let len = len as usize;
            if len > 0 {
                ranges.push((start, start + len - 1));
            }
            start += len;
        }
        ranges
    }
}
