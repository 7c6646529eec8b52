//! Dense, read-only view of an [`Input`] for the chairperson phase.

use crate::models::{compact_person, Input, PersonId, PreferenceType};

/// Counts of one person's preferences across the slots of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferenceTally {
    /// Slots the person prefers.
    pub preferred: u32,
    /// Slots the person would rather avoid.
    pub undesired: u32,
    /// Slots the person must not attend.
    pub not_allowed: u32,
}

impl PreferenceTally {
    /// Counts one preference of `kind`.
    pub fn record(&mut self, kind: PreferenceType) {
        let counter = match kind {
            PreferenceType::Preferred => &mut self.preferred,
            PreferenceType::Undesired => &mut self.undesired,
            PreferenceType::NotAllowed => &mut self.not_allowed,
        };
        *counter = counter.saturating_add(1);
    }

    /// `preferred - undesired`.
    #[inline]
    pub fn balance(&self) -> i64 {
        i64::from(self.preferred) - i64::from(self.undesired)
    }
}

/// Address of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPosition {
    /// Day index.
    pub day: u16,
    /// Classroom index within the day.
    pub classroom: u16,
    /// Block index within the classroom.
    pub block: u16,
}

/// One chairperson block.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    /// First slot index (inclusive).
    pub first: u16,
    /// Last slot index (inclusive).
    pub last: u16,
    /// Per-person preference tally over `first..=last`, indexed by person id.
    pub tally: Vec<PreferenceTally>,
    /// Blocks in other classrooms of the same day sharing a time position.
    pub overlapping: Vec<BlockPosition>,
}

impl BlockInfo {
    /// Number of slots in the block.
    #[inline]
    pub fn len(&self) -> u16 {
        self.last - self.first + 1
    }

    /// Whether `first..=last` shares a slot index with this block.
    #[inline]
    fn overlaps(&self, first: u16, last: u16) -> bool {
        self.first <= last && first <= self.last
    }
}

/// A classroom split into blocks.
#[derive(Debug, Clone)]
pub struct ChairClassroom {
    /// Room id from the input.
    pub id: u32,
    /// Blocks in slot order.
    pub blocks: Vec<BlockInfo>,
}

/// A day of classrooms.
#[derive(Debug, Clone)]
pub struct ChairDay {
    /// Day id from the input.
    pub id: u32,
    /// Classrooms in input order.
    pub classrooms: Vec<ChairClassroom>,
}

/// Chairperson-phase context, built once per run.
#[derive(Debug, Clone)]
pub struct ChairInput {
    /// Number of people (ids are `0..people_count`).
    pub people_count: usize,
    /// Available chairpersons, ascending.
    pub chairs: Vec<PersonId>,
    /// Reviewer/supervisor demand per person.
    pub base_workload: Vec<u32>,
    /// Day → classroom → block layout.
    pub days: Vec<ChairDay>,
    /// Every block position in chronological order (day, classroom, block).
    pub positions: Vec<BlockPosition>,
}

impl ChairInput {
    /// Builds the view. Expects an input accepted by
    /// [`crate::validation::validate_input`]; ids outside [`PersonId`] are
    /// ignored.
    pub fn new(input: &Input) -> Self {
        let people_count = input.people().len();

        let mut chairs: Vec<PersonId> = input
            .chair_person_ids
            .iter()
            .filter_map(|&id| compact_person(id, people_count))
            .collect();
        chairs.sort_unstable();
        chairs.dedup();

        let mut base_workload = vec![0u32; people_count];
        for d in &input.defenses {
            for id in [d.reviewer_id, d.supervisor_id] {
                if let Some(p) = compact_person(id, people_count) {
                    base_workload[p as usize] += d.count;
                }
            }
        }

        let mut days = Vec::with_capacity(input.days.len());
        for day in &input.days {
            let mut classrooms = Vec::with_capacity(day.classrooms.len());
            for room in &day.classrooms {
                let blocks = room
                    .block_ranges()
                    .into_iter()
                    .map(|(first, last)| {
                        let mut tally = vec![PreferenceTally::default(); people_count];
                        for slot in room.slots.iter().take(last + 1).skip(first) {
                            for pref in &slot.preferences {
                                let Some(p) = compact_person(pref.person_id, people_count) else {
                                    continue;
                                };
                                tally[p as usize].record(pref.kind);
                            }
                        }
                        BlockInfo {
                            first: first as u16,
                            last: last as u16,
                            tally,
                            overlapping: Vec::new(),
                        }
                    })
                    .collect();
                classrooms.push(ChairClassroom {
                    id: room.id,
                    blocks,
                });
            }
            days.push(ChairDay {
                id: day.id,
                classrooms,
            });
        }

        link_overlaps(&mut days);

        let positions = days
            .iter()
            .enumerate()
            .flat_map(|(d, day)| {
                day.classrooms.iter().enumerate().flat_map(move |(c, room)| {
                    (0..room.blocks.len()).map(move |b| BlockPosition {
                        day: d as u16,
                        classroom: c as u16,
                        block: b as u16,
                    })
                })
            })
            .collect();

        Self {
            people_count,
            chairs,
            base_workload,
            days,
            positions,
        }
    }

    /// Block at `pos`.
    #[inline]
    pub fn block(&self, pos: BlockPosition) -> &BlockInfo {
        &self.days[pos.day as usize].classrooms[pos.classroom as usize].blocks[pos.block as usize]
    }

    /// Total number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.positions.len()
    }
}

fn link_overlaps(days: &mut [ChairDay]) {
    for (d, day) in days.iter_mut().enumerate() {
        let spans: Vec<(u16, u16, u16, u16)> = day
            .classrooms
            .iter()
            .enumerate()
            .flat_map(|(c, room)| {
                room.blocks
                    .iter()
                    .enumerate()
                    .map(move |(b, block)| (c as u16, b as u16, block.first, block.last))
            })
            .collect();

        for (c, room) in day.classrooms.iter_mut().enumerate() {
            for block in &mut room.blocks {
                block.overlapping = spans
                    .iter()
                    .filter(|&&(oc, _, first, last)| {
                        oc as usize != c && block.overlaps(first, last)
                    })
                    .map(|&(oc, ob, _, _)| BlockPosition {
                        day: d as u16,
                        classroom: oc,
                        block: ob,
                    })
                    .collect();
            }
        }
    }
}
