//! Dense, read-only view of an [`Input`] for the pair phase, with the
//! chairperson assignment folded in.

use crate::chair::ChairAssignment;
use crate::models::{compact_person, Input, PersonId, PreferenceType};

/// Address of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotPosition {
    /// Day index.
    pub day: u16,
    /// Classroom index within the day.
    pub classroom: u16,
    /// Slot index within the classroom (the time position).
    pub slot: u16,
}

/// One orientation of a pair as listed in the demand table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    /// Reviewer person id.
    pub reviewer_id: u32,
    /// Supervisor person id.
    pub supervisor_id: u32,
    /// Defenses with this orientation.
    pub count: u32,
}

/// An unordered reviewer/supervisor pair with its total demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// Smaller person id.
    pub a: PersonId,
    /// Larger person id.
    pub b: PersonId,
    /// Total defenses of this pair across orientations.
    pub count: u32,
    /// Demand rows merged into this pair, in input order.
    pub orientations: Vec<Orientation>,
}

impl Pair {
    /// Whether `person` belongs to the pair.
    #[inline]
    pub fn involves(&self, person: PersonId) -> bool {
        self.a == person || self.b == person
    }
}

/// A slot with its fixed chairperson and per-person preferences.
#[derive(Debug, Clone)]
pub struct PairSlot {
    /// Chairperson presiding over the slot's block.
    pub chair: Option<PersonId>,
    /// Most restrictive preference per person, indexed by person id.
    pub preferences: Vec<Option<PreferenceType>>,
}

/// A classroom's slots.
#[derive(Debug, Clone)]
pub struct PairClassroom {
    /// Room id from the input.
    pub id: u32,
    /// Slots in time order.
    pub slots: Vec<PairSlot>,
}

/// A day of classrooms.
#[derive(Debug, Clone)]
pub struct PairDay {
    /// Day id from the input.
    pub id: u32,
    /// Classrooms in input order.
    pub classrooms: Vec<PairClassroom>,
    /// Largest slot count among the classrooms.
    pub max_slots: usize,
    /// `vetoed[slot][person]`: a `NotAllowed` at this time in any classroom.
    pub vetoed: Vec<Vec<bool>>,
}

impl PairDay {
    /// Indices of the classrooms that have a slot at time `slot`.
    #[inline]
    pub fn concurrent(&self, slot: usize) -> impl Iterator<Item = (usize, &PairSlot)> + '_ {
        self.classrooms
            .iter()
            .enumerate()
            .filter_map(move |(c, room)| room.slots.get(slot).map(|s| (c, s)))
    }
}

/// Pair-phase context, built once per run.
#[derive(Debug, Clone)]
pub struct PairInput {
    /// Number of people (ids are `0..people_count`).
    pub people_count: usize,
    /// Unordered pairs with positive demand, ordered by `(a, b)`.
    pub pairs: Vec<Pair>,
    /// Reviewer/supervisor demand per person.
    pub person_demand: Vec<u32>,
    /// People chairing at least one block.
    pub is_assigned_chair: Vec<bool>,
    /// Chairperson pool, ascending.
    pub available_chairs: Vec<PersonId>,
    /// Day → classroom → slot layout.
    pub days: Vec<PairDay>,
    /// Every slot in storage order (day, classroom, slot).
    pub positions: Vec<SlotPosition>,
}

impl PairInput {
    /// Builds the view. Expects a validated input and a chairperson
    /// assignment over the same layout.
    pub fn new(input: &Input, chairs: &ChairAssignment) -> Self {
        let people_count = input.people().len();

        let mut pairs: Vec<Pair> = Vec::new();
        let mut person_demand = vec![0u32; people_count];
        for d in &input.defenses {
            let (Some(r), Some(s)) = (
                compact_person(d.reviewer_id, people_count),
                compact_person(d.supervisor_id, people_count),
            ) else {
                continue;
            };
            if d.count == 0 || r == s {
                continue;
            }
            person_demand[r as usize] += d.count;
            person_demand[s as usize] += d.count;

            let (a, b) = (r.min(s), r.max(s));
            let orientation = Orientation {
                reviewer_id: d.reviewer_id,
                supervisor_id: d.supervisor_id,
                count: d.count,
            };
            match pairs.iter_mut().find(|p| p.a == a && p.b == b) {
                Some(pair) => {
                    pair.count += d.count;
                    pair.orientations.push(orientation);
                }
                None => pairs.push(Pair {
                    a,
                    b,
                    count: d.count,
                    orientations: vec![orientation],
                }),
            }
        }
        pairs.sort_by_key(|p| (p.a, p.b));

        let mut is_assigned_chair = vec![false; people_count];
        for block in chairs
            .days
            .iter()
            .flat_map(|d| &d.classrooms)
            .flat_map(|c| &c.blocks)
        {
            if let Some(p) = compact_person(block.chair_person_id, people_count) {
                is_assigned_chair[p as usize] = true;
            }
        }

        let mut available_chairs: Vec<PersonId> = input
            .chair_person_ids
            .iter()
            .filter_map(|&id| compact_person(id, people_count))
            .collect();
        available_chairs.sort_unstable();
        available_chairs.dedup();

        let days: Vec<PairDay> = input
            .days
            .iter()
            .enumerate()
            .map(|(d, day)| {
                let classrooms: Vec<PairClassroom> = day
                    .classrooms
                    .iter()
                    .enumerate()
                    .map(|(c, room)| PairClassroom {
                        id: room.id,
                        slots: room
                            .slots
                            .iter()
                            .enumerate()
                            .map(|(s, slot)| {
                                let mut preferences = vec![None; people_count];
                                for pref in &slot.preferences {
                                    if let Some(p) = compact_person(pref.person_id, people_count) {
                                        let cell: &mut Option<PreferenceType> =
                                            &mut preferences[p as usize];
                                        *cell = Some(cell.map_or(pref.kind, |k| k.max(pref.kind)));
                                    }
                                }
                                PairSlot {
                                    chair: chairs
                                        .chair_for_slot(d, c, s)
                                        .and_then(|id| compact_person(id, people_count)),
                                    preferences,
                                }
                            })
                            .collect(),
                    })
                    .collect();

                let max_slots = classrooms.iter().map(|c| c.slots.len()).max().unwrap_or(0);
                let vetoed = (0..max_slots)
                    .map(|s| {
                        let mut row = vec![false; people_count];
                        for room in &classrooms {
                            if let Some(slot) = room.slots.get(s) {
                                for (p, pref) in slot.preferences.iter().enumerate() {
                                    if *pref == Some(PreferenceType::NotAllowed) {
                                        row[p] = true;
                                    }
                                }
                            }
                        }
                        row
                    })
                    .collect();

                PairDay {
                    id: day.id,
                    classrooms,
                    max_slots,
                    vetoed,
                }
            })
            .collect();

        let positions = days
            .iter()
            .enumerate()
            .flat_map(|(d, day)| {
                day.classrooms.iter().enumerate().flat_map(move |(c, room)| {
                    (0..room.slots.len()).map(move |s| SlotPosition {
                        day: d as u16,
                        classroom: c as u16,
                        slot: s as u16,
                    })
                })
            })
            .collect();

        Self {
            people_count,
            pairs,
            person_demand,
            is_assigned_chair,
            available_chairs,
            days,
            positions,
        }
    }

    /// Slot at `pos`.
    #[inline]
    pub fn slot(&self, pos: SlotPosition) -> &PairSlot {
        &self.days[pos.day as usize].classrooms[pos.classroom as usize].slots[pos.slot as usize]
    }

    /// Total number of defenses to place.
    pub fn total_demand(&self) -> usize {
        self.pairs.iter().map(|p| p.count as usize).sum()
    }
}
