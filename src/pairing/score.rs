//! Pair-phase heuristic.
//!
//! One chronological pass over the filled slots (day, time, classroom)
//! builds a per-person, per-day memory of occupied slots and contiguous
//! blocks. Metrics are then folded per person and weighted through the
//! [`MetricTable`].
//!
//! A block is a run of consecutive slots in one classroom with one role
//! (chairing vs. reviewing/supervising). Scores are only comparable within
//! the same phase and input.

use super::metric::{MetricKind, MetricTable};
use super::state::PairState;
use super::transform::PairInput;
use crate::config::ScoringTargets;
use crate::models::{PersonId, PreferenceType};
use crate::search::SearchState;

#[derive(Debug, Clone, Copy)]
struct Block {
    start: usize,
    end: usize,
    classroom: usize,
    chair: bool,
}

#[derive(Debug, Clone, Default)]
struct PersonDay {
    first: Option<usize>,
    last: usize,
    total: u32,
    blocks: Vec<Block>,
}

/// Memory pass over one state.
struct Memory {
    days: usize,
    person_days: Vec<PersonDay>,
    appearances: Vec<u32>,
    slot_preference: f64,
}

impl Memory {
    fn build(state: &PairState, input: &PairInput) -> Self {
        let days = input.days.len();
        let mut memory = Self {
            days,
            person_days: vec![PersonDay::default(); input.people_count * days],
            appearances: vec![0; input.people_count],
            slot_preference: 0.0,
        };

        for (d, day) in input.days.iter().enumerate() {
            for s in 0..day.max_slots {
                for (c, slot) in day.concurrent(s) {
                    let Some(pair) = state.pair_at_index(d, c, s) else {
                        continue;
                    };
                    let pair = &input.pairs[pair as usize];
                    for person in [pair.a, pair.b] {
                        memory.work(d, c, s, person, false);
                        match slot.preferences[person as usize] {
                            Some(PreferenceType::Preferred) => memory.slot_preference += 1.0,
                            Some(PreferenceType::Undesired) => memory.slot_preference -= 1.0,
                            _ => {}
                        }
                    }
                    if let Some(chair) = slot.chair {
                        memory.work(d, c, s, chair, true);
                    }
                }
            }
        }
        memory
    }

    fn work(&mut self, day: usize, classroom: usize, slot: usize, person: PersonId, chair: bool) {
        self.appearances[person as usize] += 1;
        let pd = &mut self.person_days[person as usize * self.days + day];
        pd.first.get_or_insert(slot);
        pd.last = slot;
        pd.total += 1;
        match pd.blocks.last_mut() {
            Some(b) if b.end + 1 == slot && b.classroom == classroom && b.chair == chair => {
                b.end = slot;
            }
            _ => pd.blocks.push(Block {
                start: slot,
                end: slot,
                classroom,
                chair,
            }),
        }
    }

    fn days_of(&self, person: usize) -> &[PersonDay] {
        &self.person_days[person * self.days..(person + 1) * self.days]
    }
}

/// Value rewarded inside `[min, max]` and penalized symmetrically outside.
fn band(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        value - (min - value)
    } else if value > max {
        max - (value - max)
    } else {
        value
    }
}

/// Multi-metric scorer of pair assignments.
#[derive(Debug, Clone, Copy)]
pub struct GeneralPeopleScore<'a> {
    input: &'a PairInput,
    table: &'a MetricTable,
    targets: &'a ScoringTargets,
}

impl<'a> GeneralPeopleScore<'a> {
    /// Creates a scorer over `input`.
    pub fn new(input: &'a PairInput, table: &'a MetricTable, targets: &'a ScoringTargets) -> Self {
        Self {
            input,
            table,
            targets,
        }
    }

    /// Score of a (partial) pair assignment; higher is better.
    pub fn score(&self, state: &PairState) -> f64 {
        self.breakdown(state).iter().sum()
    }

    /// Weighted contribution of every metric, indexed by [`MetricKind::index`].
    pub fn breakdown(&self, state: &PairState) -> [f64; MetricKind::COUNT] {
        let ratio = depth_ratio(state);
        let raw = self.raw_totals(state);
        let mut out = [0.0; MetricKind::COUNT];
        for kind in MetricKind::ALL {
            out[kind.index()] = self.table.apply(kind, raw[kind.index()], ratio);
        }
        out
    }

    /// Unweighted metric totals summed over every person.
    pub fn raw_totals(&self, state: &PairState) -> [f64; MetricKind::COUNT] {
        let input = self.input;
        let t = self.targets;
        let memory = Memory::build(state, input);
        let mut raw = [0.0; MetricKind::COUNT];
        let mut add = |kind: MetricKind, v: f64| raw[kind.index()] += v;

        for person in 0..input.people_count {
            let demand = input.person_demand[person];
            if input.is_assigned_chair[person] && demand > 0 {
                let left = state.remaining_for_person(person as PersonId);
                add(
                    MetricKind::ChairPersonAssignmentsLeft,
                    -f64::from(left) / f64::from(demand),
                );
            }

            for day in memory.days_of(person) {
                let Some(first) = day.first else {
                    add(MetricKind::VacationDay, t.vacation_day_reward);
                    continue;
                };
                add(MetricKind::VacationDay, -t.vacation_day_reward);
                add(MetricKind::EveningStarting, -(first as f64));
                add(
                    MetricKind::DailyAssignmentsCount,
                    band(
                        f64::from(day.total),
                        f64::from(t.min_daily_assignments),
                        f64::from(t.max_daily_assignments),
                    ),
                );
                let spread = (day.last - first) as f64;
                add(
                    MetricKind::DailyOverspread,
                    (f64::from(t.max_daily_spread) - spread).min(0.0),
                );

                for (i, block) in day.blocks.iter().enumerate() {
                    let len = (block.end - block.start + 1) as f64;
                    add(
                        MetricKind::BlockLength,
                        band(len, 0.0, f64::from(t.max_block_length)),
                    );

                    let Some(next) = day.blocks.get(i + 1) else {
                        continue;
                    };
                    add(
                        MetricKind::AssignmentGaps,
                        -((next.start - block.end - 1) as f64),
                    );
                    if block.classroom != next.classroom {
                        if block.chair || next.chair {
                            add(MetricKind::SwitchingClassesByChairPerson, -1.0);
                        } else {
                            add(MetricKind::SwitchingClassesByOthers, -1.0);
                        }
                    }
                    if block.chair != next.chair {
                        add(MetricKind::RoleSwitching, -1.0);
                    }
                }
            }
        }

        add(MetricKind::SlotPreference, memory.slot_preference);

        let chairs = &input.available_chairs;
        if !chairs.is_empty() {
            let loads: Vec<f64> = chairs
                .iter()
                .map(|&c| f64::from(memory.appearances[c as usize]))
                .collect();
            let unused = loads.iter().filter(|&&l| l == 0.0).count();
            add(MetricKind::UnusedChairPersons, -(unused as f64));

            let n = loads.len() as f64;
            let mean = loads.iter().sum::<f64>() / n;
            let variance = loads.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
            add(MetricKind::ChairWorkloadDeviation, -variance.sqrt());
        }

        raw
    }
}

fn depth_ratio(state: &PairState) -> f64 {
    if state.max_depth() == 0 {
        1.0
    } else {
        state.depth() as f64 / state.max_depth() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Input, InputClassroom, InputDay};
    use crate::pairing::state::PairAction;
    use crate::pairing::testing::{chairs, pair_input, slot};
    use crate::pairing::transform::SlotPosition;

    fn place(state: &mut PairState, pi: &PairInput, position: SlotPosition, pair: u16) {
        let p = &pi.pairs[pair as usize];
        state.apply(&PairAction {
            position,
            pair,
            a: p.a,
            b: p.b,
        });
    }

    fn raw(state: &PairState, pi: &PairInput, kind: MetricKind) -> f64 {
        let table = MetricTable::default();
        let targets = ScoringTargets::default();
        GeneralPeopleScore::new(pi, &table, &targets).raw_totals(state)[kind.index()]
    }

    #[test]
    fn test_empty_state_only_rewards_vacation() {
        let pi = pair_input();
        let state = PairState::new(&pi);
        let table = MetricTable::default();
        let targets = ScoringTargets::default();
        let scorer = GeneralPeopleScore::new(&pi, &table, &targets);

        let breakdown = scorer.breakdown(&state);
        // 5 people x 2 free days x 10.
        assert!((breakdown[MetricKind::VacationDay.index()] - 100.0 * 0.0001).abs() < 1e-12);
        // Depth 0 silences the depth-dependent chair metrics.
        assert_eq!(breakdown[MetricKind::UnusedChairPersons.index()], 0.0);
        assert!((scorer.score(&state) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_contiguous_slots_form_one_block() {
        let pi = pair_input();
        let mut state = PairState::new(&pi);
        place(&mut state, &pi, slot(0, 0), 0);
        place(&mut state, &pi, slot(0, 1), 0);

        // People 0, 1 and chair 3 each hold one block of two.
        assert_eq!(raw(&state, &pi, MetricKind::BlockLength), 6.0);
        assert_eq!(raw(&state, &pi, MetricKind::AssignmentGaps), 0.0);
        // Two a day is below the band: 2 - (6 - 2) each.
        assert_eq!(raw(&state, &pi, MetricKind::DailyAssignmentsCount), -6.0);
        // Persons 2 and 4 stay free on both days.
        assert_eq!(raw(&state, &pi, MetricKind::VacationDay), 40.0);
        assert_eq!(raw(&state, &pi, MetricKind::UnusedChairPersons), -1.0);
        // Appearances 2 and 0.
        assert_eq!(raw(&state, &pi, MetricKind::ChairWorkloadDeviation), -1.0);
    }

    #[test]
    fn test_classroom_switch_by_others() {
        let pi = pair_input();
        let mut state = PairState::new(&pi);
        place(&mut state, &pi, slot(0, 0), 0);
        place(&mut state, &pi, slot(1, 1), 0);

        assert_eq!(raw(&state, &pi, MetricKind::SwitchingClassesByOthers), -2.0);
        assert_eq!(raw(&state, &pi, MetricKind::SwitchingClassesByChairPerson), 0.0);
        assert_eq!(raw(&state, &pi, MetricKind::AssignmentGaps), 0.0);
    }

    fn role_input() -> PairInput {
        // One room, blocks [0] chaired by 2 and [1, 2] chaired by 3.
        let input = Input::new()
            .with_chair_persons([2, 3])
            .with_defense(0, 1, 1)
            .with_defense(0, 2, 1)
            .with_day(
                InputDay::new(0).with_classroom(
                    InputClassroom::new(0, vec![1, 2])
                        .with_preference(0, 0, PreferenceType::Preferred)
                        .with_preference(2, 0, PreferenceType::Preferred)
                        .with_preference(0, 1, PreferenceType::Undesired)
                        .with_preference(2, 3, PreferenceType::Undesired),
                ),
            );
        PairInput::new(&input, &chairs(&[&[&[(0, 0, 2), (1, 2, 3)]]]))
    }

    #[test]
    fn test_gaps_roles_and_preferences() {
        let pi = role_input();
        let mut state = PairState::new(&pi);
        // Person 2 is an assigned chair with one defense of their own.
        assert_eq!(raw(&state, &pi, MetricKind::ChairPersonAssignmentsLeft), -1.0);

        place(&mut state, &pi, slot(0, 0), 0);
        place(&mut state, &pi, slot(0, 2), 1);

        // Person 0 idles at slot 1; person 2 chairs slot 0 then sits slot 2.
        assert_eq!(raw(&state, &pi, MetricKind::AssignmentGaps), -2.0);
        assert_eq!(raw(&state, &pi, MetricKind::RoleSwitching), -1.0);
        assert_eq!(raw(&state, &pi, MetricKind::SwitchingClassesByChairPerson), 0.0);
        // +2 for person 0, -1 for person 1; chair preferences do not count.
        assert_eq!(raw(&state, &pi, MetricKind::SlotPreference), 1.0);
        assert_eq!(raw(&state, &pi, MetricKind::ChairPersonAssignmentsLeft), 0.0);
        assert_eq!(raw(&state, &pi, MetricKind::EveningStarting), -2.0);
    }

    #[test]
    fn test_band_is_symmetric() {
        assert_eq!(band(7.0, 6.0, 9.0), 7.0);
        assert_eq!(band(4.0, 6.0, 9.0), 2.0);
        assert_eq!(band(11.0, 6.0, 9.0), 7.0);
        assert_eq!(band(10.0, 0.0, 9.0), 8.0);
    }

    #[test]
    fn test_score_is_breakdown_sum() {
        let pi = role_input();
        let mut state = PairState::new(&pi);
        place(&mut state, &pi, slot(0, 1), 0);
        let table = MetricTable::default();
        let targets = ScoringTargets::default();
        let scorer = GeneralPeopleScore::new(&pi, &table, &targets);
        let sum: f64 = scorer.breakdown(&state).iter().sum();
        assert!((scorer.score(&state) - sum).abs() < 1e-12);
        assert_eq!(scorer.score(&state), scorer.score(&state));
    }
}
