//! Pair phase as a [`SearchProblem`].

use rayon::prelude::*;

use super::metric::{MetricKind, MetricTable};
use super::rules::{default_rules, PairRules};
use super::score::GeneralPeopleScore;
use super::state::{PairAction, PairState};
use super::transform::{PairInput, SlotPosition};
use crate::chair::ChairAssignment;
use crate::config::{OptimizerConfig, ScoringTargets};
use crate::models::{Input, Solution, SolutionClassroom, SolutionDay, SolutionSlot};
use crate::search::{LookaheadSchedule, LookaheadStrategy, SearchProblem, SearchState};

/// Places every reviewer/supervisor pair into a staffed slot.
#[derive(Debug, Clone)]
pub struct PairProblem {
    input: PairInput,
    rules: PairRules,
    schedule: LookaheadSchedule,
    metrics: MetricTable,
    targets: ScoringTargets,
}

impl PairProblem {
    /// Builds the phase from a validated input and its chairperson assignment.
    pub fn new(input: &Input, chairs: &ChairAssignment, config: &OptimizerConfig) -> Self {
        Self {
            input: PairInput::new(input, chairs),
            rules: default_rules(),
            schedule: config.pair_lookahead,
            metrics: config.metrics.clone(),
            targets: config.targets,
        }
    }

    /// Replaces the rule set.
    pub fn with_rules(mut self, rules: PairRules) -> Self {
        self.rules = rules;
        self
    }

    /// The phase context.
    pub fn input(&self) -> &PairInput {
        &self.input
    }

    /// Scorer bound to this phase's weights and targets.
    pub fn scorer(&self) -> GeneralPeopleScore<'_> {
        GeneralPeopleScore::new(&self.input, &self.metrics, &self.targets)
    }

    fn actions_at(&self, state: &PairState, position: SlotPosition) -> Vec<PairAction> {
        if !state.is_open(position) {
            return Vec::new();
        }
        self.input
            .pairs
            .iter()
            .enumerate()
            .filter(|&(i, _)| state.remaining_for_pair(i as u16) > 0)
            .map(|(i, p)| PairAction {
                position,
                pair: i as u16,
                a: p.a,
                b: p.b,
            })
            .filter(|a| self.rules.passes_all(a, state, &self.input))
            .collect()
    }

    /// Projects a state onto the output model.
    ///
    /// Merged orientations are handed out in chronological slot order, so
    /// the earliest defenses of a pair take the first listed orientation.
    fn solution(&self, state: &PairState, score: f64) -> Solution {
        let input = &self.input;
        let mut days: Vec<SolutionDay> = input
            .days
            .iter()
            .map(|day| SolutionDay {
                id: day.id,
                classrooms: day
                    .classrooms
                    .iter()
                    .map(|room| SolutionClassroom {
                        id: room.id,
                        slots: vec![None; room.slots.len()],
                    })
                    .collect(),
            })
            .collect();

        let mut left: Vec<Vec<u32>> = input
            .pairs
            .iter()
            .map(|p| p.orientations.iter().map(|o| o.count).collect())
            .collect();

        for (d, day) in input.days.iter().enumerate() {
            for s in 0..day.max_slots {
                for (c, slot) in day.concurrent(s) {
                    let (Some(pair_idx), Some(chair)) = (state.pair_at_index(d, c, s), slot.chair)
                    else {
                        continue;
                    };
                    let pair = &input.pairs[pair_idx as usize];
                    let counts = &mut left[pair_idx as usize];
                    let (reviewer_id, supervisor_id) =
                        match counts.iter().position(|&n| n > 0) {
                            Some(o) => {
                                counts[o] -= 1;
                                let o = &pair.orientations[o];
                                (o.reviewer_id, o.supervisor_id)
                            }
                            None => (u32::from(pair.a), u32::from(pair.b)),
                        };
                    days[d].classrooms[c].slots[s] = Some(SolutionSlot {
                        reviewer_id,
                        supervisor_id,
                        chair_person_id: u32::from(chair),
                    });
                }
            }
        }

        let breakdown = self.scorer().breakdown(state);
        Solution {
            score,
            days,
            metric_totals: MetricKind::ALL
                .iter()
                .map(|k| (k.name().to_string(), breakdown[k.index()]))
                .collect(),
        }
    }
}

impl SearchProblem for PairProblem {
    type State = PairState;
    type Action = PairAction;
    type Output = Solution;

    fn start_state(&self) -> PairState {
        PairState::new(&self.input)
    }

    fn apply(&self, action: &PairAction, state: &mut PairState) {
        state.apply(action);
    }

    fn collect_actions(&self, state: &PairState) -> Vec<PairAction> {
        self.input
            .positions
            .iter()
            .flat_map(|&pos| self.actions_at(state, pos))
            .collect()
    }

    fn collect_actions_parallel(&self, state: &PairState) -> Vec<PairAction> {
        self.input
            .positions
            .par_iter()
            .flat_map_iter(|&pos| self.actions_at(state, pos))
            .collect()
    }

    fn score(&self, state: &PairState) -> f64 {
        self.scorer().score(state)
    }

    fn strategy(&self, state: &PairState) -> LookaheadStrategy {
        self.schedule.strategy_for(state.depth(), state.max_depth())
    }

    fn output(&self, state: &PairState, score: f64) -> Solution {
        self.solution(state, score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputClassroom, InputDay};
    use crate::pairing::testing::{chairs, fixture};
    use crate::search::{BacktrackingSearch, CancelToken, SearchProgress, TerminationPolicy};
    use std::sync::Arc;

    fn solve(problem: &PairProblem) -> Arc<SearchProgress<Solution>> {
        let progress = Arc::new(SearchProgress::new());
        BacktrackingSearch::new(problem, Arc::clone(&progress), CancelToken::new())
            .with_policy(TerminationPolicy::Exhaustive)
            .with_seed(Some(17))
            .run();
        progress
    }

    #[test]
    fn test_parallel_generation_matches_sequential() {
        let (input, chairs) = fixture();
        let problem = PairProblem::new(&input, &chairs, &OptimizerConfig::default());
        let state = problem.start_state();
        let seq = problem.collect_actions(&state);
        assert_eq!(seq, problem.collect_actions_parallel(&state));
        // 6 slots x 2 pairs, nothing blocked yet.
        assert_eq!(problem.input().positions.len(), 6);
        assert_eq!(problem.input().pairs.len(), 2);
        assert_eq!(seq.len(), 12);
    }

    #[test]
    fn test_exhausted_pairs_are_not_offered() {
        let (input, chairs) = fixture();
        let problem = PairProblem::new(&input, &chairs, &OptimizerConfig::default());
        let mut state = problem.start_state();
        let first = problem
            .collect_actions(&state)
            .into_iter()
            .find(|a| a.pair == 1)
            .unwrap();
        problem.apply(&first, &mut state);
        assert!(problem.collect_actions(&state).iter().all(|a| a.pair == 0));
    }

    #[test]
    fn test_solution_respects_demand_and_collisions() {
        let (input, chairs) = fixture();
        let problem = PairProblem::new(&input, &chairs, &OptimizerConfig::default());
        let progress = solve(&problem);
        let solution = progress.best_result().unwrap();

        assert!(progress.is_complete());
        assert_eq!(solution.assignment_count(), 3);
        let count = |r: u32, s: u32| {
            solution
                .assigned_slots()
                .filter(|(_, _, _, x)| x.reviewer_id == r && x.supervisor_id == s)
                .count()
        };
        assert_eq!(count(0, 1), 2);
        assert_eq!(count(2, 1), 1);

        for (d, c, s, slot) in solution.assigned_slots() {
            for (d2, c2, s2, other) in solution.assigned_slots() {
                if d == d2 && s == s2 && c != c2 {
                    for p in [slot.reviewer_id, slot.supervisor_id, slot.chair_person_id] {
                        assert!(!other.involves(p));
                    }
                }
            }
        }
    }

    #[test]
    fn test_orientations_follow_slot_order() {
        let input = Input::new()
            .with_chair_persons([2])
            .with_defense(0, 1, 1)
            .with_defense(1, 0, 1)
            .with_day(InputDay::new(7).with_classroom(InputClassroom::new(4, vec![2])));
        let chairs = chairs(&[&[&[(0, 1, 2)]]]);
        let problem = PairProblem::new(&input, &chairs, &OptimizerConfig::default());
        let solution = solve(&problem).best_result().unwrap();

        assert_eq!(solution.days[0].id, 7);
        assert_eq!(solution.days[0].classrooms[0].id, 4);
        let slots = &solution.days[0].classrooms[0].slots;
        let first = slots[0].unwrap();
        let second = slots[1].unwrap();
        assert_eq!((first.reviewer_id, first.supervisor_id), (0, 1));
        assert_eq!((second.reviewer_id, second.supervisor_id), (1, 0));
        assert_eq!(first.chair_person_id, 2);
    }

    #[test]
    fn test_metric_totals_sum_to_score() {
        let (input, chairs) = fixture();
        let problem = PairProblem::new(&input, &chairs, &OptimizerConfig::default());
        let solution = solve(&problem).best_result().unwrap();
        assert_eq!(solution.metric_totals.len(), MetricKind::COUNT);
        let sum: f64 = solution.metric_totals.iter().map(|(_, v)| v).sum();
        assert!((sum - solution.score).abs() < 1e-9);
    }
}
