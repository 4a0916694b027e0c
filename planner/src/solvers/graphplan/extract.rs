use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;

use logic::Literal;

use crate::GroundedAction;

use super::{Plan, PlanningGraph};

/// Goal sets proven unreachable at a given depth. Shared across every
/// extraction attempt of one `graph_plan` run; an entry, once recorded,
/// is final.
pub(crate) type NoGoods = HashSet<(usize, BTreeSet<Literal>)>;

/// Backward solution extraction. Selects a non-mutex set of actions at
/// `level` whose combined effects cover `goals`, then recurses towards
/// the base with the union of their preconditions as the subgoal.
pub(crate) fn extract(
    graph: &PlanningGraph,
    goals: &BTreeSet<Literal>,
    level: usize,
    nogoods: &mut NoGoods,
) -> Option<Plan> {
    if goals.is_empty() {
        return Some(Plan::default());
    }

    let memo_key = (level, goals.clone());
    if nogoods.contains(&memo_key) {
        return None;
    }

    if level == 0 {
        if goals.iter().all(|g| graph.level(0).state().holds(g)) {
            return Some(Plan::default());
        }
        nogoods.insert(memo_key);
        return None;
    }

    let layer = graph.level(level);
    let mut visited: HashSet<BTreeSet<Rc<GroundedAction>>> = HashSet::new();
    let mut queue: VecDeque<BTreeSet<Rc<GroundedAction>>> = VecDeque::new();

    // Seed with every single action achieving at least one goal.
    for action in layer.actions() {
        if action.effects().iter().any(|e| goals.contains(e)) {
            let seed = BTreeSet::from([action.clone()]);
            if visited.insert(seed.clone()) {
                queue.push_back(seed);
            }
        }
    }

    while let Some(candidate) = queue.pop_front() {
        let covered: BTreeSet<&Literal> = candidate
            .iter()
            .flat_map(|a| a.effects())
            .filter(|e| goals.contains(*e))
            .collect();

        if covered.len() == goals.len() {
            let subgoals: BTreeSet<Literal> = candidate
                .iter()
                .flat_map(|a| a.preconditions())
                .filter(|l| !graph.is_static(l))
                .cloned()
                .collect();
            if let Some(mut plan) = extract(graph, &subgoals, level - 1, nogoods) {
                plan.record_step(level, candidate.iter().map(|a| (**a).clone()));
                return Some(plan);
            }
            // Only final exhaustion is memoized, not this dead end.
            continue;
        }

        // Grow by one action that achieves a still-missing goal and is
        // compatible with everything already chosen.
        for action in layer.actions() {
            if candidate.contains(action) {
                continue;
            }
            let relevant = action
                .effects()
                .iter()
                .any(|e| goals.contains(e) && !covered.contains(e));
            if !relevant {
                continue;
            }
            if candidate
                .iter()
                .any(|chosen| layer.actions_mutex(chosen, action))
            {
                continue;
            }

            let mut grown = candidate.clone();
            grown.insert(action.clone());
            if visited.insert(grown.clone()) {
                queue.push_back(grown);
            }
        }
    }

    nogoods.insert(memo_key);
    None
}
