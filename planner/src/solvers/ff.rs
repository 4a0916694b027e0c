//! FF-style planning: enforced hill-climbing over the relaxed-plan
//! heuristic. The relaxation drops every delete effect, layers a
//! delete-free graph until the goals appear, and counts the actions of
//! a plan extracted backwards through the layers.

use std::collections::{BTreeSet, HashSet, VecDeque};

use logic::Literal;

use crate::{ground_all_actions, Error, GroundedAction, KnowledgeState, Problem, Result};

use super::search::applicable_successors;

/// Plans by greedily following the relaxed-plan heuristic, escaping
/// plateaus with a breadth-first burst. Errs with `SearchExhausted`
/// when no heuristic improvement is reachable anywhere.
pub fn ff_plan(problem: &Problem) -> Result<Vec<GroundedAction>> {
    let actions = ground_all_actions(problem)?;
    let goals = problem
        .goal()
        .flatten_literals()
        .map_err(|_| Error::NonConjunctiveGoal(problem.goal().to_string()))?;

    let mut current = problem.initial_state().clone();
    let mut h_current =
        relaxed_plan_length(&actions, &goals, &current).ok_or(Error::SearchExhausted)?;
    let mut plan = Vec::new();

    while !problem.check_goal(&current) {
        // Steepest single-step descent first.
        let mut best_h = h_current;
        let mut best_step: Option<(GroundedAction, KnowledgeState)> = None;
        for (action, next) in applicable_successors(&current, &actions) {
            if let Some(h) = relaxed_plan_length(&actions, &goals, &next) {
                if h < best_h {
                    best_h = h;
                    best_step = Some((action.clone(), next));
                }
            }
        }

        match best_step {
            Some((action, next)) => {
                tracing::debug!("ff: {action} improves heuristic to {best_h}");
                plan.push(action);
                current = next;
                h_current = best_h;
            }
            None => {
                let (next, h, burst) = escape_plateau(&actions, &goals, &current, h_current)?;
                tracing::debug!("ff: plateau escaped after {} actions", burst.len());
                plan.extend(burst);
                current = next;
                h_current = h;
            }
        }
    }

    Ok(plan)
}

/// Breadth-first search for the nearest state with a strictly better
/// heuristic value than `h_start`.
fn escape_plateau(
    actions: &[GroundedAction],
    goals: &BTreeSet<Literal>,
    start: &KnowledgeState,
    h_start: usize,
) -> Result<(KnowledgeState, usize, Vec<GroundedAction>)> {
    let mut visited: HashSet<KnowledgeState> = HashSet::new();
    let mut fringe: VecDeque<(KnowledgeState, Vec<GroundedAction>)> =
        VecDeque::from([(start.clone(), Vec::new())]);

    while let Some((state, path)) = fringe.pop_front() {
        if !visited.insert(state.clone()) {
            continue;
        }

        match relaxed_plan_length(actions, goals, &state) {
            Some(h) if h < h_start => return Ok((state, h, path)),
            // A state the relaxation cannot solve is a dead end.
            None => continue,
            Some(_) => {}
        }

        for (action, next) in applicable_successors(&state, actions) {
            if !visited.contains(&next) {
                let mut longer = path.clone();
                longer.push(action.clone());
                fringe.push_back((next, longer));
            }
        }
    }

    Err(Error::SearchExhausted)
}

/// Length of a relaxed plan from `from` to `goals`, or `None` when the
/// delete-free graph fixpoints before reaching them.
fn relaxed_plan_length(
    actions: &[GroundedAction],
    goals: &BTreeSet<Literal>,
    from: &KnowledgeState,
) -> Option<usize> {
    // Forward: layer delete-free states until the goals all appear.
    let mut layers: Vec<(KnowledgeState, Vec<&GroundedAction>)> =
        vec![(from.to_explicit(), Vec::new())];
    loop {
        let (state, _) = layers.last().expect("at least the base layer");
        if goals.iter().all(|g| state.holds(g)) {
            break;
        }

        let applicable: Vec<&GroundedAction> = actions
            .iter()
            .filter(|a| a.preconditions().iter().all(|l| state.holds(l)))
            .collect();
        let additions: Vec<Literal> = applicable
            .iter()
            .flat_map(|a| a.effects())
            .filter(|e| !e.is_negated())
            .cloned()
            .collect();

        let next = state.teach_all(additions);
        if next == *state {
            return None;
        }
        layers.push((next, applicable));
    }

    // Backward: count one action per goal not already available a
    // layer earlier, deferring its preconditions as new goals.
    let mut length = 0;
    let mut local_goals: BTreeSet<Literal> = goals.clone();
    for index in (0..layers.len()).rev() {
        let producers = &layers[index].1;
        let prev_state = index.checked_sub(1).map(|i| &layers[i].0);

        let mut deferred: BTreeSet<Literal> = BTreeSet::new();
        let mut achieved: BTreeSet<Literal> = BTreeSet::new();
        for goal in &local_goals {
            if let Some(prev) = prev_state {
                if prev.holds(goal) {
                    deferred.insert(goal.clone());
                    continue;
                }
            }
            if achieved.contains(goal) {
                continue;
            }
            if let Some(action) = producers.iter().find(|a| a.effects().contains(goal)) {
                length += 1;
                achieved.extend(
                    action
                        .effects()
                        .iter()
                        .filter(|e| !e.is_negated())
                        .cloned(),
                );
                deferred.extend(
                    action
                        .preconditions()
                        .iter()
                        .filter(|p| !p.is_negated())
                        .cloned(),
                );
            }
        }
        local_goals = deferred;
    }

    Some(length)
}

#[cfg(test)]
mod tests {
    use logic::{Predicate, Proposition, TypeHierarchy};

    use crate::{ActionSchema, Domain};

    use super::*;

    // The relaxation ignores deletes, so the test domain keeps its
    // preconditions positive: flipping is always allowed and only adds.
    fn switches_problem(count: usize) -> Problem {
        let on = Predicate::parse("on ?s").unwrap();
        let flip = ActionSchema::new(
            "flip",
            vec![("s".to_string(), None)],
            None,
            Some(Proposition::Pred(on.clone())),
        )
        .unwrap();
        let domain =
            Domain::new("switches", TypeHierarchy::new(), vec![on.clone()], vec![flip]).unwrap();

        let names: Vec<String> = (1..=count).map(|i| format!("s{i}")).collect();
        let goal = Proposition::and(
            names
                .iter()
                .map(|s| Proposition::Pred(on.ground([s.as_str()]).unwrap()))
                .collect(),
        );
        Problem::new(
            "all-on",
            domain,
            names.into_iter().map(|s| (s, None)).collect(),
            KnowledgeState::new(),
            goal,
        )
        .unwrap()
    }

    #[test]
    fn relaxed_plan_length_counts_needed_actions() {
        let problem = switches_problem(3);
        let actions = ground_all_actions(&problem).unwrap();
        let goals = problem.goal().flatten_literals().unwrap();

        let h = relaxed_plan_length(&actions, &goals, problem.initial_state());
        assert_eq!(h, Some(3));
    }

    #[test]
    fn relaxed_length_is_zero_at_the_goal() {
        let problem = switches_problem(1);
        let actions = ground_all_actions(&problem).unwrap();
        let goals = problem.goal().flatten_literals().unwrap();

        let done = problem
            .initial_state()
            .teach(Literal::new("on", ["s1"]));
        assert_eq!(relaxed_plan_length(&actions, &goals, &done), Some(0));
    }

    #[test]
    fn ff_plan_reaches_the_goal() {
        let problem = switches_problem(3);
        let plan = ff_plan(&problem).unwrap();
        assert_eq!(plan.len(), 3);

        let mut state = problem.initial_state().clone();
        for action in &plan {
            let schema = problem.domain().action(action.name()).unwrap();
            state = schema
                .take_action(&state, action.objects())
                .unwrap()
                .expect("plan action must be applicable");
        }
        assert!(problem.check_goal(&state));
    }
}
