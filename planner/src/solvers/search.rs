//! Forward state-space search: best-first over knowledge states, with
//! the plan read back off the state path afterwards.

use pathfinding::directed::astar::astar;

use crate::{ground_all_actions, GroundedAction, KnowledgeState, Problem, Result};

use super::heuristics;

/// A*-style forward search guided by `heuristic`. Returns the action
/// sequence reaching the goal, or `None` when the reachable state
/// space contains no goal state.
pub fn search_plan<H>(problem: &Problem, heuristic: H) -> Result<Option<Vec<GroundedAction>>>
where
    H: Fn(&KnowledgeState) -> usize,
{
    let actions = ground_all_actions(problem)?;
    let start = problem.initial_state().clone();

    let found = astar(
        &start,
        |state| {
            applicable_successors(state, &actions)
                .into_iter()
                .map(|(_, next)| (next, 1usize))
                .collect::<Vec<_>>()
        },
        |state| heuristic(state),
        |state| problem.check_goal(state),
    );

    Ok(found.map(|(path, _)| actions_along_path(&path, &actions)))
}

/// Uninformed search; with unit step costs this explores states in
/// breadth-first order.
pub fn bfs_plan(problem: &Problem) -> Result<Option<Vec<GroundedAction>>> {
    search_plan(problem, heuristics::null)
}

/// Every applicable action paired with the state it produces.
/// Transitions that change nothing are dropped.
pub(crate) fn applicable_successors<'a>(
    state: &KnowledgeState,
    actions: &'a [GroundedAction],
) -> Vec<(&'a GroundedAction, KnowledgeState)> {
    actions
        .iter()
        .filter(|a| a.preconditions().iter().all(|l| state.holds(l)))
        .map(|a| (a, state.teach_all(a.effects().iter().cloned())))
        .filter(|(_, next)| next != state)
        .collect()
}

fn actions_along_path(path: &[KnowledgeState], actions: &[GroundedAction]) -> Vec<GroundedAction> {
    path.windows(2)
        .map(|w| {
            applicable_successors(&w[0], actions)
                .into_iter()
                .find(|(_, next)| *next == w[1])
                .map(|(a, _)| a.clone())
                .expect("state path contains an impossible transition")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use logic::{Literal, Predicate, Proposition, TypeHierarchy};

    use crate::{ActionSchema, Domain, Semantics};

    use super::*;

    /// Three switches, one action to flip each on.
    fn switches_problem() -> Problem {
        let on = Predicate::parse("on ?s").unwrap();
        let flip = ActionSchema::new(
            "flip",
            vec![("s".to_string(), None)],
            Some(Proposition::not(Proposition::Pred(on.clone()))),
            Some(Proposition::Pred(on.clone())),
        )
        .unwrap();
        let domain = Domain::new("switches", TypeHierarchy::new(), vec![on.clone()], vec![flip])
            .unwrap();

        let goal = Proposition::and(
            ["s1", "s2", "s3"]
                .iter()
                .map(|s| Proposition::Pred(on.ground([*s]).unwrap()))
                .collect(),
        );
        Problem::new(
            "all-on",
            domain,
            ["s1", "s2", "s3"]
                .iter()
                .map(|s| (s.to_string(), None))
                .collect(),
            crate::KnowledgeState::new(),
            goal,
        )
        .unwrap()
    }

    #[test]
    fn finds_shortest_flip_sequence() {
        let problem = switches_problem();
        let plan = bfs_plan(&problem).unwrap().expect("plan expected");
        assert_eq!(plan.len(), 3);

        // Replaying the plan reaches the goal.
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

    #[test]
    fn heuristic_guided_search_matches_uninformed_result() {
        let problem = switches_problem();
        let h = heuristics::goals_remaining(&problem).unwrap();
        let plan = search_plan(&problem, h).unwrap().expect("plan expected");
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let problem = switches_problem();
        // Make s1 impossible to flip by already marking it on and
        // asking for it off.
        let on_s1 = Literal::new("on", ["s1"]);
        let off_goal = Proposition::and(vec![Proposition::not(Proposition::Pred(
            problem.domain().predicate("on").unwrap().ground(["s1"]).unwrap(),
        ))]);
        let stuck = Problem::new(
            "stuck",
            problem.domain().clone(),
            vec![("s1".to_string(), None)],
            crate::KnowledgeState::from_literals([on_s1], Semantics::ClosedWorld),
            off_goal,
        )
        .unwrap();

        assert!(bfs_plan(&stuck).unwrap().is_none());
    }
}
