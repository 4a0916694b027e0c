use logic::Proposition;

use crate::{Error, KnowledgeState, Problem, Result};

/// Degenerates best-first search into uniform-cost search.
pub fn null(_state: &KnowledgeState) -> usize {
    0
}

/// Counts the top-level goal conjuncts not yet satisfied. Requires a
/// conjunctive goal, since anything else has no meaningful per-conjunct
/// count.
pub fn goals_remaining(problem: &Problem) -> Result<impl Fn(&KnowledgeState) -> usize + '_> {
    let conjuncts = match problem.goal() {
        Proposition::And(props) => props.clone(),
        other => return Err(Error::NonConjunctiveGoal(other.to_string())),
    };

    Ok(move |state: &KnowledgeState| {
        conjuncts
            .iter()
            .filter(|p| !state.query(p).expect("goal is grounded by construction"))
            .count()
    })
}

#[cfg(test)]
mod tests {
    use logic::{Literal, Predicate, TypeHierarchy};

    use crate::{Domain, KnowledgeState};

    use super::*;

    #[test]
    fn counts_unsatisfied_conjuncts() {
        let on = Predicate::parse("on ?s").unwrap();
        let domain = Domain::new("d", TypeHierarchy::new(), vec![on.clone()], vec![]).unwrap();
        let goal = Proposition::and(vec![
            Proposition::Pred(on.ground(["s1"]).unwrap()),
            Proposition::Pred(on.ground(["s2"]).unwrap()),
        ]);
        let problem = Problem::new(
            "p",
            domain,
            vec![("s1".to_string(), None), ("s2".to_string(), None)],
            KnowledgeState::new(),
            goal,
        )
        .unwrap();

        let h = goals_remaining(&problem).unwrap();
        assert_eq!(h(problem.initial_state()), 2);

        let halfway = problem.initial_state().teach(Literal::new("on", ["s1"]));
        assert_eq!(h(&halfway), 1);
    }

    #[test]
    fn non_conjunctive_goal_is_rejected() {
        let on = Predicate::parse("on ?s").unwrap();
        let domain = Domain::new("d", TypeHierarchy::new(), vec![on.clone()], vec![]).unwrap();
        let goal = Proposition::Pred(on.ground(["s1"]).unwrap());
        let problem = Problem::new(
            "p",
            domain,
            vec![("s1".to_string(), None)],
            KnowledgeState::new(),
            goal,
        )
        .unwrap();

        assert!(matches!(
            goals_remaining(&problem),
            Err(Error::NonConjunctiveGoal(_))
        ));
    }
}
