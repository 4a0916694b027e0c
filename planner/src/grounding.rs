use std::collections::BTreeSet;

use itertools::Itertools;
use logic::Literal;

use crate::{GroundedAction, Problem, Result};

/// Every instantiation of every action schema over type-consistent,
/// pairwise-distinct object tuples. A parameter type with no matching
/// objects simply contributes zero groundings.
pub fn ground_all_actions(problem: &Problem) -> Result<Vec<GroundedAction>> {
    let mut grounded = Vec::new();
    for schema in problem.domain().actions().values() {
        if schema.arity() == 0 {
            grounded.push(schema.ground(Vec::new())?);
            continue;
        }

        let candidates: Vec<Vec<String>> = schema
            .parameter_types()
            .iter()
            .map(|t| problem.objects_of_type(t.as_deref()))
            .collect();
        if candidates.iter().any(Vec::is_empty) {
            continue;
        }

        for combo in candidates.into_iter().multi_cartesian_product() {
            if has_repeats(&combo) {
                continue;
            }
            grounded.push(schema.ground(combo)?);
        }
    }
    Ok(grounded)
}

/// Every type-consistent grounding of every predicate, as positive
/// literals. This is the universe used to complete a closed-world
/// state into explicit positive and negative facts.
pub fn ground_all_predicates(problem: &Problem) -> Result<BTreeSet<Literal>> {
    let mut atoms = BTreeSet::new();
    for predicate in problem.domain().predicates().values() {
        if predicate.arity() == 0 {
            atoms.insert(predicate.ground(Vec::<String>::new())?.to_literal()?);
            continue;
        }

        let candidates: Vec<Vec<String>> = predicate
            .types()
            .iter()
            .map(|t| problem.objects_of_type(t.as_deref()))
            .collect();
        if candidates.iter().any(Vec::is_empty) {
            continue;
        }

        for combo in candidates.into_iter().multi_cartesian_product() {
            if has_repeats(&combo) {
                continue;
            }
            atoms.insert(predicate.ground(combo)?.to_literal()?);
        }
    }
    Ok(atoms)
}

fn has_repeats(combo: &[String]) -> bool {
    combo.iter().collect::<BTreeSet<_>>().len() != combo.len()
}

#[cfg(test)]
mod tests {
    use logic::{Predicate, Proposition, TypeHierarchy, OBJECT_TYPE};

    use crate::{ActionSchema, Domain, KnowledgeState};

    use super::*;

    fn gripper_like_problem() -> Problem {
        let mut types = TypeHierarchy::new();
        types.add_type("ball", Some(OBJECT_TYPE)).unwrap();
        types.add_type("room", Some(OBJECT_TYPE)).unwrap();

        let at = Predicate::parse("at ?b - ball ?r - room").unwrap();
        let goal = Proposition::Pred(at.ground(["b1", "r1"]).unwrap());

        let mov = ActionSchema::new(
            "move",
            vec![
                ("x".to_string(), Some("room".to_string())),
                ("y".to_string(), Some("room".to_string())),
            ],
            None,
            None,
        )
        .unwrap();
        let fly = ActionSchema::new(
            "fly",
            vec![("p".to_string(), Some("plane".to_string()))],
            None,
            None,
        )
        .unwrap();

        let domain = Domain::new("gr", types, vec![at], vec![mov, fly]).unwrap();
        Problem::new(
            "gr-1",
            domain,
            vec![
                ("b1".to_string(), Some("ball".to_string())),
                ("b2".to_string(), Some("ball".to_string())),
                ("r1".to_string(), Some("room".to_string())),
                ("r2".to_string(), Some("room".to_string())),
            ],
            KnowledgeState::new(),
            goal,
        )
        .unwrap()
    }

    #[test]
    fn tuples_never_repeat_objects() {
        let problem = gripper_like_problem();
        let actions = ground_all_actions(&problem).unwrap();

        // move over 2 rooms: (r1,r2) and (r2,r1) only.
        let moves: Vec<_> = actions.iter().filter(|a| a.name() == "move").collect();
        assert_eq!(moves.len(), 2);
        for m in moves {
            assert_ne!(m.objects()[0], m.objects()[1]);
        }
    }

    #[test]
    fn empty_type_yields_no_groundings_without_error() {
        let problem = gripper_like_problem();
        let actions = ground_all_actions(&problem).unwrap();
        assert!(actions.iter().all(|a| a.name() != "fly"));
    }

    #[test]
    fn predicate_universe_respects_types() {
        let problem = gripper_like_problem();
        let atoms = ground_all_predicates(&problem).unwrap();
        // at: 2 balls x 2 rooms.
        assert_eq!(atoms.len(), 4);
        assert!(atoms.contains(&Literal::new("at", ["b1", "r2"])));
        assert!(!atoms.contains(&Literal::new("at", ["r1", "b1"])));
    }
}
