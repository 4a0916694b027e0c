//! End-to-end gripper scenario: a robot with two grippers ferries four
//! balls between two rooms. Typing is encoded with ordinary predicates
//! (ROOM/BALL/GRIPPER), so the engine's handling of never-changing
//! facts is exercised as well.

use logic::{Predicate, Proposition, TypeHierarchy};
use planner::solvers::graph_plan;
use planner::{ActionSchema, Domain, KnowledgeState, Problem};

fn pred(s: &str) -> Proposition {
    Proposition::Pred(Predicate::parse(s).unwrap())
}

fn not(s: &str) -> Proposition {
    Proposition::not(pred(s))
}

fn untyped(vars: &[&str]) -> Vec<(String, Option<String>)> {
    vars.iter().map(|v| (v.to_string(), None)).collect()
}

fn gripper_problem() -> Problem {
    let predicates = [
        "ROOM ?x",
        "BALL ?x",
        "GRIPPER ?x",
        "at-robby ?x",
        "at-ball ?x ?y",
        "free ?x",
        "carry ?x ?y",
    ]
    .map(|s| Predicate::parse(s).unwrap());

    let move_action = ActionSchema::new(
        "move",
        untyped(&["x", "y"]),
        Some(Proposition::and(vec![
            pred("ROOM ?x"),
            pred("ROOM ?y"),
            pred("at-robby ?x"),
        ])),
        Some(Proposition::and(vec![
            pred("at-robby ?y"),
            not("at-robby ?x"),
        ])),
    )
    .unwrap();

    let pickup_action = ActionSchema::new(
        "pickup",
        untyped(&["x", "y", "z"]),
        Some(Proposition::and(vec![
            pred("BALL ?x"),
            pred("ROOM ?y"),
            pred("GRIPPER ?z"),
            pred("at-ball ?x ?y"),
            pred("at-robby ?y"),
            pred("free ?z"),
        ])),
        Some(Proposition::and(vec![
            pred("carry ?z ?x"),
            not("at-ball ?x ?y"),
            not("free ?z"),
        ])),
    )
    .unwrap();

    let drop_action = ActionSchema::new(
        "drop",
        untyped(&["x", "y", "z"]),
        Some(Proposition::and(vec![
            pred("BALL ?x"),
            pred("ROOM ?y"),
            pred("GRIPPER ?z"),
            pred("carry ?z ?x"),
            pred("at-robby ?y"),
        ])),
        Some(Proposition::and(vec![
            pred("at-ball ?x ?y"),
            pred("free ?z"),
            not("carry ?z ?x"),
        ])),
    )
    .unwrap();

    let domain = Domain::new(
        "gripper",
        TypeHierarchy::new(),
        predicates.to_vec(),
        vec![move_action, pickup_action, drop_action],
    )
    .unwrap();

    let initial_facts = [
        "ROOM rooma",
        "ROOM roomb",
        "BALL ball1",
        "BALL ball2",
        "BALL ball3",
        "BALL ball4",
        "GRIPPER left",
        "GRIPPER right",
        "free left",
        "free right",
        "at-robby rooma",
        "at-ball ball1 rooma",
        "at-ball ball2 rooma",
        "at-ball ball3 rooma",
        "at-ball ball4 rooma",
    ];
    let mut initial = KnowledgeState::new();
    for fact in initial_facts {
        let mut tokens = fact.split_whitespace();
        let name = tokens.next().unwrap();
        let objects: Vec<&str> = tokens.collect();
        initial = initial.teach(logic::Literal::new(name, objects));
    }

    let goal = Proposition::and(
        ["ball1", "ball2", "ball3", "ball4"]
            .iter()
            .map(|b| {
                Proposition::Pred(
                    Predicate::parse("at-ball ?x ?y")
                        .unwrap()
                        .ground([*b, "roomb"])
                        .unwrap(),
                )
            })
            .collect(),
    );

    let objects = [
        "rooma", "roomb", "ball1", "ball2", "ball3", "ball4", "left", "right",
    ];
    Problem::new(
        "gripper-four",
        domain,
        objects.iter().map(|o| (o.to_string(), None)).collect(),
        initial,
        goal,
    )
    .unwrap()
}

#[test]
fn moves_all_four_balls_in_at_most_eleven_actions() {
    let problem = gripper_problem();
    let plan = graph_plan(&problem, 20)
        .expect("planning must not exhaust the depth bound")
        .expect("a plan exists");

    assert!(
        plan.action_count() <= 11,
        "expected at most 11 actions, got {}:\n{plan}",
        plan.action_count()
    );
    assert!(plan.actions_in_order().all(|a| !a.is_nop()));

    // Replaying the plan level by level through the state-transition
    // contract must reach the goal. Actions within one level are
    // mutually compatible, so set order is fine.
    let mut state = problem.initial_state().clone();
    for actions in plan.steps().values() {
        for action in actions {
            let schema = problem
                .domain()
                .action(action.name())
                .expect("plan action names a domain schema");
            state = schema
                .take_action(&state, action.objects())
                .expect("grounding matches the schema")
                .unwrap_or_else(|| panic!("{action} is not applicable during replay"));
        }
    }
    assert!(problem.check_goal(&state));
}

#[test]
fn single_ball_goal_is_three_actions() {
    let problem = gripper_problem();
    let goal = Proposition::and(vec![Proposition::Pred(
        Predicate::parse("at-ball ?x ?y")
            .unwrap()
            .ground(["ball1", "roomb"])
            .unwrap(),
    )]);
    let problem = Problem::new(
        "gripper-one",
        problem.domain().clone(),
        problem
            .all_objects()
            .into_iter()
            .map(|o| (o, None))
            .collect(),
        problem.initial_state().clone(),
        goal,
    )
    .unwrap();

    let plan = graph_plan(&problem, 20).unwrap().expect("a plan exists");
    // pickup, move, drop.
    assert_eq!(plan.action_count(), 3);
}
