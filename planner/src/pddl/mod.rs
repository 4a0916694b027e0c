//! PDDL reader for `define`-based domain and problem files, covering
//! the `:strips`, `:typing` and `:negative-preconditions` subset the
//! solvers support.

mod tree;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use logic::{Predicate, Proposition, TypeHierarchy};

use crate::{ActionSchema, Domain, Error, KnowledgeState, Problem, Result};

use tree::Node;

const SUPPORTED_REQUIREMENTS: &[&str] = &[":strips", ":typing", ":negative-preconditions"];

/// Reads a domain file and a problem file into a ready-to-solve
/// `Problem`.
pub fn load_pddl(
    domain_path: impl AsRef<Path>,
    problem_path: impl AsRef<Path>,
) -> Result<Problem> {
    let domain = parse_domain(&read(domain_path.as_ref())?)?;
    parse_problem(domain, &read(problem_path.as_ref())?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_domain(input: &str) -> Result<Domain> {
    let root = tree::parse_tree(input)?;
    expect_define(&root)?;

    let mut name = String::new();
    let mut types = TypeHierarchy::new();
    let mut predicates: Vec<Predicate> = Vec::new();

    // Predicates first: action bodies resolve their atoms against the
    // declared vocabulary, wherever the sections appear in the file.
    for child in &root.children {
        let tokens: Vec<&str> = child.text.split_whitespace().collect();
        let keyword = keyword_of(child)?;
        match keyword.as_str() {
            "domain" => {
                name = required_token(&tokens, 1, "domain name")?.to_string();
            }
            ":requirements" => {
                for requirement in &tokens[1..] {
                    let lower = requirement.to_lowercase();
                    if !SUPPORTED_REQUIREMENTS.contains(&lower.as_str()) {
                        return Err(Error::Parse(format!(
                            "unsupported requirement: {requirement}"
                        )));
                    }
                }
            }
            ":types" => {
                for (ty, supertype) in parse_typed_list(&tokens[1..])? {
                    types.add_type(ty, supertype.as_deref())?;
                }
            }
            ":predicates" => {
                for declaration in &child.children {
                    predicates.push(Predicate::parse(&declaration.text)?);
                }
            }
            ":action" => {}
            other => return Err(Error::Parse(format!("unrecognized keyword: {other}"))),
        }
    }

    let by_name: BTreeMap<String, Predicate> = predicates
        .iter()
        .map(|p| (p.name().to_string(), p.clone()))
        .collect();

    let mut actions = Vec::new();
    for child in &root.children {
        if keyword_of(child)? == ":action" {
            actions.push(parse_action(&by_name, child)?);
        }
    }

    Domain::new(name, types, predicates, actions)
}

pub fn parse_problem(domain: Domain, input: &str) -> Result<Problem> {
    let root = tree::parse_tree(input)?;
    expect_define(&root)?;

    let mut name = String::new();
    let mut objects: Vec<(String, Option<String>)> = Vec::new();
    let mut initial = KnowledgeState::new();
    let mut goal: Option<Proposition> = None;

    for child in &root.children {
        let tokens: Vec<&str> = child.text.split_whitespace().collect();
        match keyword_of(child)?.as_str() {
            "problem" => {
                name = required_token(&tokens, 1, "problem name")?.to_string();
            }
            ":domain" => {
                let declared = required_token(&tokens, 1, "domain reference")?;
                if declared != domain.name() {
                    return Err(Error::Parse(format!(
                        "problem refers to domain {declared}, expected {}",
                        domain.name()
                    )));
                }
            }
            ":objects" => {
                objects = parse_typed_list(&tokens[1..])?;
            }
            ":init" => {
                for fact in &child.children {
                    if !fact.children.is_empty() {
                        return Err(Error::Parse(
                            "only plain atoms are allowed in :init".to_string(),
                        ));
                    }
                    let atom = parse_atom(domain.predicates(), &fact.text)?;
                    let literal = atom.to_literal().map_err(|_| {
                        Error::Parse("initial state must be completely grounded".to_string())
                    })?;
                    initial = initial.teach(literal);
                }
            }
            ":goal" => {
                let form = child
                    .children
                    .first()
                    .ok_or_else(|| Error::Parse("empty :goal".to_string()))?;
                let parsed = parse_proposition(domain.predicates(), form)?;
                if !parsed.is_grounded() {
                    return Err(Error::Parse(
                        "goal state must be completely grounded".to_string(),
                    ));
                }
                goal = Some(parsed);
            }
            other => return Err(Error::Parse(format!("unrecognized keyword: {other}"))),
        }
    }

    let goal = goal.ok_or_else(|| Error::Parse("missing :goal".to_string()))?;
    Problem::new(name, domain, objects, initial, goal)
}

fn expect_define(root: &Node) -> Result<()> {
    if root.text.trim().to_lowercase() != "define" {
        return Err(Error::Parse("expected a top-level define form".to_string()));
    }
    Ok(())
}

fn keyword_of(node: &Node) -> Result<String> {
    node.text
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .ok_or_else(|| Error::Parse("empty form".to_string()))
}

fn required_token<'a>(tokens: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    tokens
        .get(index)
        .copied()
        .ok_or_else(|| Error::Parse(format!("missing {what}")))
}

/// `name1 name2 - type name3 ...`: names grouped by a trailing type,
/// untyped names at the end left bare.
fn parse_typed_list(tokens: &[&str]) -> Result<Vec<(String, Option<String>)>> {
    let mut entries = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        if *token == "-" {
            let ty = iter
                .next()
                .ok_or_else(|| Error::Parse("dangling '-' in typed list".to_string()))?;
            for name in pending.drain(..) {
                entries.push((name, Some(ty.to_string())));
            }
        } else {
            pending.push(token.to_string());
        }
    }
    for name in pending {
        entries.push((name, None));
    }
    Ok(entries)
}

fn parse_action(predicates: &BTreeMap<String, Predicate>, node: &Node) -> Result<ActionSchema> {
    let tokens: Vec<&str> = node.text.split_whitespace().collect();
    let name = required_token(&tokens, 1, "action name")?;

    let mut parameters = Vec::new();
    let mut precondition = None;
    let mut effect = None;

    // Keywords in the loose text pair up, in order, with the nested
    // forms of this node.
    for (index, keyword) in tokens[2..].iter().enumerate() {
        let form = node.children.get(index).ok_or_else(|| {
            Error::Parse(format!("missing form for {keyword} in action {name}"))
        })?;
        match keyword.to_lowercase().as_str() {
            ":parameters" => {
                let raw: Vec<&str> = form.text.split_whitespace().collect();
                parameters = parse_typed_list(&raw)?
                    .into_iter()
                    .map(|(token, ty)| match token.strip_prefix('?') {
                        Some(var) => Ok((var.to_string(), ty)),
                        None => Err(Error::Parse(format!(
                            "expected a ?variable in parameters of {name}, found {token}"
                        ))),
                    })
                    .collect::<Result<_>>()?;
            }
            ":precondition" => precondition = Some(parse_proposition(predicates, form)?),
            ":effect" => effect = Some(parse_proposition(predicates, form)?),
            other => {
                return Err(Error::Parse(format!(
                    "unrecognized keyword in action {name}: {other}"
                )))
            }
        }
    }

    ActionSchema::new(name, parameters, precondition, effect)
}

fn parse_proposition(predicates: &BTreeMap<String, Predicate>, node: &Node) -> Result<Proposition> {
    match node.text.trim().to_lowercase().as_str() {
        "and" => Ok(Proposition::And(
            node.children
                .iter()
                .map(|c| parse_proposition(predicates, c))
                .collect::<Result<_>>()?,
        )),
        "or" => Ok(Proposition::Or(
            node.children
                .iter()
                .map(|c| parse_proposition(predicates, c))
                .collect::<Result<_>>()?,
        )),
        "not" => {
            if node.children.len() != 1 {
                return Err(Error::Parse(
                    "not takes exactly one argument".to_string(),
                ));
            }
            Ok(Proposition::not(parse_proposition(
                predicates,
                &node.children[0],
            )?))
        }
        _ => Ok(Proposition::Pred(parse_atom(predicates, &node.text)?)),
    }
}

/// Resolves an atom like `at-ball ?x roomb` against the declared
/// predicates: `?tokens` stay variables, bare tokens become bound
/// objects. Types come from the declaration, positionally.
fn parse_atom(predicates: &BTreeMap<String, Predicate>, text: &str) -> Result<Predicate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let name = tokens
        .first()
        .ok_or_else(|| Error::Parse("empty atom".to_string()))?;
    let declared = predicates
        .get(*name)
        .ok_or_else(|| Error::Parse(format!("unknown predicate: {name}")))?;

    let args = &tokens[1..];
    if args.len() != declared.arity() {
        return Err(Error::Parse(format!(
            "predicate {name} expects {} arguments, got {}",
            declared.arity(),
            args.len()
        )));
    }

    let mut variables = Vec::with_capacity(args.len());
    let mut constants: Vec<(String, String)> = Vec::new();
    for (position, (arg, ty)) in args.iter().zip(declared.types()).enumerate() {
        match arg.strip_prefix('?') {
            Some(var) => variables.push((var.to_string(), ty.clone())),
            None => {
                let var = format!("_p{position}");
                variables.push((var.clone(), ty.clone()));
                constants.push((var, arg.to_string()));
            }
        }
    }

    let mut atom = Predicate::new(*name, variables);
    for (var, object) in constants {
        atom = atom.with_binding(&var, object);
    }
    Ok(atom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = r#"
    (define (domain gripper)
        (:requirements :strips :typing)
        (:types room ball gripper)
        (:predicates
            (at-robby ?r - room)
            (at ?b - ball ?r - room)
            (free ?g - gripper)
            (carry ?g - gripper ?b - ball))
        (:action move
            :parameters (?from - room ?to - room)
            :precondition (at-robby ?from)
            :effect (and (at-robby ?to) (not (at-robby ?from))))
        (:action pick
            :parameters (?b - ball ?r - room ?g - gripper)
            :precondition (and (at ?b ?r) (at-robby ?r) (free ?g))
            :effect (and (carry ?g ?b) (not (at ?b ?r)) (not (free ?g))))
        (:action drop
            :parameters (?b - ball ?r - room ?g - gripper)
            :precondition (and (carry ?g ?b) (at-robby ?r))
            :effect (and (at ?b ?r) (free ?g) (not (carry ?g ?b)))))
    "#;

    const PROBLEM: &str = r#"
    (define (problem gripper-two)
        (:domain gripper)
        (:objects rooma roomb - room ball1 ball2 - ball left right - gripper)
        (:init (at-robby rooma)
               (free left) (free right)
               (at ball1 rooma) (at ball2 rooma))
        (:goal (and (at ball1 roomb) (at ball2 roomb))))
    "#;

    #[test]
    fn parses_typed_domain() {
        let domain = parse_domain(DOMAIN).unwrap();
        assert_eq!(domain.name(), "gripper");
        assert_eq!(domain.predicates().len(), 4);
        assert_eq!(domain.actions().len(), 3);
        assert!(domain.types().contains("ball"));

        let pick = domain.action("pick").unwrap();
        assert_eq!(pick.arity(), 3);
        assert_eq!(pick.parameter_types()[0].as_deref(), Some("ball"));
    }

    #[test]
    fn parses_problem_against_domain() {
        let domain = parse_domain(DOMAIN).unwrap();
        let problem = parse_problem(domain, PROBLEM).unwrap();
        assert_eq!(problem.name(), "gripper-two");
        assert_eq!(problem.objects_of_type(Some("ball")).len(), 2);
        assert_eq!(problem.initial_state().len(), 5);
        assert!(!problem.check_goal(problem.initial_state()));
    }

    #[test]
    fn rejects_unsupported_requirement() {
        let input = "(define (domain d) (:requirements :adl))";
        assert!(matches!(parse_domain(input), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_unknown_predicate_in_goal() {
        let domain = parse_domain(DOMAIN).unwrap();
        let bad = r#"
        (define (problem p) (:domain gripper)
            (:objects rooma - room)
            (:init)
            (:goal (at-nowhere rooma)))
        "#;
        assert!(matches!(parse_problem(domain, bad), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_mismatched_domain_reference() {
        let domain = parse_domain(DOMAIN).unwrap();
        let bad = "(define (problem p) (:domain blocks) (:goal (at-robby rooma)))";
        assert!(matches!(parse_problem(domain, bad), Err(Error::Parse(_))));
    }

    #[test]
    fn rejects_ungrounded_goal() {
        let domain = parse_domain(DOMAIN).unwrap();
        let bad = r#"
        (define (problem p) (:domain gripper)
            (:objects rooma - room)
            (:init)
            (:goal (at-robby ?r)))
        "#;
        assert!(matches!(parse_problem(domain, bad), Err(Error::Parse(_))));
    }
}
