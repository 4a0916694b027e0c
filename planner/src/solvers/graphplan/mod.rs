//! GraphPlan: builds a layered graph of alternating proposition and
//! action levels with mutual-exclusion tracking, then extracts a plan
//! by memoized backward search. Returns `Ok(None)` once the graph and
//! the no-good cache both stabilize without a solution, which proves
//! that no plan exists at any depth.

mod extract;
mod level;
mod mutex;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::rc::Rc;

use itertools::Itertools;
use logic::Literal;

use crate::{
    ground_all_actions, ground_all_predicates, Error, GroundedAction, KnowledgeState, Problem,
    Result, Semantics,
};

use extract::{extract, NoGoods};
use level::Level;

pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// An ordered mapping from graph level (ascending) to the actions
/// chosen at that level. Actions within one level are mutually
/// compatible and may execute in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: BTreeMap<usize, BTreeSet<GroundedAction>>,
}

impl Plan {
    pub(crate) fn record_step(
        &mut self,
        level: usize,
        actions: impl IntoIterator<Item = GroundedAction>,
    ) {
        self.steps.entry(level).or_default().extend(actions);
    }

    pub fn steps(&self) -> &BTreeMap<usize, BTreeSet<GroundedAction>> {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.values().all(BTreeSet::is_empty)
    }

    pub fn action_count(&self) -> usize {
        self.steps.values().map(BTreeSet::len).sum()
    }

    /// All actions flattened in level order.
    pub fn actions_in_order(&self) -> impl Iterator<Item = &GroundedAction> {
        self.steps.values().flatten()
    }

    /// Drops every persistence no-op, keeping real actions untouched.
    /// Levels left with nothing to do disappear from the mapping.
    pub fn without_nops(self) -> Plan {
        let steps = self
            .steps
            .into_iter()
            .map(|(level, actions)| {
                (
                    level,
                    actions.into_iter().filter(|a| !a.is_nop()).collect(),
                )
            })
            .filter(|(_, actions): &(usize, BTreeSet<GroundedAction>)| !actions.is_empty())
            .collect();
        Plan { steps }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(empty plan)");
        }
        for (i, (level, actions)) in self.steps.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{level}: {}", actions.iter().join(", "))?;
        }
        Ok(())
    }
}

/// The layered graph itself. Atoms no action can change are factored
/// out: their truth value is fixed by the initial state, so carrying
/// them through every level and goal set would only bloat the sets.
pub(crate) struct PlanningGraph {
    levels: Vec<Level>,
    actions: Vec<Rc<GroundedAction>>,
    static_atoms: BTreeSet<Literal>,
    static_truths: BTreeSet<Literal>,
}

impl PlanningGraph {
    pub(crate) fn new(problem: &Problem) -> Result<Self> {
        let grounded = ground_all_actions(problem)?;
        let universe = ground_all_predicates(problem)?;

        let fluent_atoms: BTreeSet<Literal> = grounded
            .iter()
            .flat_map(|a| a.effects().iter().map(Literal::atom))
            .collect();
        let static_atoms: BTreeSet<Literal> = universe
            .iter()
            .filter(|atom| !fluent_atoms.contains(atom))
            .cloned()
            .collect();

        let initial = problem.initial_state();
        let static_truths: BTreeSet<Literal> = static_atoms
            .iter()
            .map(|atom| {
                if initial.holds(atom) {
                    atom.clone()
                } else {
                    atom.complement()
                }
            })
            .collect();

        // An action whose static preconditions fail can never fire at
        // any level; drop it before the graph ever sees it.
        let actions: Vec<Rc<GroundedAction>> = grounded
            .into_iter()
            .filter(|a| {
                a.preconditions()
                    .iter()
                    .filter(|l| static_atoms.contains(&l.atom()))
                    .all(|l| static_truths.contains(l))
            })
            .map(Rc::new)
            .collect();

        // Closed-world completion of the fluent atoms: anything not
        // initially true is explicitly false at the base level.
        let base_literals: BTreeSet<Literal> = fluent_atoms
            .iter()
            .map(|atom| {
                if initial.holds(atom) {
                    atom.clone()
                } else {
                    atom.complement()
                }
            })
            .collect();
        let base = Level::initial(KnowledgeState::from_literals(
            base_literals,
            Semantics::ExplicitDelete,
        ));

        Ok(Self {
            levels: vec![base],
            actions,
            static_atoms,
            static_truths,
        })
    }

    pub(crate) fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub(crate) fn level(&self, index: usize) -> &Level {
        &self.levels[index]
    }

    pub(crate) fn is_static(&self, literal: &Literal) -> bool {
        self.static_atoms.contains(&literal.atom())
    }

    pub(crate) fn statically_true(&self, literal: &Literal) -> bool {
        self.static_truths.contains(literal)
    }

    fn fluent_preconditions_hold(&self, action: &GroundedAction, state: &KnowledgeState) -> bool {
        action
            .preconditions()
            .iter()
            .filter(|l| !self.is_static(l))
            .all(|l| state.holds(l))
    }

    /// Appends one level: the actions applicable in the last state plus
    /// per-literal no-ops, their mutexes, and the resulting state.
    pub(crate) fn expand(&mut self) {
        let prev = self.levels.last().expect("graph always has a base level");
        let applicable: Vec<Rc<GroundedAction>> = self
            .actions
            .iter()
            .filter(|a| self.fluent_preconditions_hold(a, prev.state()))
            .cloned()
            .collect();

        let next = Level::successor(prev, applicable);
        tracing::debug!(
            "level {}: {} actions, {} action mutex pairs, {} literal mutex pairs, {} literals",
            self.levels.len(),
            next.actions().len(),
            next.action_mutex_count(),
            next.literal_mutex_count(),
            next.state().len()
        );
        self.levels.push(next);
    }

    /// The goal literals are jointly available at `level`: each one
    /// present, no two mutually exclusive.
    pub(crate) fn goals_reachable(&self, goals: &BTreeSet<Literal>, level: usize) -> bool {
        let lv = &self.levels[level];
        goals.iter().all(|g| lv.state().holds(g))
            && goals
                .iter()
                .tuple_combinations()
                .all(|(a, b)| !lv.literals_mutex(a, b))
    }

    /// Structural fixpoint: the last two levels are identical in state,
    /// actions and both mutex relations.
    pub(crate) fn leveled_off(&self) -> bool {
        let n = self.levels.len();
        n >= 2 && self.levels[n - 1] == self.levels[n - 2]
    }
}

/// Runs GraphPlan on `problem`.
///
/// * `Ok(Some(plan))`: a plan, no-ops already stripped.
/// * `Ok(None)`: proven unsolvable, the graph leveled off and the
///   no-good cache stopped growing between extraction attempts.
/// * `Err(Error::DepthExhausted)`: `max_depth` levels expanded without
///   either outcome; retrying with a larger bound may still succeed.
pub fn graph_plan(problem: &Problem, max_depth: usize) -> Result<Option<Plan>> {
    let goal_literals = problem
        .goal()
        .flatten_literals()
        .map_err(|_| Error::NonConjunctiveGoal(problem.goal().to_string()))?;

    let mut graph = PlanningGraph::new(problem)?;

    // Goals over static atoms are decided once and for all.
    let (static_goals, fluent_goals): (BTreeSet<_>, BTreeSet<_>) = goal_literals
        .into_iter()
        .partition(|l| graph.is_static(l));
    if let Some(unmet) = static_goals.iter().find(|g| !graph.statically_true(g)) {
        tracing::debug!("goal literal {unmet} can never be achieved; no plan exists");
        return Ok(None);
    }

    if fluent_goals.iter().all(|g| graph.level(0).state().holds(g)) {
        tracing::debug!("initial state already satisfies the goal");
        return Ok(Some(Plan::default()));
    }

    let mut nogoods = NoGoods::new();
    // Once the graph structurally levels off, every further level is
    // identical, so a plan can only come from extra timesteps. The
    // search has then run dry exactly when a failed attempt records no
    // new no-good at the leveled-off level.
    let mut leveled_at: Option<usize> = None;
    let mut nogoods_at_fixpoint: Option<usize> = None;

    loop {
        if graph.depth() >= max_depth {
            return Err(Error::DepthExhausted(max_depth));
        }
        graph.expand();
        let depth = graph.depth();
        if leveled_at.is_none() && graph.leveled_off() {
            leveled_at = Some(depth);
        }

        if graph.goals_reachable(&fluent_goals, depth) {
            if let Some(plan) = extract(&graph, &fluent_goals, depth, &mut nogoods) {
                tracing::debug!("plan extracted at level {depth}");
                return Ok(Some(plan.without_nops()));
            }

            if let Some(fixpoint) = leveled_at {
                let count = nogoods.iter().filter(|(level, _)| *level == fixpoint).count();
                if nogoods_at_fixpoint == Some(count) {
                    tracing::debug!(
                        "graph and no-goods leveled off at depth {depth}; unsolvable"
                    );
                    return Ok(None);
                }
                nogoods_at_fixpoint = Some(count);
            }
        } else if graph.leveled_off() {
            tracing::debug!("graph leveled off at depth {depth} without reaching the goal");
            return Ok(None);
        }
    }
}
