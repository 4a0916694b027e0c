use std::collections::BTreeSet;
use std::rc::Rc;

use logic::Literal;

use crate::{GroundedAction, KnowledgeState, Semantics};

use super::mutex::{self, ActionPair, LiteralPair, Pair};

/// One slice of the planning graph: the proposition state reached at
/// this depth, the actions that produced it, and the two mutex
/// relations. Once built a level never changes; the graph only appends.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Level {
    state: KnowledgeState,
    actions: Vec<Rc<GroundedAction>>,
    action_mutexes: BTreeSet<ActionPair>,
    literal_mutexes: BTreeSet<LiteralPair>,
}

impl Level {
    /// The base of the graph: facts only, no producing actions.
    pub(crate) fn initial(state: KnowledgeState) -> Self {
        Self {
            state,
            actions: Vec::new(),
            action_mutexes: BTreeSet::new(),
            literal_mutexes: BTreeSet::new(),
        }
    }

    /// Builds the next level from the actions applicable in `prev`'s
    /// state. Every literal of the previous state gets a persistence
    /// no-op, so facts are never lost by simply not acting on them.
    pub(crate) fn successor(prev: &Level, applicable: Vec<Rc<GroundedAction>>) -> Self {
        let mut actions = applicable;
        for literal in prev.state.literals() {
            actions.push(Rc::new(GroundedAction::nop(literal.clone())));
        }
        actions.sort();
        actions.dedup();

        let action_mutexes = mutex::action_mutexes(&actions, &prev.literal_mutexes);

        let literals: BTreeSet<Literal> = actions
            .iter()
            .flat_map(|a| a.effects().iter().cloned())
            .collect();
        let literal_mutexes = mutex::literal_mutexes(&literals, &actions, &action_mutexes);

        Self {
            state: KnowledgeState::from_literals(literals, Semantics::ExplicitDelete),
            actions,
            action_mutexes,
            literal_mutexes,
        }
    }

    pub(crate) fn state(&self) -> &KnowledgeState {
        &self.state
    }

    pub(crate) fn actions(&self) -> &[Rc<GroundedAction>] {
        &self.actions
    }

    pub(crate) fn action_mutex_count(&self) -> usize {
        self.action_mutexes.len()
    }

    pub(crate) fn literal_mutex_count(&self) -> usize {
        self.literal_mutexes.len()
    }

    pub(crate) fn actions_mutex(&self, a: &Rc<GroundedAction>, b: &Rc<GroundedAction>) -> bool {
        self.action_mutexes
            .contains(&Pair::new(a.clone(), b.clone()))
    }

    pub(crate) fn literals_mutex(&self, a: &Literal, b: &Literal) -> bool {
        self.literal_mutexes
            .contains(&Pair::new(a.clone(), b.clone()))
    }
}
