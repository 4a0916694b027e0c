use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use itertools::Itertools;
use logic::Literal;

use crate::GroundedAction;

/// An unordered pair kept in canonical order, so that a symmetric
/// relation needs a single entry per pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Pair<T: Ord>(T, T);

impl<T: Ord> Pair<T> {
    pub(crate) fn new(a: T, b: T) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

pub(crate) type ActionPair = Pair<Rc<GroundedAction>>;
pub(crate) type LiteralPair = Pair<Literal>;

/// Mutex relation over one action layer. Two actions exclude each other
/// when their effects conflict (inconsistent effects), one undoes what
/// the other requires (interference), or their preconditions were
/// mutually exclusive a level earlier (competing needs).
pub(crate) fn action_mutexes(
    actions: &[Rc<GroundedAction>],
    prev_literal_mutexes: &BTreeSet<LiteralPair>,
) -> BTreeSet<ActionPair> {
    let mut mutexes = BTreeSet::new();
    for (a, b) in actions.iter().tuple_combinations() {
        if a.undoes_effects_of(b)
            || a.interferes_with(b)
            || b.interferes_with(a)
            || competing_needs(a, b, prev_literal_mutexes)
        {
            mutexes.insert(Pair::new(a.clone(), b.clone()));
        }
    }
    mutexes
}

fn competing_needs(
    a: &GroundedAction,
    b: &GroundedAction,
    prev_literal_mutexes: &BTreeSet<LiteralPair>,
) -> bool {
    a.preconditions().iter().any(|p| {
        b.preconditions()
            .iter()
            .any(|q| p != q && prev_literal_mutexes.contains(&Pair::new(p.clone(), q.clone())))
    })
}

/// Mutex relation over one proposition layer. A literal and its
/// negation are always mutex; two distinct literals are mutex when no
/// non-mutex pair of actions produces them (inconsistent support). A
/// single action producing both counts as support.
pub(crate) fn literal_mutexes(
    literals: &BTreeSet<Literal>,
    actions: &[Rc<GroundedAction>],
    action_mutexes: &BTreeSet<ActionPair>,
) -> BTreeSet<LiteralPair> {
    let mut producers: BTreeMap<&Literal, Vec<&Rc<GroundedAction>>> = BTreeMap::new();
    for action in actions {
        for effect in action.effects() {
            producers.entry(effect).or_default().push(action);
        }
    }

    let mut mutexes = BTreeSet::new();
    for (l1, l2) in literals.iter().tuple_combinations() {
        if l1.complement() == *l2 {
            mutexes.insert(Pair::new(l1.clone(), l2.clone()));
            continue;
        }

        let empty = Vec::new();
        let p1 = producers.get(l1).unwrap_or(&empty);
        let p2 = producers.get(l2).unwrap_or(&empty);
        let supported = p1.iter().any(|a| {
            p2.iter().any(|b| {
                a == b || !action_mutexes.contains(&Pair::new((*a).clone(), (*b).clone()))
            })
        });
        if !supported {
            mutexes.insert(Pair::new(l1.clone(), l2.clone()));
        }
    }
    mutexes
}
