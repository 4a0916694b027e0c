use std::collections::BTreeSet;
use std::fmt::Display;

use logic::{Literal, Proposition};

use crate::Result;

/// How negation is interpreted when teaching and querying facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Semantics {
    /// Only positive literals are stored; a fact is false exactly when
    /// it is absent, and teaching a negation deletes the fact.
    #[default]
    ClosedWorld,
    /// Positive and negative literals are stored side by side and
    /// queried by direct membership. Planning-graph layers use this to
    /// track facts whose truth value is contested at a given depth.
    ExplicitDelete,
}

/// An immutable set of known facts. All derivation is functional:
/// `teach` returns a new state and never mutates the receiver, so
/// states can be interned by value in search visited-sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KnowledgeState {
    facts: BTreeSet<Literal>,
    semantics: Semantics,
}

impl KnowledgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semantics(semantics: Semantics) -> Self {
        Self {
            facts: BTreeSet::new(),
            semantics,
        }
    }

    /// Builds a state from raw literals. Closed-world states apply the
    /// teaching rules (negations delete), so no negative literal can
    /// ever be stored in them.
    pub fn from_literals(literals: impl IntoIterator<Item = Literal>, semantics: Semantics) -> Self {
        Self::with_semantics(semantics).teach_all(literals)
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Incorporates one literal, returning the resulting state.
    pub fn teach(&self, literal: Literal) -> Self {
        let mut facts = self.facts.clone();
        match self.semantics {
            Semantics::ClosedWorld => {
                if literal.is_negated() {
                    facts.remove(&literal.complement());
                } else {
                    facts.insert(literal);
                }
            }
            Semantics::ExplicitDelete => {
                facts.insert(literal);
            }
        }
        Self {
            facts,
            semantics: self.semantics,
        }
    }

    pub fn teach_all(&self, literals: impl IntoIterator<Item = Literal>) -> Self {
        literals
            .into_iter()
            .fold(self.clone(), |state, l| state.teach(l))
    }

    /// Whether a single literal holds in this state.
    pub fn holds(&self, literal: &Literal) -> bool {
        match self.semantics {
            Semantics::ClosedWorld => {
                if literal.is_negated() {
                    !self.facts.contains(&literal.complement())
                } else {
                    self.facts.contains(literal)
                }
            }
            Semantics::ExplicitDelete => self.facts.contains(literal),
        }
    }

    /// Evaluates a grounded formula. Querying an ungrounded formula is
    /// a caller error and is reported, never silently evaluated.
    pub fn query(&self, prop: &Proposition) -> Result<bool> {
        match prop {
            Proposition::Pred(p) => {
                let literal = p.to_literal()?;
                Ok(self.holds(&literal))
            }
            Proposition::Not(inner) => match inner.as_ref() {
                Proposition::Pred(p) => {
                    let literal = logic::Literal::from_predicate(p, true)?;
                    Ok(self.holds(&literal))
                }
                other => Ok(!self.query(other)?),
            },
            Proposition::And(props) => {
                for p in props {
                    if !self.query(p)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Proposition::Or(props) => {
                for p in props {
                    if self.query(p)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// The same facts under explicit-delete semantics. Negative
    /// literals cannot exist in a closed-world state, so this is a
    /// plain re-tagging of the set.
    pub fn to_explicit(&self) -> Self {
        Self {
            facts: self.facts.clone(),
            semantics: Semantics::ExplicitDelete,
        }
    }
}

impl Display for KnowledgeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, l) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, "}}")
    }
}
