use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::{Error, Literal, Predicate, Result};

/// Formula tree over predicates. The variants are closed on purpose:
/// every consumer matches exhaustively, so a new connective cannot be
/// added without visiting each evaluation site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proposition {
    Pred(Predicate),
    Not(Box<Proposition>),
    And(Vec<Proposition>),
    Or(Vec<Proposition>),
}

impl Proposition {
    pub fn and(props: Vec<Proposition>) -> Self {
        Self::And(props)
    }

    pub fn or(props: Vec<Proposition>) -> Self {
        Self::Or(props)
    }

    pub fn not(prop: Proposition) -> Self {
        Self::Not(Box::new(prop))
    }

    pub fn is_grounded(&self) -> bool {
        match self {
            Self::Pred(p) => p.is_grounded(),
            Self::Not(inner) => inner.is_grounded(),
            Self::And(props) | Self::Or(props) => props.iter().all(Self::is_grounded),
        }
    }

    /// Substitutes objects for variables throughout the tree. Every
    /// variable must be covered by the mapping or already bound.
    pub fn ground_map(&self, bindings: &BTreeMap<String, String>) -> Result<Self> {
        match self {
            Self::Pred(p) => {
                let grounded = p.ground_map(bindings);
                let missing = grounded
                    .unbound_variables()
                    .into_iter()
                    .next()
                    .map(str::to_string);
                match missing {
                    Some(variable) => Err(Error::UnboundVariable {
                        predicate: p.name().to_string(),
                        variable,
                    }),
                    None => Ok(Self::Pred(grounded)),
                }
            }
            Self::Not(inner) => Ok(Self::not(inner.ground_map(bindings)?)),
            Self::And(props) => Ok(Self::And(
                props
                    .iter()
                    .map(|p| p.ground_map(bindings))
                    .collect::<Result<_>>()?,
            )),
            Self::Or(props) => Ok(Self::Or(
                props
                    .iter()
                    .map(|p| p.ground_map(bindings))
                    .collect::<Result<_>>()?,
            )),
        }
    }

    /// All variables that still need a binding somewhere in the tree.
    pub fn unbound_variables(&self) -> BTreeSet<String> {
        match self {
            Self::Pred(p) => p
                .unbound_variables()
                .into_iter()
                .map(str::to_string)
                .collect(),
            Self::Not(inner) => inner.unbound_variables(),
            Self::And(props) | Self::Or(props) => {
                props.iter().flat_map(Self::unbound_variables).collect()
            }
        }
    }

    /// Flattens a grounded conjunction of literals (or a single literal)
    /// into a literal set. Disjunctions and negations of non-atoms do
    /// not fit the conjunctive model and are rejected.
    pub fn flatten_literals(&self) -> Result<BTreeSet<Literal>> {
        match self {
            Self::And(props) => props
                .iter()
                .map(Self::as_literal)
                .collect::<Result<BTreeSet<_>>>(),
            other => Ok(BTreeSet::from([other.as_literal()?])),
        }
    }

    fn as_literal(&self) -> Result<Literal> {
        match self {
            Self::Pred(p) => Literal::from_predicate(p, false),
            Self::Not(inner) => match inner.as_ref() {
                Self::Pred(p) => Literal::from_predicate(p, true),
                other => Err(Error::NotConjunctive(other.to_string())),
            },
            other => Err(Error::NotConjunctive(other.to_string())),
        }
    }
}

impl From<Predicate> for Proposition {
    fn from(p: Predicate) -> Self {
        Self::Pred(p)
    }
}

impl Display for Proposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pred(p) => write!(f, "{p}"),
            Self::Not(inner) => write!(f, "(not {inner})"),
            Self::And(props) => {
                write!(f, "(and")?;
                for p in props {
                    write!(f, " {p}")?;
                }
                write!(f, ")")
            }
            Self::Or(props) => {
                write!(f, "(or")?;
                for p in props {
                    write!(f, " {p}")?;
                }
                write!(f, ")")
            }
        }
    }
}
