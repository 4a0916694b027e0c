use std::fmt::Display;

use crate::{Error, Predicate, Result};

/// A grounded atom or its negation. The canonical key is the predicate
/// name plus the ordered object list, so literals hash and compare
/// independently of any variable naming used to produce them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    name: String,
    objects: Vec<String>,
    negated: bool,
}

impl Literal {
    pub fn new<S: Into<String>>(name: impl Into<String>, objects: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            objects: objects.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn from_predicate(predicate: &Predicate, negated: bool) -> Result<Self> {
        let objects = predicate
            .objects()
            .ok_or_else(|| Error::Ungrounded(predicate.to_string()))?;
        Ok(Self {
            name: predicate.name().to_string(),
            objects,
            negated,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The same atom with the opposite polarity.
    pub fn complement(&self) -> Self {
        Self {
            negated: !self.negated,
            ..self.clone()
        }
    }

    /// The positive form of this literal's atom.
    pub fn atom(&self) -> Self {
        Self {
            negated: false,
            ..self.clone()
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "not ")?;
        }
        write!(f, "{}({})", self.name, self.objects.join(", "))
    }
}
