use std::collections::BTreeMap;

use crate::{Error, Result};

/// The distinguished root type every object belongs to.
pub const OBJECT_TYPE: &str = "object";

/// Forest of object types. Each type has at most one supertype;
/// `descendants` answers the "T or any subtype of T" queries used when
/// matching objects against typed parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHierarchy {
    parent: BTreeMap<String, Option<String>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. A supertype that was never declared itself is
    /// created on the fly as a root, matching how PDDL type lists may
    /// reference a parent before (or without) declaring it.
    pub fn add_type(&mut self, name: impl Into<String>, supertype: Option<&str>) -> Result<()> {
        let name = name.into();
        if let Some(sup) = supertype {
            if self.ancestors(sup).any(|a| a == name) {
                return Err(Error::CyclicType(name));
            }
            if !self.parent.contains_key(sup) {
                self.parent.insert(sup.to_string(), None);
            }
        }
        self.parent
            .insert(name, supertype.map(str::to_string));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parent.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// All types reachable downward from `name`, including `name`
    /// itself. An undeclared type has no subtypes.
    pub fn descendants(&self, name: &str) -> Vec<String> {
        let mut found = vec![name.to_string()];
        let mut i = 0;
        while i < found.len() {
            let current = found[i].clone();
            for (child, parent) in &self.parent {
                if parent.as_deref() == Some(current.as_str()) {
                    found.push(child.clone());
                }
            }
            i += 1;
        }
        found
    }

    fn ancestors<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        std::iter::successors(Some(name), move |current| {
            self.parent.get(*current).and_then(|p| p.as_deref())
        })
    }
}
