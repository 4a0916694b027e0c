use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::hash::{Hash, Hasher};

use crate::{Error, Literal, Result};

/// A relation template: a name plus typed variables, carrying a partial
/// assignment of variables to objects. Fully assigned predicates are the
/// atoms of the planning state.
///
/// Equality and hashing ignore variable names: two templates with the
/// same name and arity are interchangeable, and bound objects compare by
/// value per position.
#[derive(Debug, Clone)]
pub struct Predicate {
    name: String,
    variables: Vec<String>,
    types: Vec<Option<String>>,
    grounding: BTreeMap<String, String>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, variables: Vec<(String, Option<String>)>) -> Self {
        let mut names = Vec::with_capacity(variables.len());
        let mut types = Vec::with_capacity(variables.len());
        for (v, t) in variables {
            names.push(v);
            types.push(t);
        }

        Self {
            name: name.into(),
            variables: names,
            types,
            grounding: BTreeMap::new(),
        }
    }

    /// Parses a PDDL-style declaration like `"at-ball ?x - ball ?y - room"`.
    /// Types are optional per variable.
    pub fn parse(s: &str) -> Result<Self> {
        let mut segments = s.split('?');
        let name = segments
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::Malformed(s.to_string()))?;

        let mut variables = Vec::new();
        for segment in segments {
            let compact: String = segment.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                continue;
            }
            let mut parts = compact.splitn(2, '-');
            let var = parts.next().unwrap_or_default();
            if var.is_empty() {
                return Err(Error::Malformed(s.to_string()));
            }
            let ty = parts.next().filter(|t| !t.is_empty()).map(str::to_string);
            variables.push((var.to_string(), ty));
        }
        if variables.is_empty() {
            return Err(Error::Malformed(s.to_string()));
        }

        Ok(Self::new(name, variables))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn types(&self) -> &[Option<String>] {
        &self.types
    }

    /// Variables that have no object bound yet.
    pub fn unbound_variables(&self) -> BTreeSet<&str> {
        self.variables
            .iter()
            .filter(|v| !self.grounding.contains_key(*v))
            .map(String::as_str)
            .collect()
    }

    pub fn is_grounded(&self) -> bool {
        self.variables.iter().all(|v| self.grounding.contains_key(v))
    }

    /// Binds objects positionally, returning a new predicate. Fewer
    /// objects than variables leaves the remainder unbound; more is an
    /// arity error.
    pub fn ground<S: Into<String>>(&self, objects: impl IntoIterator<Item = S>) -> Result<Self> {
        let objects: Vec<String> = objects.into_iter().map(Into::into).collect();
        if objects.len() > self.variables.len() {
            return Err(Error::ArityMismatch {
                predicate: self.name.clone(),
                expected: self.variables.len(),
                actual: objects.len(),
            });
        }

        let mut grounded = self.clone();
        for (var, obj) in self.variables.iter().zip(objects) {
            grounded.grounding.insert(var.clone(), obj);
        }
        Ok(grounded)
    }

    /// Binds by variable name; bindings for unknown variables are ignored.
    pub fn ground_map(&self, bindings: &BTreeMap<String, String>) -> Self {
        let mut grounded = self.clone();
        for (var, obj) in bindings {
            if self.variables.contains(var) {
                grounded.grounding.insert(var.clone(), obj.clone());
            }
        }
        grounded
    }

    /// Pre-sets a binding for one variable. Used when a formula names a
    /// concrete object in place of a variable.
    pub fn with_binding(mut self, variable: &str, object: impl Into<String>) -> Self {
        if self.variables.iter().any(|v| v == variable) {
            self.grounding.insert(variable.to_string(), object.into());
        }
        self
    }

    pub fn unground(&self) -> Self {
        let mut p = self.clone();
        p.grounding.clear();
        p
    }

    pub fn object_for(&self, variable: &str) -> Option<&str> {
        self.grounding.get(variable).map(String::as_str)
    }

    /// Bound objects in variable order; `None` unless fully grounded.
    pub fn objects(&self) -> Option<Vec<String>> {
        self.variables
            .iter()
            .map(|v| self.grounding.get(v).cloned())
            .collect()
    }

    pub fn to_literal(&self) -> Result<Literal> {
        Literal::from_predicate(self, false)
    }

    /// Canonical form used for equality and hashing: the name followed,
    /// per position, by the bound object or a positional placeholder.
    /// Variable names never leak into this form.
    fn canonical(&self) -> String {
        let mut s = self.name.clone();
        for (i, v) in self.variables.iter().enumerate() {
            s.push(' ');
            match self.grounding.get(v) {
                Some(obj) => s.push_str(obj),
                None => {
                    s.push_str("?x");
                    s.push_str(&i.to_string());
                }
            }
        }
        s
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for v in &self.variables {
            match self.grounding.get(v) {
                Some(obj) => write!(f, " {obj}")?,
                None => write!(f, " ?{v}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untyped(name: &str, vars: &[&str]) -> Predicate {
        Predicate::new(
            name,
            vars.iter().map(|v| (v.to_string(), None)).collect(),
        )
    }

    #[test]
    fn equality_ignores_variable_names() {
        let a = untyped("at", &["x", "y"]);
        let b = untyped("at", &["from", "to"]);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_distinguishes_bound_objects() {
        let p = untyped("at", &["x"]);
        let a = p.ground(["rooma"]).unwrap();
        let b = p.ground(["roomb"]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, p);
    }

    #[test]
    fn grounding_is_idempotent() {
        let p = untyped("at", &["x", "y"]);
        let once = p.ground(["ball1", "rooma"]).unwrap();
        let twice = once.ground(["ball1", "rooma"]).unwrap();
        assert_eq!(once, twice);
        assert!(once.is_grounded());
    }

    #[test]
    fn grounding_never_mutates_the_receiver() {
        let p = untyped("at", &["x"]);
        let _ = p.ground(["rooma"]).unwrap();
        assert!(!p.is_grounded());
    }

    #[test]
    fn too_many_objects_is_an_arity_error() {
        let p = untyped("at", &["x"]);
        assert!(matches!(
            p.ground(["a", "b"]),
            Err(Error::ArityMismatch { .. })
        ));
    }

    #[test]
    fn parses_typed_declaration() {
        let p = Predicate::parse("at-ball ?x - ball ?y - room").unwrap();
        assert_eq!(p.name(), "at-ball");
        assert_eq!(p.arity(), 2);
        assert_eq!(p.types()[0].as_deref(), Some("ball"));
        assert_eq!(p.types()[1].as_deref(), Some("room"));
    }

    #[test]
    fn parses_untyped_declaration() {
        let p = Predicate::parse("free ?g").unwrap();
        assert_eq!(p.name(), "free");
        assert_eq!(p.types()[0], None);
    }

    #[test]
    fn rejects_declaration_without_variables() {
        assert!(Predicate::parse("free").is_err());
    }
}
