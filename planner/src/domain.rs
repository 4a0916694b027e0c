use std::collections::{BTreeMap, BTreeSet};

use logic::{Predicate, Proposition, TypeHierarchy, OBJECT_TYPE};

use crate::{ActionSchema, Error, KnowledgeState, Result};

/// A planning domain: the vocabulary of predicates and action schemas
/// over a type forest. Validation happens here, once; solvers can rely
/// on every name being unique and every schema well formed.
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    types: TypeHierarchy,
    predicates: BTreeMap<String, Predicate>,
    actions: BTreeMap<String, ActionSchema>,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        types: TypeHierarchy,
        predicates: Vec<Predicate>,
        actions: Vec<ActionSchema>,
    ) -> Result<Self> {
        let mut predicate_map = BTreeMap::new();
        for p in predicates {
            let key = p.name().to_string();
            if predicate_map.insert(key.clone(), p).is_some() {
                return Err(Error::DuplicateName {
                    kind: "predicate",
                    name: key,
                });
            }
        }

        let mut action_map = BTreeMap::new();
        for a in actions {
            let key = a.name().to_string();
            if action_map.insert(key.clone(), a).is_some() {
                return Err(Error::DuplicateName {
                    kind: "action",
                    name: key,
                });
            }
        }

        Ok(Self {
            name: name.into(),
            types,
            predicates: predicate_map,
            actions: action_map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    pub fn predicates(&self) -> &BTreeMap<String, Predicate> {
        &self.predicates
    }

    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn actions(&self) -> &BTreeMap<String, ActionSchema> {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&ActionSchema> {
        self.actions.get(name)
    }
}

/// A concrete planning task: typed objects, an initial closed-world
/// state, and a grounded goal formula over its domain.
#[derive(Debug, Clone)]
pub struct Problem {
    name: String,
    domain: Domain,
    objects_by_type: BTreeMap<String, BTreeSet<String>>,
    initial_state: KnowledgeState,
    goal: Proposition,
}

impl Problem {
    pub fn new(
        name: impl Into<String>,
        domain: Domain,
        objects: Vec<(String, Option<String>)>,
        initial_state: KnowledgeState,
        goal: Proposition,
    ) -> Result<Self> {
        if !goal.is_grounded() {
            return Err(Error::UngroundedGoal);
        }

        let mut objects_by_type: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for (object, declared_type) in objects {
            if !seen.insert(object.clone()) {
                return Err(Error::DuplicateName {
                    kind: "object",
                    name: object,
                });
            }
            let ty = declared_type.unwrap_or_else(|| OBJECT_TYPE.to_string());
            objects_by_type.entry(ty).or_default().insert(object);
        }

        Ok(Self {
            name: name.into(),
            domain,
            objects_by_type,
            initial_state,
            goal,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn initial_state(&self) -> &KnowledgeState {
        &self.initial_state
    }

    pub fn goal(&self) -> &Proposition {
        &self.goal
    }

    pub fn all_objects(&self) -> Vec<String> {
        self.objects_by_type
            .values()
            .flat_map(|objs| objs.iter().cloned())
            .collect()
    }

    /// Objects declared as `ty` or any of its subtypes. An untyped
    /// parameter (or the root type) accepts every object.
    pub fn objects_of_type(&self, ty: Option<&str>) -> Vec<String> {
        match ty {
            None => self.all_objects(),
            Some(t) if t == OBJECT_TYPE => self.all_objects(),
            Some(t) => {
                let mut result = Vec::new();
                for descendant in self.domain.types().descendants(t) {
                    if let Some(objs) = self.objects_by_type.get(&descendant) {
                        result.extend(objs.iter().cloned());
                    }
                }
                result
            }
        }
    }

    /// Whether the goal holds in `state`. The goal is validated as
    /// fully grounded at construction, so evaluation cannot fail.
    pub fn check_goal(&self, state: &KnowledgeState) -> bool {
        state
            .query(&self.goal)
            .expect("goal is grounded by construction")
    }
}
