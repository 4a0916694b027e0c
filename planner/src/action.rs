use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use logic::{Literal, Predicate, Proposition};

use crate::{Error, KnowledgeState, Result};

const NOOP_NAME: &str = "noop";

/// A precondition or effect atom still referring to schema parameters.
#[derive(Debug, Clone)]
struct LiteralTemplate {
    predicate: Predicate,
    negated: bool,
}

impl LiteralTemplate {
    fn ground(&self, bindings: &BTreeMap<String, String>) -> Result<Literal> {
        let grounded = self.predicate.ground_map(bindings);
        Ok(Literal::from_predicate(&grounded, self.negated)?)
    }
}

/// A parameterized action template. Preconditions and effects are
/// validated and flattened to literal conjunctions at construction, so
/// a schema that reaches the solvers is always well formed.
#[derive(Debug, Clone)]
pub struct ActionSchema {
    name: String,
    parameters: Vec<String>,
    parameter_types: Vec<Option<String>>,
    preconditions: Vec<LiteralTemplate>,
    effects: Vec<LiteralTemplate>,
}

impl ActionSchema {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<(String, Option<String>)>,
        precondition: Option<Proposition>,
        effect: Option<Proposition>,
    ) -> Result<Self> {
        let name = name.into();
        let mut param_names = Vec::with_capacity(parameters.len());
        let mut param_types = Vec::with_capacity(parameters.len());
        for (p, t) in parameters {
            if param_names.contains(&p) {
                return Err(Error::InvalidSchema {
                    action: name,
                    reason: format!("duplicate parameter ?{p}"),
                });
            }
            param_names.push(p);
            param_types.push(t);
        }

        let preconditions = match &precondition {
            Some(prop) => flatten_templates(&name, prop)?,
            None => Vec::new(),
        };
        let effects = match &effect {
            Some(prop) => flatten_templates(&name, prop)?,
            None => Vec::new(),
        };

        let schema = Self {
            name,
            parameters: param_names,
            parameter_types: param_types,
            preconditions,
            effects,
        };
        schema.check_variables_covered()?;
        Ok(schema)
    }

    /// Every variable used by a precondition or effect must be one of
    /// the declared parameters.
    fn check_variables_covered(&self) -> Result<()> {
        for template in self.preconditions.iter().chain(&self.effects) {
            for var in template.predicate.unbound_variables() {
                if !self.parameters.iter().any(|p| p == var) {
                    return Err(Error::InvalidSchema {
                        action: self.name.clone(),
                        reason: format!("variable ?{var} is not a parameter"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter_types(&self) -> &[Option<String>] {
        &self.parameter_types
    }

    fn binding(&self, objects: &[String]) -> Result<BTreeMap<String, String>> {
        if objects.len() != self.parameters.len() {
            return Err(Error::WrongObjectCount {
                action: self.name.clone(),
                expected: self.parameters.len(),
                actual: objects.len(),
            });
        }
        Ok(self
            .parameters
            .iter()
            .cloned()
            .zip(objects.iter().cloned())
            .collect())
    }

    pub fn check_preconditions(&self, state: &KnowledgeState, objects: &[String]) -> Result<bool> {
        let bindings = self.binding(objects)?;
        for template in &self.preconditions {
            if !state.holds(&template.ground(&bindings)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn apply_effects(&self, state: &KnowledgeState, objects: &[String]) -> Result<KnowledgeState> {
        let bindings = self.binding(objects)?;
        let effects = self
            .effects
            .iter()
            .map(|t| t.ground(&bindings))
            .collect::<Result<Vec<_>>>()?;
        Ok(state.teach_all(effects))
    }

    /// Applies the action if its preconditions hold: `Ok(None)` means
    /// the action is not applicable in `state`.
    pub fn take_action(
        &self,
        state: &KnowledgeState,
        objects: &[String],
    ) -> Result<Option<KnowledgeState>> {
        if self.check_preconditions(state, objects)? {
            Ok(Some(self.apply_effects(state, objects)?))
        } else {
            Ok(None)
        }
    }

    /// Binds the schema to a concrete object tuple, precomputing the
    /// grounded precondition and effect literal sets.
    pub fn ground(&self, objects: Vec<String>) -> Result<GroundedAction> {
        let bindings = self.binding(&objects)?;
        let preconditions = self
            .preconditions
            .iter()
            .map(|t| t.ground(&bindings))
            .collect::<Result<BTreeSet<_>>>()?;
        let effects = self
            .effects
            .iter()
            .map(|t| t.ground(&bindings))
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(GroundedAction {
            name: self.name.clone(),
            objects,
            preconditions,
            effects,
            nop: false,
        })
    }
}

fn flatten_templates(action: &str, prop: &Proposition) -> Result<Vec<LiteralTemplate>> {
    let atoms: Vec<&Proposition> = match prop {
        Proposition::And(props) => props.iter().collect(),
        other => vec![other],
    };

    let mut templates = Vec::with_capacity(atoms.len());
    for atom in atoms {
        let template = match atom {
            Proposition::Pred(p) => LiteralTemplate {
                predicate: p.clone(),
                negated: false,
            },
            Proposition::Not(inner) => match inner.as_ref() {
                Proposition::Pred(p) => LiteralTemplate {
                    predicate: p.clone(),
                    negated: true,
                },
                other => {
                    return Err(Error::InvalidSchema {
                        action: action.to_string(),
                        reason: format!("negation of a non-atom: {other}"),
                    })
                }
            },
            other => {
                return Err(Error::InvalidSchema {
                    action: action.to_string(),
                    reason: format!("only conjunctions of literals are supported, found {other}"),
                })
            }
        };
        templates.push(template);
    }
    Ok(templates)
}

/// A schema bound to concrete objects, or a persistence no-op. Identity
/// is the schema name plus the object tuple; the display form
/// `Name(obj1, obj2)` is stable and relied on for plan comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroundedAction {
    name: String,
    objects: Vec<String>,
    preconditions: BTreeSet<Literal>,
    effects: BTreeSet<Literal>,
    nop: bool,
}

impl GroundedAction {
    /// The persistence action for one literal: it requires the literal
    /// and re-asserts it, carrying the fact unchanged across a level.
    pub fn nop(literal: Literal) -> Self {
        Self {
            name: NOOP_NAME.to_string(),
            objects: literal.objects().to_vec(),
            preconditions: BTreeSet::from([literal.clone()]),
            effects: BTreeSet::from([literal]),
            nop: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    pub fn preconditions(&self) -> &BTreeSet<Literal> {
        &self.preconditions
    }

    pub fn effects(&self) -> &BTreeSet<Literal> {
        &self.effects
    }

    pub fn is_nop(&self) -> bool {
        self.nop
    }

    /// Whether any effect of `self` is the direct negation of an
    /// effect of `other`.
    pub fn undoes_effects_of(&self, other: &Self) -> bool {
        self.effects
            .iter()
            .any(|e| other.effects.contains(&e.complement()))
    }

    /// Whether any effect of `self` negates a precondition of `other`.
    pub fn interferes_with(&self, other: &Self) -> bool {
        self.effects
            .iter()
            .any(|e| other.preconditions.contains(&e.complement()))
    }
}

impl Display for GroundedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nop {
            // A no-op carries exactly one literal.
            let carried = self.effects.iter().next();
            return match carried {
                Some(l) => write!(f, "{NOOP_NAME}[{l}]"),
                None => write!(f, "{NOOP_NAME}[]"),
            };
        }
        write!(f, "{}({})", self.name, self.objects.join(", "))
    }
}
