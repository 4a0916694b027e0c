mod action;
mod domain;
mod error;
mod grounding;
mod state;

pub mod pddl;
pub mod solvers;

pub use logic::{Literal, Predicate, Proposition, TypeHierarchy};

pub use action::{ActionSchema, GroundedAction};
pub use domain::{Domain, Problem};
pub use error::{Error, Result};
pub use grounding::{ground_all_actions, ground_all_predicates};
pub use state::{KnowledgeState, Semantics};
