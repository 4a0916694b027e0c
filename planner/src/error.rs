pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid logical structure")]
    Logic(#[from] logic::Error),
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },
    #[error("action {action}: {reason}")]
    InvalidSchema { action: String, reason: String },
    #[error("action {action} expects {expected} objects, got {actual}")]
    WrongObjectCount {
        action: String,
        expected: usize,
        actual: usize,
    },
    #[error("goal must be fully grounded")]
    UngroundedGoal,
    #[error("a conjunctive goal is required, found {0}")]
    NonConjunctiveGoal(String),
    #[error("PDDL parse error: {0}")]
    Parse(String),
    #[error("error reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("expanded {0} levels without finding a plan or proving none exists")]
    DepthExhausted(usize),
    #[error("search space exhausted without reaching the goal")]
    SearchExhausted,
}
