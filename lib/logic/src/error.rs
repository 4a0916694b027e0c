pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("predicate {predicate} expects {expected} objects, got {actual}")]
    ArityMismatch {
        predicate: String,
        expected: usize,
        actual: usize,
    },
    #[error("no binding for variable ?{variable} of {predicate}")]
    UnboundVariable {
        predicate: String,
        variable: String,
    },
    #[error("proposition is not fully grounded: {0}")]
    Ungrounded(String),
    #[error("expected a conjunction of literals, found {0}")]
    NotConjunctive(String),
    #[error("type {0} would become its own ancestor")]
    CyclicType(String),
    #[error("malformed predicate declaration: {0}")]
    Malformed(String),
}
