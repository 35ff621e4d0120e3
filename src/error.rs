use thiserror::Error;

use crate::parser::Span;

/// Where in the token stream an evaluation failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Index of the failing source token, counted before macro expansion.
    /// Equals the source token count for failures detected at end of input.
    pub index: usize,
    pub span: Span,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "token {} ({})", self.index, self.span)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {position}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub position: Position,
}

impl EvalError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("scope brackets do not balance")]
    ScopeUnderflow,
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),
    #[error("operator failed: {0}")]
    OperatorFailure(OperatorError),
    #[error("stack holds more than {limit} words")]
    StackOverflow { limit: usize },
    #[error("scopes nested deeper than {limit}")]
    ScopeOverflow { limit: usize },
    #[error("greedy repetition did not terminate within {limit} applications")]
    IterationOverflow { limit: usize },
}

impl From<OperatorError> for ErrorKind {
    fn from(err: OperatorError) -> Self {
        match err {
            OperatorError::Unresolved(name) => Self::UnresolvedReference(name),
            other => Self::OperatorFailure(other),
        }
    }
}

/// Failure of a single operator application.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    #[error("needs {needed} operands, stack holds {available}")]
    Underflow { needed: usize, available: usize },
    #[error("unresolved reference `{0}`")]
    Unresolved(String),
    #[error("declared {expected} results, produced {produced}")]
    ResultArity { expected: usize, produced: usize },
    #[error("{0}")]
    Failed(String),
}

impl OperatorError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
