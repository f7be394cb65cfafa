use matbridge_view::StridedError;

use crate::kind::ElementKind;

/// Coarse classification of a [`MarshalError`].
///
/// Callers use this to tell "my command was malformed" apart from "the
/// marshaling layer rejected my types" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong argument shape or type at the call boundary.
    Argument,
    /// The marshaling logic could not represent the value.
    Conversion,
    /// The engine refused an allocation, fetch, assignment or lifecycle call.
    EngineResource,
    /// The engine ran the command but reported a runtime error.
    EngineEvaluation,
    /// A required subsystem is unavailable.
    Environment,
}

/// Errors raised by converters and sessions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    #[error("only arrays with up to 2 dimensions are supported (not {rank}D)")]
    UnsupportedRank { rank: usize },

    #[error("element kind `{kind}` is not numeric and cannot be converted")]
    UnsupportedElementKind { kind: ElementKind },

    #[error("non-numeric element ({found}) at flat position {position} of sequence")]
    NonNumericElement {
        position: usize,
        found: &'static str,
    },

    #[error("ragged sequence at depth {depth}: expected length {expected}, found {found}")]
    RaggedSequence {
        depth: usize,
        expected: usize,
        found: usize,
    },

    #[error("inconsistent nesting at depth {depth}: lists and numbers are mixed")]
    InconsistentNesting { depth: usize },

    #[error("text is converted to a char array, not to a numeric matrix")]
    TextInput,

    #[error(transparent)]
    InvalidLayout(#[from] StridedError),

    #[error("plane length mismatch: expected {expected} values, found {found}")]
    PlaneLengthMismatch { expected: usize, found: usize },

    #[error("invalid variable name {name:?}: {reason}")]
    InvalidVariableName { name: String, reason: &'static str },

    #[error("variable `{name}` has unsupported engine class `{class}` (only char and double)")]
    UnsupportedVariableKind { name: String, class: String },

    #[error("only single-row strings are supported (found {rows} rows)")]
    MultiRowText { rows: usize },

    #[error("unable to allocate a {rows}x{cols} matrix")]
    AllocationFailed { rows: usize, cols: usize },

    #[error("unable to start engine: {0}")]
    SessionStart(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("unable to close session: {0}")]
    CloseRefused(String),

    #[error("unable to evaluate string in engine workspace: {0}")]
    EvalRefused(String),

    #[error("unable to get variable `{name}` from engine workspace: {reason}")]
    GetRefused { name: String, reason: String },

    #[error("unable to put variable `{name}` into engine workspace: {reason}")]
    PutRefused { name: String, reason: String },

    #[error("{message}")]
    Evaluation { message: String },

    #[error("environment unavailable: {0}")]
    Environment(String),
}

impl MarshalError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use MarshalError::*;
        match self {
            UnsupportedElementKind { .. }
            | TextInput
            | InvalidLayout(_)
            | PlaneLengthMismatch { .. }
            | InvalidVariableName { .. }
            | UnsupportedVariableKind { .. }
            | SessionClosed => ErrorKind::Argument,
            UnsupportedRank { .. }
            | NonNumericElement { .. }
            | RaggedSequence { .. }
            | InconsistentNesting { .. }
            | MultiRowText { .. } => ErrorKind::Conversion,
            AllocationFailed { .. }
            | SessionStart(_)
            | CloseRefused(_)
            | EvalRefused(_)
            | GetRefused { .. }
            | PutRefused { .. } => ErrorKind::EngineResource,
            Evaluation { .. } => ErrorKind::EngineEvaluation,
            Environment(_) => ErrorKind::Environment,
        }
    }
}

/// Convenience alias for `Result<T, MarshalError>`.
pub type Result<T> = std::result::Result<T, MarshalError>;
