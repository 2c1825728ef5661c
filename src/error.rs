use std::fmt;

use crate::opcode::Opcode;

/// Errors that can occur while validating or running a program.
///
/// Positions (`ip`) are indices into the filtered [`Program`](crate::Program),
/// not into the raw source text.
#[derive(Debug, thiserror::Error)]
pub enum BrainfuckError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBrackets { ip: usize, kind: UnmatchedBracketKind },

    /// The data pointer attempted to move left of cell 0 or beyond the last cell.
    #[error("Pointer out of bounds at instruction {ip} (ptr={ptr}, op='{op}')")]
    PointerOutOfBounds { ip: usize, ptr: usize, op: Opcode },

    /// `,` ran with no input left while configured to fail on exhaustion.
    #[error("Input exhausted at instruction {ip}")]
    InputExhausted { ip: usize },

    /// The input stream or output sink failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io { ip: usize, #[source] source: std::io::Error },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout).
    #[error("Execution aborted: cancelled")]
    Canceled,

    /// The run configuration cannot describe a working machine.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl BrainfuckError {
    /// Instruction position the error refers to, if it has one.
    pub fn ip(&self) -> Option<usize> {
        match self {
            BrainfuckError::UnmatchedBrackets { ip, .. }
            | BrainfuckError::PointerOutOfBounds { ip, .. }
            | BrainfuckError::InputExhausted { ip }
            | BrainfuckError::Io { ip, .. } => Some(*ip),
            BrainfuckError::StepLimitExceeded { .. }
            | BrainfuckError::Canceled
            | BrainfuckError::Config(_) => None,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Errors raised while reading run configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown EOF policy '{0}' (expected sentinel, zero or error)")]
    InvalidEofPolicy(String),

    #[error("invalid value for {key}: '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("memory size must be at least one cell")]
    ZeroMemory,
}
