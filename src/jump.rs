//! Bracket validation and the precomputed loop jump table.

use tracing::debug;

use crate::error::{BrainfuckError, UnmatchedBracketKind};
use crate::opcode::Opcode;
use crate::program::Program;

/// Matching loop positions for one specific [`Program`].
///
/// `targets[i]` holds the matching position for a `[` or `]` at `i`. Every
/// other position maps to itself, so lookups never fail; they are only
/// meaningful for loop instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    targets: Vec<usize>,
}

impl JumpTable {
    /// Validate loop nesting in `program` and pair every `[` with its `]`.
    ///
    /// An unmatched `]` is reported at its own position; an unmatched `[` is
    /// reported at the earliest one left open.
    pub fn resolve(program: &Program) -> Result<Self, BrainfuckError> {
        let mut targets: Vec<usize> = (0..program.len()).collect();
        let mut stack: Vec<usize> = Vec::new();

        for (i, op) in program.ops().iter().enumerate() {
            match op {
                Opcode::LoopOpen => stack.push(i),
                Opcode::LoopClose => {
                    let Some(open_index) = stack.pop() else {
                        return Err(BrainfuckError::UnmatchedBrackets {
                            ip: i,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    targets[open_index] = i;
                    targets[i] = open_index;
                }
                _ => {}
            }
        }

        if let Some(&unmatched_open) = stack.first() {
            return Err(BrainfuckError::UnmatchedBrackets {
                ip: unmatched_open,
                kind: UnmatchedBracketKind::Open,
            });
        }

        debug!(instructions = program.len(), "loop brackets resolved");
        Ok(Self { targets })
    }

    /// Position of the `]` matching the `[` at `open`.
    pub fn close_for(&self, open: usize) -> usize {
        self.targets[open]
    }

    /// Position of the `[` matching the `]` at `close`.
    pub fn open_for(&self, close: usize) -> usize {
        self.targets[close]
    }
}
