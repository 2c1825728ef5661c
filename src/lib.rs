//! A tiny Brainfuck tape-machine interpreter library.
//!
//! Source text is filtered down to the eight instructions `><+-.,[]`
//! (everything else is a comment), loop brackets are validated and paired
//! once up front, and the program then runs on a 30,000-cell byte tape.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0; cells wrap modulo 256.
//! - Strict pointer bounds: moving left from cell 0 or right past the end
//!   returns an error.
//! - Unmatched `[` or `]` is reported before any instruction runs.
//! - Input `,` reads one byte from any [`std::io::Read`]; what happens at
//!   end of input is chosen by [`EofPolicy`] (255 by default).
//! - Output `.` appends the current cell to the returned bytes.
//!
//! Quick start:
//!
//! ```
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let output = bf_tape::run(code, std::io::empty()).expect("program should run");
//! assert_eq!(output, b"Hello World!\n");
//! ```

use std::io::Read;

pub mod cli_util;
pub mod config;
pub mod error;
pub mod jump;
pub mod machine;
pub mod opcode;
pub mod program;
pub mod reader;

pub use config::{EofPolicy, RunConfig};
pub use error::{BrainfuckError, ConfigError, UnmatchedBracketKind};
pub use jump::JumpTable;
pub use machine::{Machine, Step};
pub use opcode::Opcode;
pub use program::Program;
pub use reader::{BrainfuckReader, StepControl};

/// Validate and run `source` with the default configuration, feeding `,`
/// from `input`, and return everything the program printed.
///
/// A byte slice works as a finite input buffer; any reader works as a stream.
pub fn run<R: Read>(source: &str, input: R) -> Result<Vec<u8>, BrainfuckError> {
    BrainfuckReader::new(source)?.run(input)
}

/// Like [`run`], with an explicit tape size, EOF policy and step budget.
pub fn run_with_config<R: Read>(
    source: &str,
    input: R,
    config: RunConfig,
) -> Result<Vec<u8>, BrainfuckError> {
    BrainfuckReader::with_config(source, config)?.run(input)
}
