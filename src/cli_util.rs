use std::io::{self, Write};

use tracing_subscriber::{EnvFilter, fmt};

use crate::{BrainfuckError, Program};

// Show a short window around the position for context
const WINDOW_CHARS: usize = 32;

/// Initialize logging to stderr.
///
/// Use the `RUST_LOG` environment variable to override the default `warn`
/// filter, e.g. `RUST_LOG=bf_tape=debug`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Pretty-print a structured [`BrainfuckError`] with caret positioning.
/// If `program_name` is `Some("bf")`, prefix messages with "bf: ..." for CLI read mode
pub fn print_reader_error(program_name: Option<&str>, code: &str, program: &Program, err: &BrainfuckError) {
    eprint!("{}", render_reader_error(program_name, code, program, err));
    let _ = io::stderr().flush();
}

/// Build the diagnostic printed by [`print_reader_error`].
///
/// Instruction positions are mapped back to character offsets in `code`
/// through `program`, so the caret lands on the offending source character
/// even when the source is full of comments.
pub fn render_reader_error(program_name: Option<&str>, code: &str, program: &Program, err: &BrainfuckError) -> String {
    let msg = match err {
        BrainfuckError::PointerOutOfBounds { ptr, op, .. } => {
            format!("Runtime error: pointer out of bounds (ptr={ptr}, op={op})")
        }
        BrainfuckError::UnmatchedBrackets { kind, .. } => {
            format!("Parse error: unmatched bracket {kind}")
        }
        BrainfuckError::InputExhausted { .. } => "Runtime error: input exhausted".to_string(),
        BrainfuckError::Io { source, .. } => format!("I/O error: {source}"),
        BrainfuckError::StepLimitExceeded { .. }
        | BrainfuckError::Canceled
        | BrainfuckError::Config(_) => err.to_string(),
    };
    let msg = match program_name {
        Some(p) => format!("{p}: {msg}"),
        None => msg,
    };

    let Some(ip) = err.ip() else {
        return format!("{msg}\n");
    };
    match program.source_offset(ip) {
        Some(offset) => format!("{msg} at instruction {ip}\n{}", caret_context(code, offset)),
        None => format!("{msg} at instruction {ip}\n"),
    }
}

/// Line/column header, the surrounding source line and a caret under
/// character `offset`, working with UTF-8 by counting chars.
fn caret_context(code: &str, offset: usize) -> String {
    let mut line_no = 1;
    let mut line_start = 0usize;
    for (i, ch) in code.chars().enumerate().take(offset) {
        if ch == '\n' {
            line_no += 1;
            line_start = i + 1;
        }
    }
    let column = offset - line_start;

    let line: Vec<char> = code
        .chars()
        .skip(line_start)
        .take_while(|&c| c != '\n')
        .collect();
    let start = column.saturating_sub(WINDOW_CHARS);
    let end = (column + WINDOW_CHARS + 1).min(line.len());
    let slice: String = line[start..end].iter().collect();

    // Caret under the exact position
    let underline = format!("{}^", " ".repeat(column - start));
    format!("  line {line_no}, column {}\n  {slice}\n  {underline}\n", column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnmatchedBracketKind;

    #[test]
    fn caret_points_at_source_character_not_instruction() {
        let code = "comment +\n  more ]";
        let program = Program::parse(code);
        let err = BrainfuckError::UnmatchedBrackets { ip: 1, kind: UnmatchedBracketKind::Close };
        let text = render_reader_error(Some("bf"), code, &program, &err);
        assert_eq!(
            text,
            "bf: Parse error: unmatched bracket ']' at instruction 1\n  line 2, column 8\n    more ]\n         ^\n"
        );
    }

    #[test]
    fn long_lines_are_windowed() {
        let code = format!("{}<", "x".repeat(100));
        let program = Program::parse(&code);
        let err = BrainfuckError::PointerOutOfBounds { ip: 0, ptr: 0, op: crate::Opcode::MoveLeft };
        let text = render_reader_error(None, &code, &program, &err);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Runtime error: pointer out of bounds"));
        assert_eq!(lines[1], "  line 1, column 101");
        assert_eq!(lines[2], format!("  {}<", "x".repeat(WINDOW_CHARS)));
        assert_eq!(lines[3], format!("  {}^", " ".repeat(WINDOW_CHARS)));
    }

    #[test]
    fn errors_without_position_are_one_line() {
        let text = render_reader_error(None, "+[]", &Program::parse("+[]"), &BrainfuckError::Canceled);
        assert_eq!(text, "Execution aborted: cancelled\n");
    }
}
