//! The eight instructions of the tape machine and their source characters.

use std::fmt;

/// A single tape-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `>`
    MoveRight,
    /// `<`
    MoveLeft,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopOpen,
    /// `]`
    LoopClose,
}

impl Opcode {
    /// Every opcode, in the order of the classic instruction listing `><+-.,[]`.
    pub const ALL: [Opcode; 8] = [
        Opcode::MoveRight,
        Opcode::MoveLeft,
        Opcode::Increment,
        Opcode::Decrement,
        Opcode::Output,
        Opcode::Input,
        Opcode::LoopOpen,
        Opcode::LoopClose,
    ];

    /// Map a source character to its opcode. Anything else is commentary.
    pub const fn from_char(c: char) -> Option<Opcode> {
        match c {
            '>' => Some(Opcode::MoveRight),
            '<' => Some(Opcode::MoveLeft),
            '+' => Some(Opcode::Increment),
            '-' => Some(Opcode::Decrement),
            '.' => Some(Opcode::Output),
            ',' => Some(Opcode::Input),
            '[' => Some(Opcode::LoopOpen),
            ']' => Some(Opcode::LoopClose),
            _ => None,
        }
    }

    /// The source character for this opcode.
    pub const fn as_char(self) -> char {
        match self {
            Opcode::MoveRight => '>',
            Opcode::MoveLeft => '<',
            Opcode::Increment => '+',
            Opcode::Decrement => '-',
            Opcode::Output => '.',
            Opcode::Input => ',',
            Opcode::LoopOpen => '[',
            Opcode::LoopClose => ']',
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_bidirectional() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_char(op.as_char()), Some(op));
        }
    }

    #[test]
    fn non_instruction_characters_map_to_none() {
        for c in ['a', ' ', '\n', '#', '!', 'é', '0'] {
            assert_eq!(Opcode::from_char(c), None);
        }
    }
}
