//! Lexical filtering of source text into an opcode sequence.

use std::fmt;
use std::ops::Index;

use crate::opcode::Opcode;

/// An immutable, filtered sequence of opcodes.
///
/// Alongside each opcode the program remembers the character offset it came
/// from, so diagnostics can point back into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    ops: Vec<Opcode>,
    offsets: Vec<usize>,
}

impl Program {
    /// Keep the instruction characters of `source` in order and drop everything else.
    ///
    /// Never fails: empty or prose-only text yields an empty program.
    pub fn parse(source: &str) -> Self {
        let (ops, offsets): (Vec<Opcode>, Vec<usize>) = source
            .chars()
            .enumerate()
            .filter_map(|(i, c)| Opcode::from_char(c).map(|op| (op, i)))
            .unzip();
        Self { ops, offsets }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, ip: usize) -> Option<Opcode> {
        self.ops.get(ip).copied()
    }

    pub fn ops(&self) -> &[Opcode] {
        &self.ops
    }

    /// Character offset in the original source of the opcode at `ip`.
    pub fn source_offset(&self, ip: usize) -> Option<usize> {
        self.offsets.get(ip).copied()
    }
}

impl Index<usize> for Program {
    type Output = Opcode;

    fn index(&self, ip: usize) -> &Opcode {
        &self.ops[ip]
    }
}

/// Renders the canonical, comment-free source text.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
