//! Machine state and the single-instruction transition function.

use std::io::{self, Read};

use tracing::trace;

use crate::config::{EOF_SENTINEL, EofPolicy};
use crate::error::{BrainfuckError, ConfigError};
use crate::jump::JumpTable;
use crate::opcode::Opcode;
use crate::program::Program;

/// Outcome of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and produced nothing.
    Continue,
    /// The instruction ran and emitted this byte.
    Emit(u8),
    /// The instruction pointer is past the end of the program.
    Halt,
}

/// Tape, data pointer and instruction pointer of one execution.
///
/// A machine is created fresh for every run and never shared between runs.
#[derive(Debug, Clone)]
pub struct Machine {
    tape: Vec<u8>,
    pointer: usize,
    ip: usize,
}

impl Machine {
    /// A zeroed tape of `memory_size` cells with both pointers at 0.
    ///
    /// The data pointer always addresses a cell, so an empty tape is rejected.
    pub fn new(memory_size: usize) -> Result<Self, ConfigError> {
        if memory_size == 0 {
            return Err(ConfigError::ZeroMemory);
        }
        Ok(Self {
            tape: vec![0; memory_size],
            pointer: 0,
            ip: 0,
        })
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cell(&self) -> u8 {
        self.tape[self.pointer]
    }

    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// Execute the instruction at the current instruction pointer.
    ///
    /// On error the machine is left exactly as it was before the instruction.
    pub fn step<R: Read>(
        &mut self,
        program: &Program,
        jumps: &JumpTable,
        input: &mut R,
        eof: EofPolicy,
    ) -> Result<Step, BrainfuckError> {
        let Some(op) = program.get(self.ip) else {
            return Ok(Step::Halt);
        };

        let mut step = Step::Continue;
        match op {
            Opcode::MoveRight => {
                if self.pointer + 1 >= self.tape.len() {
                    return Err(self.out_of_bounds(op));
                }
                self.pointer += 1;
            }
            Opcode::MoveLeft => {
                if self.pointer == 0 {
                    return Err(self.out_of_bounds(op));
                }
                self.pointer -= 1;
            }
            Opcode::Increment => {
                self.tape[self.pointer] = self.tape[self.pointer].wrapping_add(1);
            }
            Opcode::Decrement => {
                self.tape[self.pointer] = self.tape[self.pointer].wrapping_sub(1);
            }
            Opcode::Output => step = Step::Emit(self.tape[self.pointer]),
            Opcode::Input => {
                self.tape[self.pointer] = match read_byte(input) {
                    Ok(Some(b)) => b,
                    Ok(None) => match eof {
                        EofPolicy::Sentinel => EOF_SENTINEL,
                        EofPolicy::Zero => 0,
                        EofPolicy::Error => {
                            return Err(BrainfuckError::InputExhausted { ip: self.ip });
                        }
                    },
                    Err(source) => return Err(BrainfuckError::Io { ip: self.ip, source }),
                };
            }
            Opcode::LoopOpen => {
                if self.tape[self.pointer] == 0 {
                    let target = jumps.close_for(self.ip);
                    trace!(from = self.ip, to = target, "skip loop body");
                    self.ip = target;
                }
            }
            Opcode::LoopClose => {
                if self.tape[self.pointer] != 0 {
                    self.ip = jumps.open_for(self.ip);
                }
            }
        }

        self.ip += 1;
        Ok(step)
    }

    fn out_of_bounds(&self, op: Opcode) -> BrainfuckError {
        BrainfuckError::PointerOutOfBounds {
            ip: self.ip,
            ptr: self.pointer,
            op,
        }
    }
}

/// Read exactly one byte, retrying on interruption. `None` means end of input.
fn read_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
