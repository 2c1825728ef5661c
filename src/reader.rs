//! Execution engine: drives a [`Machine`] over a validated program.

use std::io::{self, Read, Write};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::debug;

use crate::config::RunConfig;
use crate::error::{BrainfuckError, ConfigError};
use crate::jump::JumpTable;
use crate::machine::{Machine, Step};
use crate::opcode::Opcode;
use crate::program::Program;

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone, Debug, Default)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// State observed right before an instruction executes.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    ip: usize,
    ptr: usize,
    cell: u8,
    op: Opcode,
}

/// A validated program ready to run any number of times.
///
/// Construction lexes the source and resolves the loop jump table, so
/// structural errors surface before any instruction executes. Every run
/// starts from a fresh zeroed tape.
#[derive(Debug, Clone)]
pub struct BrainfuckReader {
    program: Program,
    jumps: JumpTable,
    config: RunConfig,
}

impl BrainfuckReader {
    /// Validate `source` with the default configuration (30,000 cells, EOF stores 255).
    pub fn new(source: &str) -> Result<Self, BrainfuckError> {
        Self::with_config(source, RunConfig::default())
    }

    pub fn with_config(source: &str, config: RunConfig) -> Result<Self, BrainfuckError> {
        Self::from_program(Program::parse(source), config)
    }

    /// Fails with [`ConfigError::ZeroMemory`] when `config` describes an empty tape,
    /// since fields set directly bypass [`RunConfig::with_memory`].
    pub fn from_program(program: Program, config: RunConfig) -> Result<Self, BrainfuckError> {
        if config.memory_size == 0 {
            return Err(ConfigError::ZeroMemory.into());
        }
        let jumps = JumpTable::resolve(&program)?;
        Ok(Self { program, jumps, config })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run to completion and return every byte the program emitted.
    ///
    /// Output produced before a failure is discarded; use [`run_into`](Self::run_into)
    /// to keep it.
    pub fn run<R: Read>(&self, input: R) -> Result<Vec<u8>, BrainfuckError> {
        let mut out = Vec::new();
        self.run_into(input, &mut out, None)?;
        Ok(out)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control<R: Read>(
        &self,
        input: R,
        step_control: &StepControl,
    ) -> Result<Vec<u8>, BrainfuckError> {
        let mut out = Vec::new();
        self.run_into(input, &mut out, Some(step_control))?;
        Ok(out)
    }

    /// Run to completion, writing each emitted byte to `sink` as it is produced.
    ///
    /// Returns the number of executed instructions.
    pub fn run_into<R: Read, W: Write>(
        &self,
        input: R,
        sink: &mut W,
        step_control: Option<&StepControl>,
    ) -> Result<usize, BrainfuckError> {
        let steps = self.execute(input, step_control, |_, at, step| {
            if let Step::Emit(b) = step {
                sink.write_all(&[b])?;
            }
            if at.op == Opcode::Input {
                // interactive programs expect their prompt before blocking on input
                sink.flush()?;
            }
            Ok(())
        })?;
        sink.flush().map_err(|source| BrainfuckError::Io {
            ip: self.program.len(),
            source,
        })?;
        Ok(steps)
    }

    /// Debug-run the program, writing a step-by-step table of operations to
    /// `table` instead of producing output. The machine advances exactly as
    /// it would during a real run; emitted bytes are collected and returned.
    pub fn run_debug<R: Read, W: Write>(
        &self,
        input: R,
        table: &mut W,
        step_control: Option<&StepControl>,
    ) -> Result<Vec<u8>, BrainfuckError> {
        let header = writeln!(table, "STEP | IP  | PTR | CELL | INSTR | ACTION").and_then(|_| {
            writeln!(
                table,
                "-----+-----+-----+------+-------+------------------------------------------------"
            )
        });
        header.map_err(|source| BrainfuckError::Io { ip: 0, source })?;

        let mut out = Vec::new();
        let mut step_no = 0usize;
        self.execute(input, step_control, |machine, at, step| {
            if let Step::Emit(b) = step {
                out.push(b);
            }
            let action = describe(machine, at, step);
            writeln!(
                table,
                "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                step_no, at.ip, at.ptr, at.cell, at.op, action
            )?;
            step_no += 1;
            Ok(())
        })?;
        Ok(out)
    }

    /// Fetch-dispatch loop shared by every run mode. `observe` sees the
    /// machine after each instruction together with the state before it.
    fn execute<R, F>(
        &self,
        mut input: R,
        step_control: Option<&StepControl>,
        mut observe: F,
    ) -> Result<usize, BrainfuckError>
    where
        R: Read,
        F: FnMut(&Machine, Snapshot, Step) -> io::Result<()>,
    {
        let mut machine = Machine::new(self.config.memory_size)?;
        let max_steps = step_control
            .and_then(|ctrl| ctrl.max_steps)
            .or(self.config.max_steps);
        let mut steps: usize = 0;

        debug!(
            instructions = self.program.len(),
            memory = self.config.memory_size,
            eof = %self.config.eof,
            "run start"
        );

        while machine.ip() < self.program.len() {
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(BrainfuckError::Canceled);
                }
            }

            if let Some(max) = max_steps {
                if steps >= max {
                    return Err(BrainfuckError::StepLimitExceeded { limit: max });
                }
            }

            let at = Snapshot {
                ip: machine.ip(),
                ptr: machine.pointer(),
                cell: machine.cell(),
                op: self.program[machine.ip()],
            };
            let step = machine
                .step(&self.program, &self.jumps, &mut input, self.config.eof)
                .inspect_err(|e| debug!(error = %e, steps, "run failed"))?;
            observe(&machine, at, step).map_err(|source| BrainfuckError::Io { ip: at.ip, source })?;
            steps += 1;
        }

        debug!(steps, "run halted");
        Ok(steps)
    }
}

fn describe(machine: &Machine, at: Snapshot, step: Step) -> String {
    match at.op {
        Opcode::MoveRight | Opcode::MoveLeft => {
            format!("Moved pointer head to index {}", machine.pointer())
        }
        Opcode::Increment => {
            format!("Increment cell[{}] from {} to {}", at.ptr, at.cell, machine.cell())
        }
        Opcode::Decrement => {
            format!("Decrement cell[{}] from {} to {}", at.ptr, at.cell, machine.cell())
        }
        Opcode::Output => match step {
            Step::Emit(b) => format!("Output byte {} ({:?})", b, b as char),
            _ => String::new(),
        },
        Opcode::Input => format!("Read byte from input -> {}", machine.cell()),
        Opcode::LoopOpen if machine.ip() != at.ip + 1 => {
            format!("Cell is 0; jump forward to matching ']' at IP {}", machine.ip() - 1)
        }
        Opcode::LoopOpen => "Enter loop (cell != 0)".to_string(),
        Opcode::LoopClose if machine.ip() != at.ip + 1 => {
            format!("Cell != 0; jump back to matching '[' at IP {}", machine.ip() - 1)
        }
        Opcode::LoopClose => "Exit loop (cell is 0)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EofPolicy;
    use crate::error::UnmatchedBracketKind;

    fn small(code: &str) -> BrainfuckReader {
        let config = RunConfig::default().with_memory(10).unwrap();
        BrainfuckReader::with_config(code, config).unwrap()
    }

    #[test]
    fn unmatched_open_bracket_returns_error_before_running() {
        let result = BrainfuckReader::new("[+");
        assert!(matches!(
            result,
            Err(BrainfuckError::UnmatchedBrackets { kind: UnmatchedBracketKind::Open, .. })
        ));
    }

    #[test]
    fn zero_cell_tape_is_rejected_before_running() {
        let config = RunConfig { memory_size: 0, ..RunConfig::default() };
        let result = BrainfuckReader::with_config("+", config.clone());
        assert!(matches!(result, Err(BrainfuckError::Config(ConfigError::ZeroMemory))));

        let result = crate::run_with_config("+", io::empty(), config);
        assert!(matches!(result, Err(BrainfuckError::Config(ConfigError::ZeroMemory))));
    }

    #[test]
    fn simple_program_without_io_runs_ok() {
        let out = small("+++[-]").run(io::empty()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn runs_start_from_a_fresh_tape() {
        let bf = small("+++.");
        assert_eq!(bf.run(io::empty()).unwrap(), vec![3]);
        assert_eq!(bf.run(io::empty()).unwrap(), vec![3]);
    }

    #[test]
    fn run_into_keeps_output_produced_before_failure() {
        let bf = small("+.+.<");
        let mut sink = Vec::new();
        let result = bf.run_into(io::empty(), &mut sink, None);
        assert!(matches!(result, Err(BrainfuckError::PointerOutOfBounds { ip: 4, .. })));
        assert_eq!(sink, vec![1, 2]);
    }

    #[test]
    fn run_into_counts_steps() {
        let steps = small("++[-]").run_into(io::empty(), &mut io::sink(), None).unwrap();
        // `]` jumps back to the body, not to `[`: + + [ - ] - ]
        assert_eq!(steps, 7);
    }

    #[test]
    fn step_limit_aborts_infinite_loop() {
        let ctrl = StepControl::new(Some(100), Arc::new(AtomicBool::new(false)));
        let result = small("+[]").run_with_control(io::empty(), &ctrl);
        assert!(matches!(result, Err(BrainfuckError::StepLimitExceeded { limit: 100 })));
    }

    #[test]
    fn step_limit_from_config_applies_without_control() {
        let config = RunConfig::default().with_max_steps(Some(5));
        let bf = BrainfuckReader::with_config("+[]", config).unwrap();
        assert!(matches!(
            bf.run(io::empty()),
            Err(BrainfuckError::StepLimitExceeded { limit: 5 })
        ));
    }

    #[test]
    fn program_finishing_exactly_at_limit_succeeds() {
        let ctrl = StepControl::new(Some(3), Arc::new(AtomicBool::new(false)));
        assert_eq!(small("++.").run_with_control(io::empty(), &ctrl).unwrap(), vec![2]);
    }

    #[test]
    fn raised_cancel_flag_aborts() {
        let ctrl = StepControl::new(None, Arc::new(AtomicBool::new(true)));
        let result = small("+").run_with_control(io::empty(), &ctrl);
        assert!(matches!(result, Err(BrainfuckError::Canceled)));
    }

    #[test]
    fn eof_policy_error_fails_on_exhausted_input() {
        let config = RunConfig::default().with_eof(EofPolicy::Error);
        let bf = BrainfuckReader::with_config(",.,", config).unwrap();
        let result = bf.run(&b"a"[..]);
        assert!(matches!(result, Err(BrainfuckError::InputExhausted { ip: 2 })));
    }

    #[test]
    fn debug_run_prints_table_and_collects_output() {
        let mut table = Vec::new();
        let out = small(">+.[-]").run_debug(io::empty(), &mut table, None).unwrap();
        let text = String::from_utf8(table).unwrap();
        assert_eq!(out, vec![1]);
        assert!(text.starts_with("STEP | IP"));
        assert!(text.contains("Moved pointer head to index 1"));
        assert!(text.contains("Increment cell[1] from 0 to 1"));
        assert!(text.contains("Exit loop (cell is 0)"));
    }

    #[test]
    fn debug_run_reports_skipped_loop() {
        let mut table = Vec::new();
        small("[+]").run_debug(io::empty(), &mut table, None).unwrap();
        let text = String::from_utf8(table).unwrap();
        assert!(text.contains("jump forward to matching ']' at IP 2"));
    }
}
