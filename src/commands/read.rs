use clap::Args;
use std::{fs, thread};
use std::io::{self, Cursor, Read, Write};
use std::sync::{mpsc, Arc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use bf_tape::{BrainfuckError, BrainfuckReader, EofPolicy, Program, RunConfig, StepControl};
use bf_tape::cli_util::print_reader_error;
use tracing::warn;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReadArgs {
    /// Print a step-by-step table of operations instead of program output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    pub code: Vec<String>,

    /// Feed `,` from TEXT instead of stdin
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    pub input: Option<String>,

    /// What `,` stores at end of input: sentinel (255), zero, or error (fallback BF_EOF)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// Number of tape cells (fallback BF_MEMORY; default 30_000)
    #[arg(long = "memory", value_name = "CELLS")]
    pub memory: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: ReadArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let ReadArgs {
        debug,
        file,
        code,
        input,
        eof,
        memory,
        timeout_ms,
        max_steps,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    // Resolve settings: flags -> env -> bf.toml -> defaults
    let config = match resolve_config(eof, memory, max_steps) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };
    let timeout_ms = match timeout_ms {
        Some(ms) => ms,
        None => match std::env::var("BF_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => ms,
                Err(_) => {
                    eprintln!("{program}: invalid value for BF_TIMEOUT_MS: '{raw}'");
                    let _ = io::stderr().flush();
                    return 2;
                }
            },
            Err(_) => 2_000,
        },
    };

    // Keep the parsed program so error carets can map back into the source
    let parsed = Program::parse(&code_str);
    let bf = match BrainfuckReader::from_program(parsed.clone(), config) {
        Ok(bf) => bf,
        Err(err) => {
            print_reader_error(Some(program), &code_str, &parsed, &err);
            return 1;
        }
    };

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let interrupt_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupt_flag.store(true, Ordering::Relaxed)) {
        warn!(error = %e, "failed to set ctrl+c handler");
    }

    let (tx, rx) = mpsc::channel::<Result<(), BrainfuckError>>();
    let ctrl = StepControl::new(None, cancel.clone());
    let source: Box<dyn Read + Send> = match input {
        Some(text) => Box::new(Cursor::new(text.into_bytes())),
        None => Box::new(io::stdin()),
    };

    thread::spawn(move || {
        // Unlocked handle: the main thread may still need stdout after a timeout
        let mut stdout = io::stdout();
        let res = if debug {
            bf.run_debug(source, &mut stdout, Some(&ctrl)).map(|_| ())
        } else {
            bf.run_into(source, &mut stdout, Some(&ctrl)).map(|_| ())
        };
        let _ = tx.send(res);
    });

    let timeout = Duration::from_millis(timeout_ms);
    let exit_code = match rx.recv_timeout(timeout) {
        Ok(Ok(())) => 0,
        Ok(Err(err @ (BrainfuckError::StepLimitExceeded { .. } | BrainfuckError::Canceled))) => {
            eprintln!("{err}");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(other)) => {
            let _ = io::stdout().flush();
            print_reader_error(Some(program), &code_str, &parsed, &other);
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    exit_code
}

fn resolve_config(
    eof: Option<EofPolicy>,
    memory: Option<usize>,
    max_steps: Option<usize>,
) -> Result<RunConfig, bf_tape::ConfigError> {
    let mut config = RunConfig::load()?;
    if let Some(eof) = eof {
        config = config.with_eof(eof);
    }
    if let Some(memory) = memory {
        config = config.with_memory(memory)?;
    }
    if max_steps.is_some() {
        config = config.with_max_steps(max_steps);
    }
    Ok(config)
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} read [options] "<code>"
  {0} read [options] --file <PATH>

Options:
  --file,  -f <PATH>    Read Brainfuck code from PATH instead of positional "<code>"
  --input, -i <TEXT>    Feed `,` from TEXT instead of stdin
  --eof <POLICY>        End-of-input behavior: sentinel (255), zero, error
  --memory <CELLS>      Tape size (default 30000)
  --max-steps <N>       Abort after N executed instructions
  --timeout <MS>        Abort after MS milliseconds (default 2000)
  --debug, -d           Print a step-by-step table of operations instead of output
  --help,  -h           Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are comments and are ignored.
- Defaults can be set in the [run] section of ~/.config/bf.toml
  (memory, eof, max_steps) or with BF_MEMORY, BF_EOF, BF_MAX_STEPS.

Examples:
- Load Brainfuck code from a file:
    {0} read --file ./program.bf
- Echo a file through `,` and `.` (stops at the 255 end-of-input sentinel):
    {0} read ",+[-.,+]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
