use bf_tape::BrainfuckReader;
use bf_tape::cli_util::{init_logging, print_reader_error};
use std::env;
use std::io::{self, Write};

fn print_usage_and_exit(program: &str) -> ! {
    eprintln!(
        "Usage:\n  {0} \"<code>\"   # Run Brainfuck code provided as CLI arguments (they will be concatenated)\n\nNotes:\n- Input (`,`) reads a single byte from stdin; on EOF the current cell is set to 255.\n- Any characters outside of Brainfuck's ><+-.,[] are ignored.\n",
        program
    );
    std::process::exit(2);
}

fn main() {
    init_logging();

    // Collect all CLI args after the program name
    let args: Vec<String> = env::args().skip(1).collect();
    let program = env::args().next().unwrap_or_else(|| "bf_runner".to_string());

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage_and_exit(&program);
    }

    // Concatenate all args without spaces to form the Brainfuck code
    let code = args.join("");

    let bf = match BrainfuckReader::new(&code) {
        Ok(bf) => bf,
        Err(err) => {
            print_reader_error(Some(&program), &code, &bf_tape::Program::parse(&code), &err);
            std::process::exit(1);
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = bf.run_into(io::stdin().lock(), &mut stdout, None) {
        let _ = stdout.flush();
        print_reader_error(Some(&program), &code, bf.program(), &err);
        std::process::exit(1);
    }

    // For readability, ensure output ends with a newline
    let _ = writeln!(stdout);
}
