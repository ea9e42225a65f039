mod external;
mod output;

use external::ConsoleRecorder;
use output::OutputMode;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use shablang::vm::DEFAULT_MAX_CALL_DEPTH;
use shablang::{Config, Session};
use std::env;
use std::fs;
use std::io::Read;
use std::process;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();

    // Parse flags
    let mut repl_mode = false;
    let mut output_mode = OutputMode::Text;
    let mut config = Config::default();
    let mut eval_script: Option<String> = None;
    let mut script_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-r" | "--repl" => {
                repl_mode = true;
            }
            "-t" | "--trace" => {
                config = config.with_trace(true);
            }
            "-j" | "--json" => {
                output_mode = OutputMode::Json;
            }
            "-d" | "--max-depth" => {
                i += 1;
                match args.get(i).map(|depth| depth.parse::<usize>()) {
                    Some(Ok(depth)) if depth > 0 => {
                        config = config.with_max_call_depth(depth);
                    }
                    Some(_) => {
                        eprintln!("Error: -d expects a positive integer");
                        exit_with(Err(ExitCode::ArgumentError));
                    }
                    None => {
                        eprintln!("Error: -d requires a depth argument");
                        exit_with(Err(ExitCode::ArgumentError));
                    }
                }
            }
            "-e" | "--eval" => {
                i += 1;
                if i < args.len() {
                    eval_script = Some(args[i].clone());
                } else {
                    eprintln!("Error: -e requires a script argument");
                    exit_with(Err(ExitCode::ArgumentError));
                }
            }
            arg if !arg.starts_with('-') => {
                script_path = Some(arg.to_string());
            }
            unknown => {
                eprintln!("Unknown option: {}", unknown);
                exit_with(Err(ExitCode::ArgumentError));
            }
        }
        i += 1;
    }

    if repl_mode {
        exit_with(run_repl(config));
    }

    // Determine source: -e > file > stdin
    let source = if let Some(script) = eval_script {
        script
    } else if let Some(path) = script_path {
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                exit_with(Err(ExitCode::ArgumentError));
            }
        }
    } else if !atty::is(atty::Stream::Stdin) {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading from stdin: {}", e);
            exit_with(Err(ExitCode::ArgumentError));
        }
        source
    } else {
        print_help();
        exit_with(Err(ExitCode::ArgumentError));
    };

    let result = match output_mode {
        OutputMode::Text => run_script(&source, config),
        OutputMode::Json => run_script_json(&source, config),
    };
    exit_with(result);
}

enum ExitCode {
    ArgumentError,
    RuntimeError,
}

fn exit_with(result: Result<(), ExitCode>) -> ! {
    match result {
        Ok(()) => process::exit(0),
        Err(ExitCode::ArgumentError) => process::exit(1),
        Err(ExitCode::RuntimeError) => process::exit(2),
    }
}

/// Log to stderr when `SHAB_LOG` (or `RUST_LOG`) is set.
fn init_logging() {
    let filter = env::var("SHAB_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok());

    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_help() {
    println!("shablang - a small stack language");
    println!();
    println!("USAGE:");
    println!("    shab <SCRIPT>             Run a script file");
    println!("    shab -e <CODE>            Evaluate inline code");
    println!("    shab -r                   Start REPL");
    println!("    shab -h                   Show this help");
    println!("    cat file | shab           Read script from stdin");
    println!();
    println!("OPTIONS:");
    println!("    -e, --eval <CODE>         Evaluate inline code");
    println!("    -t, --trace               Trace every step to stderr");
    println!("    -j, --json                Print the result as a JSON object");
    println!(
        "    -d, --max-depth <N>       Maximum call depth (default {})",
        DEFAULT_MAX_CALL_DEPTH
    );
    println!();
    println!("ENVIRONMENT:");
    println!("    SHAB_LOG                  Log filter, e.g. 'shablang=debug'");
}

fn run_script(source: &str, config: Config) -> Result<(), ExitCode> {
    let mut session = Session::new(config);

    match session.evaluate(source) {
        Ok(stack) => {
            if let Some(rendered) = output::format_stack_text(&stack) {
                println!("{}", rendered);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.format_with_source(source));
            Err(ExitCode::RuntimeError)
        }
    }
}

fn run_script_json(source: &str, config: Config) -> Result<(), ExitCode> {
    let console = ConsoleRecorder::new();
    let mut session = Session::new(config).with_output(Box::new(console.clone()));

    let started = Instant::now();
    let result = session.evaluate(source);
    let duration_ms = started.elapsed().as_millis() as u64;
    debug!(duration_ms, "evaluation finished");

    match result {
        Ok(stack) => {
            println!(
                "{}",
                output::format_result_json(&stack, duration_ms, console.take())
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", output::format_error_json(&e, console.take()));
            Err(ExitCode::RuntimeError)
        }
    }
}

fn run_repl(config: Config) -> Result<(), ExitCode> {
    println!("shablang REPL. Ctrl-D to exit.");

    let mut session = Session::new(config.with_persist_environment(true));
    let mut editor = DefaultEditor::new().map_err(|e| {
        eprintln!("Failed to initialize REPL: {}", e);
        ExitCode::RuntimeError
    })?;

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                editor.add_history_entry(&line).ok();

                match session.evaluate(&line) {
                    Ok(stack) => {
                        if let Some(rendered) = output::format_stack_text(&stack) {
                            println!("{}", rendered);
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(ExitCode::RuntimeError);
            }
        }
    }

    Ok(())
}
