use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Once,
};

use clap::Parser;
use sable::{
    Config, Interpreter, Module, Privileges, Value, error::RuntimeError, util::num::expect_string,
};

/// sable is a small, embeddable scripting language. This binary runs
/// scripts and provides an interactive prompt.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells sable to treat the input as a path to a script file.
    #[arg(short, long)]
    file: bool,

    /// Starts an interactive prompt after the script, or instead of it.
    #[arg(short, long)]
    repl: bool,

    /// Grants scripts access to the `read_file` and `write_file` functions.
    #[arg(long)]
    allow_file_io: bool,

    /// Grants the threading privilege to registered modules.
    #[arg(long)]
    allow_threads: bool,

    /// Resolves `import` paths against this directory.
    #[arg(long, value_name = "DIR")]
    import_root: Option<PathBuf>,

    /// Suppresses printing the value of the last statement.
    #[arg(short, long)]
    quiet: bool,

    /// The script, or its path with `--file`.
    contents: Option<String>,
}

static TRACING_INIT: Once = Once::new();

/// Installs a tracing subscriber when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
                    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

                    if std::env::var("RUST_LOG").is_ok() {
                        tracing_subscriber::registry().with(fmt::layer().with_target(true)
                                                                        .with_level(true))
                                                      .with(EnvFilter::from_default_env())
                                                      .init();
                    }
                });
}

fn config(args: &Args) -> Config {
    let mut privileges = Privileges::empty();
    if args.allow_file_io {
        privileges |= Privileges::FILE_IO;
    }
    if args.allow_threads {
        privileges |= Privileges::THREADING;
    }

    let config = Config::default().with_privileges(privileges);
    match &args.import_root {
        Some(root) => config.with_import_root(root),
        None => config,
    }
}

fn native_failure(function: &str, error: &io::Error, line: usize) -> RuntimeError {
    RuntimeError::NativeFailure { function: function.to_string(),
                                  reason: error.to_string(),
                                  line }
}

/// File access for scripts, installed only with `--allow-file-io`.
fn files_module() -> Module {
    Module::new("files").requires(Privileges::FILE_IO)
                        .function("read_file", |args, line| {
                            let [path] = args else {
                                return Err(RuntimeError::ArgumentCountMismatch { name: "read_file".to_string(),
                                                                                 found: args.len(),
                                                                                 line });
                            };
                            let path = expect_string(path, "path", line)?;
                            std::fs::read_to_string(path).map(Value::from)
                                                         .map_err(|e| native_failure("read_file", &e, line))
                        })
                        .function("write_file", |args, line| {
                            let [path, contents] = args else {
                                return Err(RuntimeError::ArgumentCountMismatch { name: "write_file".to_string(),
                                                                                 found: args.len(),
                                                                                 line });
                            };
                            let path = expect_string(path, "path", line)?;
                            std::fs::write(path, contents.to_string()).map(|()| Value::Null)
                                                                      .map_err(|e| native_failure("write_file", &e, line))
                        })
}

fn repl(interp: &mut Interpreter) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        let prompt = if interp.is_idle() { "> " } else { ". " };
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }
        interp.submit_line(&input);
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut interp = Interpreter::with_config(config(&args));
    interp.register_module(files_module());

    if let Some(contents) = &args.contents {
        let result = if args.file {
            interp.run_file(contents)
        } else {
            interp.run_script(contents)
        };

        match result {
            Ok(value) if !args.quiet && value != Value::Null => println!("{value}"),
            Ok(_) => {},
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            },
        }
    } else if !args.repl {
        eprintln!("Nothing to run. Pass a script, a file with --file, or --repl.");
        return ExitCode::FAILURE;
    }

    if args.repl
       && let Err(e) = repl(&mut interp)
    {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
