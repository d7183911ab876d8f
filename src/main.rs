use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use loxwalk::ast_printer::AstPrinter;
use loxwalk::error::{LoxError, Reporter};
use loxwalk::parser::Parser;
use loxwalk::scanner::{tokenize, Scanner};
use loxwalk::{Lox, RunStatus};

/// Exit code for lexical and syntax errors.
const EXIT_STATIC_ERROR: i32 = 65;

/// Exit code for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a program and prints its AST
    Parse {
        filename: PathBuf,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program, or starts a REPL without one
    Run { filename: Option<PathBuf> },
}

/// Prints diagnostics to standard error as they arrive.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, error: &LoxError) {
        debug!("Reporting diagnostic: {}", error);
        eprintln!("{}", error);
    }
}

/// Reads a source file through a memory map.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length files cannot be mapped.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read-only and dropped before returning; the file is
    // not expected to be modified while it is being read.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

    let text = std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", len, filename);

    Ok(text.to_owned())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // One record per line: module path (without the crate prefix), source line, message.
    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("loxwalk::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn tokenize_command(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;

    if json {
        let (tokens, errors) = tokenize(&source);
        for e in &errors {
            eprintln!("{}", e);
        }
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(if errors.is_empty() { 0 } else { EXIT_STATIC_ERROR });
    }

    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    Ok(if tokenized { 0 } else { EXIT_STATIC_ERROR })
}

fn parse_command(filename: &Path, json: bool) -> Result<i32> {
    let source = read_file(filename)?;
    let (tokens, lex_errors) = tokenize(&source);
    let mut reporter = ConsoleReporter;

    for e in &lex_errors {
        reporter.report(e);
    }

    match Parser::new(tokens).parse() {
        Ok(statements) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            } else {
                for stmt in &statements {
                    println!("{}", AstPrinter::print_stmt(stmt));
                }
            }

            Ok(if lex_errors.is_empty() { 0 } else { EXIT_STATIC_ERROR })
        }

        Err(errors) => {
            for e in &errors {
                reporter.report(e);
            }
            Ok(EXIT_STATIC_ERROR)
        }
    }
}

fn evaluate_command(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    let mut lox = Lox::new();

    match lox.evaluate(&source, &mut ConsoleReporter) {
        Ok(value) => {
            println!("{}", value);
            Ok(0)
        }
        Err(status) => Ok(exit_code(status)),
    }
}

fn run_command(filename: &Path) -> Result<i32> {
    let source = read_file(filename)?;
    debug!("Provided input:\n{}", source);

    let mut lox = Lox::new();
    let status = lox.run(&source, &mut ConsoleReporter);

    info!("Run finished with {:?}", status);

    Ok(exit_code(status))
}

/// Reads and runs one line at a time. Errors are reported but do not end the
/// session, and definitions carry over between lines.
fn repl() -> Result<i32> {
    info!("Starting REPL");

    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let status = lox.run(&line, &mut ConsoleReporter);
        debug!("REPL line finished with {:?}", status);
    }

    Ok(0)
}

fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Success => 0,
        RunStatus::StaticError => EXIT_STATIC_ERROR,
        RunStatus::RuntimeError => EXIT_RUNTIME_ERROR,
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // A logger that drops everything, so `log` macros stay cheap.
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize_command(filename, *json)?,
        Commands::Parse { filename, json } => parse_command(filename, *json)?,
        Commands::Evaluate { filename } => evaluate_command(filename)?,
        Commands::Run {
            filename: Some(filename),
        } => run_command(filename)?,
        Commands::Run { filename: None } => repl()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        process::exit(code);
    }

    Ok(())
}
