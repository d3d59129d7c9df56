use std::fs;
use std::io::{self, BufRead};
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;

use walle::config::DEFAULT_CANVAS_SIZE;
use walle::error::Error;
use walle::ir::ast::Program;
use walle::parser::lexer;
use walle::runtime::{BLANK, Canvas, ColorCode, Interpreter, Palette};
use walle::{RunConfig, check};

#[derive(Parser)]
#[command(name = "walle")]
#[command(about = "Interpreter for the WallE canvas drawing language", version)]
struct Cli {
    /// Подробность логов (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Выполняет программу и печатает холст
    Run {
        /// Исходник ("-" читает stdin до пустой строки)
        input: String,

        /// Размер холста
        #[arg(short, long, default_value_t = DEFAULT_CANVAS_SIZE)]
        size: usize,

        /// Максимум выполненных инструкций
        #[arg(long)]
        max_steps: Option<u64>,

        /// Показать токены
        #[arg(long)]
        show_tokens: bool,

        /// Показать ast
        #[arg(long)]
        show_ast: bool,
    },

    /// Проверить программу без выполнения
    Check {
        /// Исходник
        input: String,
    },

    /// Показать токены
    Tokens {
        /// Исходник
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Run { input, size, max_steps, show_tokens, show_ast } => {
            let config = RunConfig::default().with_canvas_size(size).with_max_steps(max_steps);
            run(&input, &config, show_tokens, show_ast)
        }
        Commands::Check { input } => check_only(&input),
        Commands::Tokens { input } => tokens(&input),
    };

    process::exit(code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Reads a file, or stdin up to the first empty line when `input` is `-`.
fn read_source(input: &str) -> Result<String, Error> {
    if input != "-" {
        return Ok(fs::read_to_string(input)?);
    }

    let mut source = String::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.is_empty() {
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }
    Ok(source)
}

fn run(input: &str, config: &RunConfig, show_tokens: bool, show_ast: bool) -> i32 {
    let program = match load(input, show_tokens) {
        Ok(program) => program,
        Err(error) => return report(&error),
    };

    if show_ast {
        println!("=== AST ===");
        println!("{:#?}", program.statements);
    }

    let mut interpreter = match Interpreter::new(&program, config.canvas_size) {
        Ok(interpreter) => interpreter.with_step_limit(config.max_steps),
        Err(error) => return report(&Error::Runtime(error)),
    };

    let result = interpreter.execute();
    print_canvas(interpreter.canvas(), interpreter.palette());

    match result {
        Ok(()) => 0,
        Err(error) => report(&Error::Runtime(error)),
    }
}

fn load(input: &str, show_tokens: bool) -> Result<Program, Error> {
    let source = read_source(input)?;

    if show_tokens {
        println!("=== TOKENS ===");
        let (tokens, _) = lexer::tokenize(&source);
        for token in &tokens {
            println!("{}", token);
        }
    }

    check(&source)
}

fn check_only(input: &str) -> i32 {
    match read_source(input).and_then(|source| check(&source)) {
        Ok(program) => {
            println!("OK: {} statement(s), {} label(s)", program.len(), program.labels.len());
            0
        }
        Err(error) => report(&error),
    }
}

fn tokens(input: &str) -> i32 {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(error) => return report(&error),
    };

    let (tokens, errors) = lexer::tokenize(&source);
    for token in &tokens {
        println!("{}", token);
    }

    if errors.is_empty() { 0 } else { report(&Error::Lex(errors)) }
}

fn print_canvas(canvas: &Canvas, palette: &Palette) {
    println!("{}", canvas);

    let mut codes: Vec<ColorCode> = canvas.rows().flatten().copied().filter(|&code| code != BLANK).collect();
    codes.sort_unstable();
    codes.dedup();

    let used: Vec<&str> = codes.into_iter().filter_map(|code| palette.name(code)).collect();
    if !used.is_empty() {
        println!("Colors: {}", used.join(", "));
    }
}

/// Prints every message under its stage heading; returns the exit code.
fn report(error: &Error) -> i32 {
    let heading = match error {
        Error::Lex(_) => "Lexical errors:",
        Error::Syntax(_) => "Syntax errors:",
        Error::Semantic(_) => "Semantic errors:",
        Error::Runtime(_) => "Runtime error:",
        Error::Io { .. } => "IO error:",
    };

    eprintln!("{}", heading);
    for message in error.messages() {
        eprintln!("  {}", message);
    }
    1
}
