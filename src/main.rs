use std::collections::HashMap;
use std::fs;

use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as ReplResult};

use stackeval::{literal, Config, Evaluator, Macros, Operators, Value, Word};

struct Options {
    env: HashMap<String, Value>,
    config: Config,
    scripts: Vec<String>,
}

fn main() -> Result<(), String> {
    init_tracing();
    let options = parse_args(std::env::args().skip(1));
    let operators = Operators::new();
    let macros = Macros::standard();
    let evaluator = Evaluator::new(&options.env, &operators)
        .with_macros(&macros)
        .with_config(options.config);
    if options.scripts.is_empty() {
        run_repl(&evaluator).map_err(|e| e.to_string())?;
    } else {
        for script in &options.scripts {
            run_script(&evaluator, script)?;
        }
    }
    Ok(())
}

/// Enable with `RUST_LOG=stackeval=debug` or `RUST_LOG=stackeval=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// `NAME=VALUE` seeds the environment, `--raw` keeps trailing references
/// unresolved, anything else is a script file.
fn parse_args(args: impl Iterator<Item = String>) -> Options {
    let mut options = Options {
        env: HashMap::new(),
        config: Config::default(),
        scripts: vec![],
    };
    for arg in args {
        if arg == "--raw" {
            options.config = options.config.with_resolve_trailing(false);
        } else if let Some((name, value)) = arg.split_once('=') {
            let value = literal(value).unwrap_or_else(|| Value::from(value));
            options.env.insert(name.to_string(), value);
        } else {
            options.scripts.push(arg);
        }
    }
    options
}

fn run_script(evaluator: &Evaluator, filename: &str) -> Result<(), String> {
    let source = fs::read_to_string(filename)
        .map_err(|e| format!("{filename}: {e}"))?;
    for (lineno, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match evaluator.eval(line) {
            Ok(words) => println!("{}", show(&words)),
            Err(err) => return Err(format!("{filename}:{}: {err}", lineno + 1)),
        }
    }
    Ok(())
}

fn run_repl(evaluator: &Evaluator) -> ReplResult<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                match evaluator.eval(&line) {
                    Ok(words) => println!("{}", show(&words)),
                    Err(err) => println!("Error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn show(words: &[Word]) -> String {
    words
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
