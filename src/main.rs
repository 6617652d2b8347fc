// ABOUTME: REPL and script-runner entry point

use std::path::PathBuf;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use symex::{Interpreter, Reader};

/// Interpreter for a Lisp/Scheme dialect built on symbolic expressions
#[derive(Parser, Debug)]
#[command(name = "symex")]
#[command(version)]
#[command(about = "An embeddable S-expression interpreter")]
struct CliArgs {
    /// Script file to execute (starts a REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Evaluate a single expression and print its value
    #[arg(short = 'e', long = "eval", value_name = "FORM")]
    expr: Option<String>,

    /// Skip loading the standard prelude
    #[arg(long = "no-prelude")]
    no_prelude: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = CliArgs::parse();

    let mut interp = if args.no_prelude {
        Interpreter::without_prelude()?
    } else {
        Interpreter::new()?
    };

    if let Some(src) = args.expr {
        let value = interp.eval_str(&src)?;
        println!("{value}");
        return Ok(());
    }

    if let Some(path) = args.script {
        let src = std::fs::read_to_string(&path)?;
        interp.eval_str(&src)?;
        return Ok(());
    }

    repl(&mut interp)
}

fn repl(interp: &mut Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    let history_file = ".symex_history";
    let _ = rl.load_history(history_file);

    println!("symex {}", env!("CARGO_PKG_VERSION"));
    println!("Type forms at the prompt; Ctrl-D exits.");

    loop {
        match rl.readline("symex> ") {
            Ok(line) => {
                // one line may hold several forms; evaluate each in
                // isolation so a failure does not abort the session
                for form in Reader::new(&line) {
                    let result = form.and_then(|form| interp.eval_object(&form));
                    match result {
                        Ok(value) => println!("=> {value}"),
                        Err(err) => {
                            eprintln!("error: {err}");
                            break;
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
