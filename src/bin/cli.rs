//! Tabstore - interactive shell

use std::env;

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{error, info};

use tabstore::logging::init_logging;
use tabstore::shell::{render, Command, Session};
use tabstore::{Config, Error};

/// Print welcome banner
fn print_banner(session: &Session) {
    println!(
        r#"
 Tabstore - in-memory tables, records and queries
 Loaded {} table(s) from {}
 Type '.help' for help, '.quit' to exit
"#,
        session.store().len(),
        session.config().data_path.display()
    );
}

fn input_error(e: ReadlineError) -> Error {
    Error::InvalidCommand(format!("input aborted: {}", e))
}

/// Run one command, prompting for field values where needed
fn run_command(session: &mut Session, editor: &mut DefaultEditor, command: &Command) {
    let result = match command {
        Command::Add(table) => session.add_with(table, |field| {
            editor
                .readline(&format!("{}: ", field))
                .map_err(input_error)
        }),
        Command::Edit { table, id } => session.edit_with(table, id, |field, current| {
            editor
                .readline(&format!("{} (current value: {}): ", field, current))
                .map_err(input_error)
        }),
        other => session.execute(other),
    };

    match result {
        Ok(result) => print!("{}", render(&result)),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::new()
        .apply_args(&args)
        .context("reading command line")?;

    init_logging(&config)?;

    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Could not start session");
            return Err(e).context("loading workbook");
        }
    };
    let mut editor = DefaultEditor::new().context("starting line editor")?;

    print_banner(&session);

    loop {
        match editor.readline("tabstore> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str()).ok();
                }
                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => run_command(&mut session, &mut editor, &command),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!(error = %e, "Input failed");
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    info!("Session finished");
    println!("Goodbye!");
    Ok(())
}
