mod commands;
mod completion;
mod config;
mod logging;
mod output;
mod redirection;
mod search_path;
mod tokenize;

use crate::completion::ShellCompleter;
use crate::config::Config;
use crate::redirection::parse_command;
use crate::tokenize::tokenize;
use anyhow::Result;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::io::{self, IsTerminal, Write};
use std::process;

const PROMPT: &str = "$ ";

type LineEditor = Editor<ShellCompleter, DefaultHistory>;

fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(&config);

    let mut editor = LineEditor::new()?;
    editor.set_helper(Some(ShellCompleter::new()));
    if let Some(history) = &config.history_file
        && let Err(e) = editor.load_history(history)
    {
        log::debug!("no history loaded from {}: {}", history.display(), e);
    }

    let interactive = io::stdin().is_terminal();
    loop {
        let line = match read_line(&mut editor, interactive) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => {
                log::debug!("input closed: {}", e);
                shutdown(&mut editor, &config, 1);
            }
        };
        if !line.trim().is_empty()
            && let Err(e) = editor.add_history_entry(line.as_str())
        {
            log::warn!("failed to record history: {}", e);
        }

        if let Some(code) = run_line(&line) {
            shutdown(&mut editor, &config, code);
        }
    }
}

/// Reads a line after the `$ ` prompt.
///
/// rustyline only draws the prompt on a terminal, so piped input gets it
/// written to stdout directly.
fn read_line(editor: &mut LineEditor, interactive: bool) -> rustyline::Result<String> {
    if interactive {
        return editor.readline(PROMPT);
    }
    let mut stdout = io::stdout();
    if let Err(e) = stdout
        .write_all(PROMPT.as_bytes())
        .and_then(|()| stdout.flush())
    {
        log::warn!("failed to write prompt: {}", e);
    }
    editor.readline("")
}

/// Runs one input line, returning the exit code if `exit` was requested.
fn run_line(line: &str) -> Option<i32> {
    let tokens = tokenize(line);
    if tokens.is_empty() {
        return None;
    }

    let parsed = match parse_command(tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            return None;
        }
    };

    let dispatch = match parsed.name() {
        Some(name) => commands::dispatch(name, &parsed.args[1..]),
        None => commands::Dispatch::default(),
    };

    // Redirections are written before an `exit` takes effect.
    if let Err(e) = output::multiplex(
        &dispatch.records,
        &parsed.redirections,
        &mut io::stdout(),
        &mut io::stderr(),
    ) {
        log::warn!("failed to write output: {}", e);
    }
    dispatch.exit
}

fn shutdown(editor: &mut LineEditor, config: &Config, code: i32) -> ! {
    if let Some(history) = &config.history_file
        && let Err(e) = editor.save_history(history)
    {
        log::warn!("failed to save history to {}: {}", history.display(), e);
    }
    process::exit(code)
}
