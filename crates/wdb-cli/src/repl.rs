//! Interactive REPL implementation.

use crate::commands::{self, CommandResult};
use crate::completer::WdbHelper;
use crate::executor::{self, Shell};
use crate::formatter::{self, OutputFormat};
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::{Config, Editor};
use std::path::PathBuf;

const PROMPT: &str = "wdb> ";
const CONTINUATION_PROMPT: &str = "  -> ";

/// Get the history file path.
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wdb_history")
}

/// Whether the buffered input ends a statement.
fn is_complete(buffer: &str) -> bool {
    buffer.trim_end().ends_with(';')
}

fn class_names(session: &Shell) -> Vec<String> {
    session
        .database()
        .classes()
        .into_iter()
        .map(|c| c.name)
        .collect()
}

/// Run the interactive REPL.
pub fn run(mut session: Shell, initial_format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut format = initial_format;

    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .build();

    let mut helper = WdbHelper::new();
    helper.set_classes(class_names(&session));
    let mut rl: Editor<WdbHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(helper));

    // Load history
    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    println!("WDB shell - Type .help for commands, .exit to quit\n");

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() {
                    if trimmed.is_empty() {
                        continue;
                    }

                    // Handle dot-commands
                    if commands::is_command(trimmed) {
                        let _ = rl.add_history_entry(trimmed);
                        let formatter = formatter::create_formatter(format);
                        match commands::handle_command(trimmed, session.database(), format, &*formatter) {
                            CommandResult::Exit => {
                                println!("Goodbye!");
                                break;
                            }
                            CommandResult::Output(msg) => println!("{}", msg),
                            CommandResult::SetFormat(fmt) => {
                                format = fmt;
                                println!("Output format set to {}", format);
                            }
                            CommandResult::ShowHistory => {
                                let history = rl.history();
                                let len = history.len();
                                let start = len.saturating_sub(20);
                                for (i, entry) in history.iter().skip(start).enumerate() {
                                    println!("{:4}  {}", start + i + 1, entry);
                                }
                            }
                            CommandResult::Clear => {
                                // ANSI clear screen
                                print!("\x1B[2J\x1B[1;1H");
                            }
                        }
                        continue;
                    }
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);
                if !is_complete(&buffer) {
                    continue;
                }

                let input = std::mem::take(&mut buffer);
                let _ = rl.add_history_entry(input.trim());
                let formatter = formatter::create_formatter(format);
                for result in executor::execute_script(&mut session, &input, &*formatter) {
                    match result {
                        Ok(output) if output.is_empty() => {}
                        Ok(output) => println!("{}", output),
                        Err(e) => println!("{}", formatter.format_error(&e.to_string())),
                    }
                }

                if let Some(helper) = rl.helper_mut() {
                    helper.set_classes(class_names(&session));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                // Broken input stream ends the session
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&hist_path);
    session.database().flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_completion() {
        assert!(is_complete("retrieve person;"));
        assert!(is_complete("insert person (\n  name = \"a\"\n);  "));
        assert!(!is_complete("class person ("));
        assert!(!is_complete(""));
    }
}
