//! REPL dot-command handling.

use crate::formatter::{Formatter, OutputFormat};
use wdb_core::Database;

/// Result of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Exit the REPL.
    Exit,
    /// Output to display.
    Output(String),
    /// Change the output format.
    SetFormat(OutputFormat),
    /// Show history.
    ShowHistory,
    /// Clear screen.
    Clear,
}

/// Parse and execute a dot-command.
pub fn handle_command(
    line: &str,
    db: &Database,
    format: OutputFormat,
    formatter: &dyn Formatter,
) -> CommandResult {
    let line = line.trim();
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match command.as_str() {
        ".exit" | ".quit" | ".q" => CommandResult::Exit,

        ".help" | ".h" | ".?" => CommandResult::Output(get_help()),

        ".clear" | ".cls" => CommandResult::Clear,

        ".history" => CommandResult::ShowHistory,

        ".format" => match arg {
            Some(name) => match OutputFormat::from_name(name) {
                Some(fmt) => CommandResult::SetFormat(fmt),
                None => CommandResult::Output(format!(
                    "Unknown format '{}'. Use: plain, table, json",
                    name
                )),
            },
            None => CommandResult::Output(format!("Current format: {}", format)),
        },

        ".schema" => CommandResult::Output(formatter.format_schema(&db.classes())),

        ".describe" | ".d" => match arg {
            Some(name) => match db.class(name) {
                Some(class) => CommandResult::Output(formatter.format_class(&class)),
                None => CommandResult::Output(formatter.format_error(&format!(
                    "class '{}' is not defined",
                    name
                ))),
            },
            None => CommandResult::Output("Usage: .describe <class>".to_string()),
        },

        _ => CommandResult::Output(format!("Unknown command: {}", command)),
    }
}

/// Check if a line is a dot-command.
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('.')
}

/// Get help text for REPL commands.
fn get_help() -> String {
    r#"REPL Commands
=============

.schema               List all classes
.describe <class>     Show the attributes of a class
.format [type]        Get or set output format (plain, table, json)
.history              Show statement history
.clear                Clear the screen
.help                 Show this help message
.exit / .quit         Exit the REPL

Statements
==========
Statements end with ';' and may span several lines.

Examples:
  class person (name: string required, age: integer);
  subclass employee of person (salary: integer default 0);
  class worker (name: string, dept: dept inverse staff);
  insert person (name = "Alice", age = 30);
  insert employee from person where name = "Alice" (salary = 100);
  modify worker where name = "Bob" (dept = include dept with (name = "Ops"));
  retrieve person where age > 18 (name, dept.*);
  source "schema.wdb";
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::PlainFormatter;
    use wdb_core::DatabaseConfig;

    fn db() -> Database {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        let stmt = wdb_lang::parse("class person (name: string required)").unwrap();
        db.execute(&stmt).unwrap();
        db
    }

    #[test]
    fn test_is_command() {
        assert!(is_command(".exit"));
        assert!(is_command(".help"));
        assert!(is_command("  .schema"));
        assert!(!is_command("retrieve person;"));
        assert!(!is_command("hello"));
    }

    #[test]
    fn test_format_command() {
        let db = db();
        let result = handle_command(".format json", &db, OutputFormat::Plain, &PlainFormatter);
        assert_eq!(result, CommandResult::SetFormat(OutputFormat::Json));

        let result = handle_command(".format", &db, OutputFormat::Table, &PlainFormatter);
        assert_eq!(result, CommandResult::Output("Current format: table".into()));
    }

    #[test]
    fn test_schema_and_describe() {
        let db = db();
        let result = handle_command(".schema", &db, OutputFormat::Plain, &PlainFormatter);
        assert_eq!(result, CommandResult::Output("person".into()));

        let result = handle_command(".describe Person", &db, OutputFormat::Plain, &PlainFormatter);
        let CommandResult::Output(text) = result else {
            panic!("expected output");
        };
        assert!(text.contains("name: string required"));

        let result = handle_command(".describe nobody", &db, OutputFormat::Plain, &PlainFormatter);
        assert_eq!(
            result,
            CommandResult::Output("Error: class 'nobody' is not defined".into())
        );
    }

    #[test]
    fn test_exit_aliases() {
        let db = db();
        for line in [".exit", ".quit", ".Q"] {
            assert_eq!(
                handle_command(line, &db, OutputFormat::Plain, &PlainFormatter),
                CommandResult::Exit
            );
        }
    }
}
