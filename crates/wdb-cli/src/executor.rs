//! Statement execution.

use crate::formatter::Formatter;
use thiserror::Error;
use wdb_core::{Database, DatabaseConfig, ScriptReader, Session};
use wdb_proto::Statement;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Syntax error, already rendered against the source.
    #[error("{0}")]
    Parse(String),

    /// The engine rejected the statement.
    #[error("{0}")]
    Engine(#[from] wdb_core::Error),
}

/// Parses sourced scripts with the statement language.
pub struct LangReader;

impl ScriptReader for LangReader {
    fn read_script(&self, source: &str) -> Vec<Result<Statement, String>> {
        wdb_lang::parse_script(source)
            .into_iter()
            .map(|result| result.map_err(|e| e.format_with_source(source)))
            .collect()
    }
}

/// Session type used by the shell.
pub type Shell = Session<LangReader>;

/// Open the database and wrap it in a session.
pub fn open(config: DatabaseConfig) -> Result<Shell, ExecuteError> {
    let db = Database::open(config)?;
    Ok(Session::new(db, LangReader))
}

/// Execute one statement and return formatted output.
pub fn execute(
    session: &mut Shell,
    input: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let statement =
        wdb_lang::parse(input).map_err(|e| ExecuteError::Parse(e.format_with_source(input)))?;
    let outcome = session.execute(&statement)?;
    Ok(formatter.format_outcome(&outcome))
}

/// Execute every statement of a script, one result per statement.
///
/// A failed statement does not stop the ones after it.
pub fn execute_script(
    session: &mut Shell,
    source: &str,
    formatter: &dyn Formatter,
) -> Vec<Result<String, ExecuteError>> {
    LangReader
        .read_script(source)
        .into_iter()
        .map(|parsed| -> Result<String, ExecuteError> {
            let statement = parsed.map_err(ExecuteError::Parse)?;
            let outcome = session.execute(&statement)?;
            Ok(formatter.format_outcome(&outcome))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{create_formatter, OutputFormat};

    fn shell() -> Shell {
        open(DatabaseConfig::temporary()).unwrap()
    }

    #[test]
    fn test_execute_statements() {
        let mut session = shell();
        let formatter = create_formatter(OutputFormat::Plain);

        let output = execute(&mut session, "class person (name: string);", &*formatter).unwrap();
        assert_eq!(output, "class person defined");

        let output = execute(&mut session, r#"insert person (name = "Alice")"#, &*formatter).unwrap();
        assert_eq!(output, "1 vertices inserted");

        let output = execute(&mut session, "retrieve person (name)", &*formatter).unwrap();
        assert_eq!(output, "name->Alice");
    }

    #[test]
    fn test_parse_error_is_rendered() {
        let mut session = shell();
        let formatter = create_formatter(OutputFormat::Plain);
        let err = execute(&mut session, "insert person (name = )", &*formatter).unwrap_err();
        assert!(matches!(err, ExecuteError::Parse(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_script_continues_after_failure() {
        let mut session = shell();
        let formatter = create_formatter(OutputFormat::Plain);
        let results = execute_script(
            &mut session,
            "class a (x: integer); insert b; insert a (x = 1);",
            &*formatter,
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ExecuteError::Engine(_))));
        assert!(results[2].is_ok());
    }
}
