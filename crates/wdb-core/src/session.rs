//! Sessions and script sourcing.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::database::{Database, StatementOutcome};
use crate::error::Error;
use wdb_proto::Statement;

/// Turns script text into statements.
///
/// The engine does not depend on the statement language; a session is given
/// a reader that does the parsing.
pub trait ScriptReader {
    /// One entry per statement. A statement that cannot be parsed is an
    /// `Err` holding a printable message.
    fn read_script(&self, source: &str) -> Vec<Result<Statement, String>>;
}

/// A statement in a sourced file that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// File the statement was read from.
    pub path: String,
    /// 1-based position of the statement in its file.
    pub statement: usize,
    pub message: String,
}

/// Outcome of sourcing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub path: String,
    /// Statements committed, including those of nested sources.
    pub executed: usize,
    pub failures: Vec<SourceFailure>,
}

impl SourceReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            executed: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every statement succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A database together with the reader used for `source` statements.
pub struct Session<R> {
    db: Database,
    reader: R,
    /// Files currently being sourced, outermost first.
    sourcing: Vec<PathBuf>,
}

impl<R: ScriptReader> Session<R> {
    pub fn new(db: Database, reader: R) -> Self {
        Self {
            db,
            reader,
            sourcing: Vec::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Execute a statement, handling `source` here and everything else in
    /// the database.
    pub fn execute(&mut self, statement: &Statement) -> Result<StatementOutcome, Error> {
        match statement {
            Statement::Source(source) => self
                .source(Path::new(&source.filename))
                .map(StatementOutcome::Sourced),
            other => self.db.execute(other),
        }
    }

    /// Run every statement of a file, each in its own transaction.
    ///
    /// Failed statements are recorded and do not stop the file. Statements
    /// already committed stay committed.
    pub fn source(&mut self, path: &Path) -> Result<SourceReport, Error> {
        let unreadable = |source| Error::Script {
            path: path.display().to_string(),
            source,
        };
        // Compare resolved paths so `./a.wdb` and `a.wdb` are the same file.
        let resolved = std::fs::canonicalize(path).map_err(unreadable)?;
        if self.sourcing.contains(&resolved) {
            return Err(Error::Unsupported(format!(
                "recursive source of '{}'",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(&resolved).map_err(unreadable)?;

        self.sourcing.push(resolved);
        let mut report = SourceReport::new(path);
        for (index, parsed) in self.reader.read_script(&text).into_iter().enumerate() {
            let result = match parsed {
                Ok(statement) => self.execute(&statement).map_err(|e| e.to_string()),
                Err(message) => Err(message),
            };
            match result {
                Ok(StatementOutcome::Sourced(nested)) => {
                    report.executed += nested.executed;
                    report.failures.extend(nested.failures);
                }
                Ok(_) => report.executed += 1,
                Err(message) => {
                    warn!(path = %report.path, statement = index + 1, error = %message, "sourced statement failed");
                    report.failures.push(SourceFailure {
                        path: report.path.clone(),
                        statement: index + 1,
                        message,
                    });
                }
            }
        }
        self.sourcing.pop();

        info!(
            path = %report.path,
            executed = report.executed,
            failed = report.failures.len(),
            "script sourced"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use std::io::Write;
    use wdb_proto::{Assignment, ClassDef, InsertQuery, ScalarSpec, ScalarType};

    /// Reads one statement per non-empty line from a tiny fixed vocabulary.
    struct LineReader;

    impl ScriptReader for LineReader {
        fn read_script(&self, source: &str) -> Vec<Result<Statement, String>> {
            source
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|line| match line.trim() {
                    "class" => Ok(ClassDef::new("item")
                        .with_attribute(ScalarSpec::new("n", ScalarType::Integer))
                        .into()),
                    "insert" => Ok(InsertQuery::new("item")
                        .with_assignment(Assignment::scalar("n", 1))
                        .into()),
                    "bad" => Ok(InsertQuery::new("item")
                        .with_assignment(Assignment::scalar("n", "one"))
                        .into()),
                    other => match other.strip_prefix("source ") {
                        Some(file) => Ok(Statement::Source(wdb_proto::SourceQuery {
                            filename: file.to_string(),
                        })),
                        None => Err(format!("cannot parse '{}'", other)),
                    },
                })
                .collect()
        }
    }

    fn session() -> Session<LineReader> {
        let db = Database::open(DatabaseConfig::temporary()).unwrap();
        Session::new(db, LineReader)
    }

    fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_failures_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let path = script(&dir, "a.wdb", "class\ninsert\nbad\n???\ninsert\n");
        let mut session = session();

        let report = session.source(&path).unwrap();
        assert_eq!(report.executed, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].statement, 3);
        assert_eq!(report.failures[1].statement, 4);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_nested_source() {
        let dir = tempfile::tempdir().unwrap();
        let inner = script(&dir, "inner.wdb", "class\n");
        let outer = script(
            &dir,
            "outer.wdb",
            &format!("source {}\ninsert\n", inner.display()),
        );
        let mut session = session();

        let report = session.source(&outer).unwrap();
        assert_eq!(report.executed, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_recursive_source_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("self.wdb");
        let body = format!("class\nsource {}\n", path.display());
        script(&dir, "self.wdb", &body);
        let mut session = session();

        let report = session.source(&path).unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("recursive source"));
    }

    #[test]
    fn test_recursive_source_under_another_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wdb");
        let alias = dir.path().join(".").join("a.wdb");
        script(&dir, "a.wdb", &format!("insert\nsource {}\n", alias.display()));
        let mut session = session();
        let item = ClassDef::new("item").with_attribute(ScalarSpec::new("n", ScalarType::Integer));
        session.execute(&item.into()).unwrap();

        let report = session.source(&path).unwrap();
        assert_eq!(report.executed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("recursive source"));

        let StatementOutcome::Retrieved(items) = session
            .execute(&wdb_proto::RetrieveQuery::new("item").into())
            .unwrap()
        else {
            panic!("expected retrieve");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let mut session = session();
        let err = session.source(Path::new("/nonexistent/x.wdb")).unwrap_err();
        assert!(matches!(err, Error::Script { .. }));
    }
}
