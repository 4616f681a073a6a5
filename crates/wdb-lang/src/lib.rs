//! WDB statement language.
//!
//! This crate turns statement text into the [`wdb_proto::Statement`] IR
//! executed by the engine.
//!
//! # Syntax
//!
//! ## Schema
//!
//! ```text
//! class person "people we know" (name: string required, age: integer default 0);
//! subclass employee of person (salary: integer);
//! class worker (name: string, dept: dept inverse staff required);
//! class team (members: worker[10] distinct inverse teams[*]);
//! ```
//!
//! A relationship with no brackets is single-valued; `[*]` is unbounded and
//! `[n]` allows at most `n` targets.
//!
//! ## Updates
//!
//! ```text
//! insert person (name = "Alice", age = 30);
//! insert employee from person where name = "Alice" (salary = 100);
//! modify worker where name = "Bob" (dept = dept with (name = "R&D"));
//! modify worker where name = "Bob" (teams = include team, leads = exclude team);
//! ```
//!
//! ## Queries and scripts
//!
//! ```text
//! retrieve person where age > 18 and not name = "Bob" (name, dept.name, dept.*);
//! source "schema.wdb";
//! ```
//!
//! # Usage
//!
//! ```rust
//! use wdb_lang::{parse, parse_script};
//!
//! let stmt = parse("retrieve person where age > 18 (name)").unwrap();
//! assert_eq!(stmt.kind(), "retrieve");
//!
//! let results = parse_script("class a (); insert a;");
//! assert_eq!(results.len(), 2);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use error::ParseError;
pub use span::{Span, Spanned};
pub use wdb_proto::Statement;

/// Parse exactly one statement. A trailing `;` is optional.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    parser::parse(source)
}

/// Parse every statement of a script, one result per statement.
pub fn parse_script(source: &str) -> Vec<Result<Statement, ParseError>> {
    parser::parse_script(source)
}

/// Tokenize a source string (for debugging/testing).
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_source_context() {
        let source = "insert person (name = )";
        let err = parse(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1"));
        assert!(formatted.contains("expected literal value"));
    }

    #[test]
    fn test_unexpected_character() {
        let err = parse("retrieve person where age > 3 # 4").unwrap_err();
        assert!(err.message.contains("unexpected character '#'"));
    }

    #[test]
    fn test_script_with_comments() {
        let source = "-- schema\nclass a (x: integer);\n-- data\ninsert a (x = 1);\n";
        let results = parse_script(source);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }
}
