//! Tab completion for the REPL.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// WDB REPL helper with completion support.
pub struct WdbHelper {
    /// Class names from the committed catalog.
    pub classes: Vec<String>,
}

impl WdbHelper {
    /// Create a new helper with empty class list.
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Update the class list.
    pub fn set_classes(&mut self, classes: Vec<String>) {
        self.classes = classes;
    }
}

impl Default for WdbHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot-commands for completion.
const DOT_COMMANDS: &[&str] = &[
    ".schema",
    ".describe",
    ".format",
    ".history",
    ".clear",
    ".help",
    ".exit",
    ".quit",
];

/// Statement keywords.
const KEYWORDS: &[&str] = &[
    "class", "subclass", "of", "insert", "from", "modify", "retrieve", "where", "with",
    "include", "exclude", "inverse", "distinct", "required", "default", "source", "index", "on",
    "and", "or", "not", "true", "false", "null", "string", "integer", "boolean",
];

impl WdbHelper {
    fn candidates(&self, line_to_cursor: &str, word: &str) -> Vec<Pair> {
        let word = word.to_lowercase();
        let mut completions = Vec::new();

        // Dot commands at start of line, and class names after .describe
        if let Some(rest) = line_to_cursor.trim_start().strip_prefix(".describe ") {
            for class in &self.classes {
                if class.starts_with(rest.trim()) {
                    completions.push(pair(class));
                }
            }
            return completions;
        }
        if line_to_cursor.trim_start().starts_with('.') {
            for cmd in DOT_COMMANDS {
                if cmd.starts_with(line_to_cursor.trim()) {
                    completions.push(pair(cmd));
                }
            }
            return completions;
        }

        if word.is_empty() {
            return completions;
        }
        for class in &self.classes {
            if class.starts_with(&word) {
                completions.push(pair(class));
            }
        }
        for kw in KEYWORDS {
            if kw.starts_with(&word) {
                completions.push(pair(kw));
            }
        }
        completions
    }
}

fn pair(text: &str) -> Pair {
    Pair {
        display: text.to_string(),
        replacement: text.to_string(),
    }
}

impl Completer for WdbHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        if line_to_cursor.trim_start().starts_with('.') && !line_to_cursor.contains(' ') {
            return Ok((0, self.candidates(line_to_cursor, "")));
        }

        // Find the start of the current word
        let word_start = line_to_cursor
            .rfind(|c: char| c.is_whitespace() || "(),.=".contains(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line_to_cursor[word_start..];

        Ok((word_start, self.candidates(line_to_cursor, word)))
    }
}

impl Hinter for WdbHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for WdbHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: rustyline::highlight::CmdKind) -> bool {
        false
    }
}

impl Validator for WdbHelper {}

impl Helper for WdbHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: Vec<Pair>) -> Vec<String> {
        pairs.into_iter().map(|p| p.replacement).collect()
    }

    #[test]
    fn test_dot_commands() {
        let helper = WdbHelper::new();
        assert_eq!(names(helper.candidates(".sc", "")), vec![".schema"]);
        assert_eq!(names(helper.candidates(".e", "")), vec![".exit"]);
    }

    #[test]
    fn test_class_and_keyword_completion() {
        let mut helper = WdbHelper::new();
        helper.set_classes(vec!["person".to_string(), "project".to_string()]);
        assert_eq!(
            names(helper.candidates("retrieve pe", "pe")),
            vec!["person"]
        );
        assert_eq!(names(helper.candidates("ret", "RET")), vec!["retrieve"]);
        assert_eq!(
            names(helper.candidates(".describe pro", "pro")),
            vec!["project"]
        );
    }
}
