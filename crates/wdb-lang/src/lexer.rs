//! Lexer for the WDB statement language using logos.
//!
//! Keywords are case-insensitive. Identifiers keep their spelling; the
//! engine lower-cases class and attribute names.

use crate::span::Span;
use logos::Logos;

/// Token types for the statement language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Line comment
    #[regex(r"--[^\n]*", logos::skip)]
    Comment,

    // Statement keywords
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("subclass", ignore(ascii_case))]
    Subclass,
    #[token("of", ignore(ascii_case))]
    Of,
    #[token("insert", ignore(ascii_case))]
    Insert,
    #[token("from", ignore(ascii_case))]
    From,
    #[token("modify", ignore(ascii_case))]
    Modify,
    #[token("retrieve", ignore(ascii_case))]
    Retrieve,
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("source", ignore(ascii_case))]
    Source,
    #[token("index", ignore(ascii_case))]
    Index,
    #[token("on", ignore(ascii_case))]
    On,

    // Attribute modifiers
    #[token("required", ignore(ascii_case))]
    Required,
    #[token("default", ignore(ascii_case))]
    Default,
    #[token("distinct", ignore(ascii_case))]
    Distinct,
    #[token("inverse", ignore(ascii_case))]
    Inverse,

    // Relationship assignment modes
    #[token("include", ignore(ascii_case))]
    Include,
    #[token("exclude", ignore(ascii_case))]
    Exclude,
    #[token("with", ignore(ascii_case))]
    With,

    // Logical operators
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,

    // Literals
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("null", ignore(ascii_case))]
    Null,

    // Comparison operators
    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // String literal (double-quoted)
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    // String literal (single-quoted)
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    StringSingle(String),

    // Integer literal
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    // Punctuation
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("*")]
    Star,
}

impl Token {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::String(s) | Token::StringSingle(s) => format!("string \"{}\"", s),
            Token::Int(i) => format!("integer {}", i),
            Token::Semicolon => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Colon => "':'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Ne => "'<>'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            other => format!("keyword '{}'", format!("{:?}", other).to_lowercase()),
        }
    }
}

/// Unescape a string literal, handling common escape sequences.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
///
/// Unrecognised input is skipped; the span of the first such region is kept
/// so the parser can report it.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<SpannedToken>>,
    invalid: Option<Span>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
            invalid: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    /// Take the span of unrecognised input seen so far, if any.
    pub fn take_invalid(&mut self) -> Option<Span> {
        self.invalid.take()
    }

    fn next_inner(&mut self) -> Option<SpannedToken> {
        loop {
            match self.inner.next() {
                Some(Ok(token)) => {
                    return Some(SpannedToken {
                        token,
                        span: self.inner.span().into(),
                    });
                }
                Some(Err(())) => {
                    if self.invalid.is_none() {
                        self.invalid = Some(self.inner.span().into());
                    }
                    continue;
                }
                None => return None,
            }
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}
