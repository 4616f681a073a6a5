//! Recursive descent parser for the statement language.

use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};
use wdb_proto::{
    AssignMode, Assignment, AttributePath, AttributeSpec, Cardinality, ClassDef, CompareOp,
    IndexDef, InsertQuery, ModifyQuery, PathTerminal, Predicate, RelationshipSpec,
    RetrieveQuery, ScalarSpec, ScalarType, SourceQuery, Statement, Value,
};

/// Parser for the WDB statement language.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
    /// Last consumed token, used to resynchronise after an error.
    last: Option<Token>,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            last: None,
        }
    }

    /// Parse a single statement, without its terminator.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Class => self.parse_class(false),
            Token::Subclass => self.parse_class(true),
            Token::Insert => self.parse_insert(),
            Token::Modify => self.parse_modify(),
            Token::Retrieve => self.parse_retrieve(),
            Token::Source => self.parse_source(),
            Token::Index => self.parse_index(),
            other => Err(ParseError::new(
                format!("expected a statement, found {}", other.describe()),
                tok.span,
            )
            .with_hint(
                "statements start with class, subclass, insert, modify, retrieve, source or index",
            )),
        }
    }

    /// Parse a class or subclass statement after its keyword.
    fn parse_class(&mut self, subclass: bool) -> Result<Statement, ParseError> {
        let name = self.expect_ident()?;
        let mut class = ClassDef::new(name.value);

        if subclass {
            self.expect_token(Token::Of)?;
            loop {
                class.superclasses.push(self.expect_ident()?.value);
                if !self.eat(&Token::Comma)? {
                    break;
                }
            }
        }

        if self.check_string() {
            class.comment = Some(self.parse_string_literal()?.value);
        }

        self.expect_token(Token::LParen)?;
        if !self.eat(&Token::RParen)? {
            loop {
                class.attributes.push(self.parse_attribute()?);
                if self.eat(&Token::Comma)? {
                    continue;
                }
                self.expect_token(Token::RParen)?;
                break;
            }
        }

        Ok(Statement::ClassDef(class))
    }

    /// Parse `name: type modifiers*`.
    fn parse_attribute(&mut self) -> Result<AttributeSpec, ParseError> {
        let name = self.expect_ident()?;
        self.expect_token(Token::Colon)?;
        let ty = self.expect_ident()?;

        match ScalarType::from_name(&ty.value) {
            Some(scalar) => self.parse_scalar_attribute(name, scalar),
            None => self.parse_relationship_attribute(name, ty),
        }
    }

    fn parse_scalar_attribute(
        &mut self,
        name: Spanned<String>,
        ty: ScalarType,
    ) -> Result<AttributeSpec, ParseError> {
        let mut spec = ScalarSpec::new(name.value, ty);

        while let Some((token, span)) = self.peek_token() {
            match token {
                Token::Required => {
                    self.next_token()?;
                    spec.required = true;
                }
                Token::Default => {
                    self.next_token()?;
                    spec.default = Some(self.parse_literal()?.value);
                }
                Token::String(_) | Token::StringSingle(_) => {
                    spec.comment = Some(self.parse_string_literal()?.value);
                }
                Token::LBracket | Token::Distinct | Token::Inverse => {
                    return Err(ParseError::new(
                        format!(
                            "scalar attribute '{}' cannot take {}",
                            spec.name,
                            token.describe()
                        ),
                        span,
                    )
                    .with_hint("cardinality, distinct and inverse apply to relationship attributes"));
                }
                _ => break,
            }
        }

        Ok(AttributeSpec::Scalar(spec))
    }

    fn parse_relationship_attribute(
        &mut self,
        name: Spanned<String>,
        target: Spanned<String>,
    ) -> Result<AttributeSpec, ParseError> {
        let mut spec = RelationshipSpec::new(name.value.clone(), target.value, "");
        if let Some(cardinality) = self.parse_cardinality()? {
            spec.cardinality = cardinality;
        }

        let mut inverse = None;
        while let Some((token, span)) = self.peek_token() {
            match token {
                Token::Distinct => {
                    self.next_token()?;
                    spec.distinct = true;
                }
                Token::Required => {
                    self.next_token()?;
                    spec.required = true;
                }
                Token::String(_) | Token::StringSingle(_) => {
                    spec.comment = Some(self.parse_string_literal()?.value);
                }
                Token::Inverse => {
                    self.next_token()?;
                    inverse = Some(self.expect_ident()?.value);
                    if let Some(cardinality) = self.parse_cardinality()? {
                        spec.inverse_cardinality = Some(cardinality);
                    }
                    if self.eat(&Token::Distinct)? {
                        spec.inverse_distinct = true;
                    }
                }
                Token::Default => {
                    return Err(ParseError::new(
                        format!("relationship attribute '{}' cannot have a default", spec.name),
                        span,
                    ));
                }
                _ => break,
            }
        }

        match inverse {
            Some(inverse) => {
                spec.inverse = inverse;
                Ok(AttributeSpec::Relationship(spec))
            }
            None => Err(ParseError::new(
                format!(
                    "relationship attribute '{}' to '{}' has no inverse",
                    name.value, spec.target
                ),
                name.span.merge(target.span),
            )
            .with_hint(
                "add 'inverse <name>', or use one of the scalar types boolean, integer, string",
            )),
        }
    }

    /// Parse an optional `[n]` or `[*]`.
    fn parse_cardinality(&mut self) -> Result<Option<Cardinality>, ParseError> {
        if !self.eat(&Token::LBracket)? {
            return Ok(None);
        }

        let cardinality = if self.eat(&Token::Star)? {
            Cardinality::many()
        } else {
            let max = self.expect_int()?;
            match u32::try_from(max.value) {
                Ok(n) if n > 0 => Cardinality::at_most(n),
                _ => {
                    return Err(ParseError::new(
                        format!("cardinality must be a positive integer, found {}", max.value),
                        max.span,
                    ))
                }
            }
        };

        self.expect_token(Token::RBracket)?;
        Ok(Some(cardinality))
    }

    fn parse_insert(&mut self) -> Result<Statement, ParseError> {
        let class = self.expect_ident()?;
        let mut query = InsertQuery::new(class.value);

        if self.eat(&Token::From)? {
            let from = self.expect_ident()?;
            let predicate = self.parse_optional_where()?.unwrap_or(Predicate::True);
            query = query.from_class(from.value, predicate);
        }

        if self.check(&Token::LParen) {
            query.assignments = self.parse_assignments()?;
        }

        Ok(Statement::Insert(query))
    }

    fn parse_modify(&mut self) -> Result<Statement, ParseError> {
        let class = self.expect_ident()?;
        let predicate = self.parse_optional_where()?.unwrap_or(Predicate::True);
        let mut query = ModifyQuery::new(class.value, predicate);
        query.assignments = self.parse_assignments()?;
        Ok(Statement::Modify(query))
    }

    fn parse_retrieve(&mut self) -> Result<Statement, ParseError> {
        let class = self.expect_ident()?;
        let mut query = RetrieveQuery::new(class.value);
        query.predicate = self.parse_optional_where()?;

        if self.eat(&Token::LParen)? {
            loop {
                query.attribute_paths.push(self.parse_path()?);
                if self.eat(&Token::Comma)? {
                    continue;
                }
                self.expect_token(Token::RParen)?;
                break;
            }
        } else {
            query.attribute_paths.push(AttributePath::wildcard());
        }

        Ok(Statement::Retrieve(query))
    }

    /// Parse `a.b.c`, `a.*`, or `*`.
    fn parse_path(&mut self) -> Result<AttributePath, ParseError> {
        if self.eat(&Token::Star)? {
            return Ok(AttributePath::wildcard());
        }

        let mut names = vec![self.expect_ident()?.value];
        let mut terminal = None;
        while self.eat(&Token::Dot)? {
            if self.eat(&Token::Star)? {
                terminal = Some(PathTerminal::Wildcard);
                break;
            }
            names.push(self.expect_ident()?.value);
        }

        let terminal = match terminal {
            Some(t) => t,
            None => match names.pop() {
                Some(last) => PathTerminal::Attribute(last),
                None => PathTerminal::Wildcard,
            },
        };

        Ok(AttributePath {
            hops: names,
            terminal,
        })
    }

    fn parse_source(&mut self) -> Result<Statement, ParseError> {
        let filename = self.parse_string_literal().map_err(|e| {
            e.with_hint("quote the file name, e.g. source \"schema.wdb\"")
        })?;
        Ok(Statement::Source(SourceQuery {
            filename: filename.value,
        }))
    }

    fn parse_index(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_ident()?;
        self.expect_token(Token::On)?;
        let class = self.expect_ident()?;
        self.expect_token(Token::LParen)?;

        let mut attributes = Vec::new();
        loop {
            attributes.push(self.expect_ident()?.value);
            if !self.eat(&Token::Comma)? {
                break;
            }
        }
        self.expect_token(Token::RParen)?;

        Ok(Statement::IndexDef(IndexDef {
            name: name.value,
            class_name: class.value,
            attributes,
        }))
    }

    /// Parse `( assignment, ... )`.
    fn parse_assignments(&mut self) -> Result<Vec<Assignment>, ParseError> {
        self.expect_token(Token::LParen)?;
        let mut assignments = Vec::new();

        if self.eat(&Token::RParen)? {
            return Ok(assignments);
        }

        loop {
            assignments.push(self.parse_assignment()?);
            if self.eat(&Token::Comma)? {
                continue;
            }
            self.expect_token(Token::RParen)?;
            break;
        }

        Ok(assignments)
    }

    /// Parse `attr = literal` or `attr = [include|exclude] class [with (predicate)]`.
    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let attribute = self.expect_ident()?;
        self.expect_token(Token::Eq)?;

        let mode = match self.peek_token() {
            Some((Token::Include, _)) => {
                self.next_token()?;
                AssignMode::Insert
            }
            Some((Token::Exclude, _)) => {
                self.next_token()?;
                AssignMode::Exclude
            }
            Some((Token::Ident(_), _)) => AssignMode::Replace,
            _ => {
                let value = self.parse_literal()?;
                return Ok(Assignment::scalar(attribute.value, value.value));
            }
        };

        let target = self.expect_ident()?;
        let predicate = if self.eat(&Token::With)? {
            self.expect_token(Token::LParen)?;
            let predicate = self.parse_predicate()?;
            self.expect_token(Token::RParen)?;
            predicate
        } else {
            Predicate::True
        };

        Ok(Assignment::relationship(
            attribute.value,
            mode,
            target.value,
            predicate,
        ))
    }

    fn parse_optional_where(&mut self) -> Result<Option<Predicate>, ParseError> {
        if self.eat(&Token::Where)? {
            Ok(Some(self.parse_predicate()?))
        } else {
            Ok(None)
        }
    }

    /// Parse a predicate; `or` binds loosest, then `and`, then `not`.
    pub fn parse_predicate(&mut self) -> Result<Predicate, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.eat(&Token::Or)? {
            children.push(self.parse_and()?);
        }
        Ok(collapse(children, Predicate::Or))
    }

    fn parse_and(&mut self) -> Result<Predicate, ParseError> {
        let mut children = vec![self.parse_not()?];
        while self.eat(&Token::And)? {
            children.push(self.parse_not()?);
        }
        Ok(collapse(children, Predicate::And))
    }

    fn parse_not(&mut self) -> Result<Predicate, ParseError> {
        if self.eat(&Token::Not)? {
            Ok(Predicate::Not(Box::new(self.parse_not()?)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Predicate, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::LParen => {
                let inner = self.parse_predicate()?;
                self.expect_token(Token::RParen)?;
                Ok(inner)
            }
            Token::True => Ok(Predicate::True),
            Token::False => Ok(Predicate::False),
            Token::Ident(attribute) => {
                let op_tok = self.next_token()?;
                let symbol = self
                    .source
                    .get(op_tok.span.start..op_tok.span.end)
                    .unwrap_or_default();
                let op: CompareOp = symbol.parse().map_err(|e: wdb_proto::Error| {
                    ParseError::new(e.to_string(), op_tok.span)
                        .with_hint("operators are =, <>, <, <=, >, >=")
                })?;
                let value = self.parse_literal()?;
                Ok(Predicate::Cond {
                    attribute,
                    op,
                    value: value.value,
                })
            }
            other => Err(ParseError::new(
                format!("expected condition, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    /// Parse a literal value.
    fn parse_literal(&mut self) -> Result<Spanned<Value>, ParseError> {
        let tok = self.next_token()?;
        let value = match tok.token {
            Token::Null => Value::Null,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Int(i) => Value::Int(i),
            Token::String(s) | Token::StringSingle(s) => Value::String(s),
            Token::Eq => {
                return Err(ParseError::new(
                    "expected literal value, found '='",
                    tok.span,
                )
                .with_hint("use '=' for equality"))
            }
            other => {
                return Err(ParseError::new(
                    format!("expected literal value, found {}", other.describe()),
                    tok.span,
                ))
            }
        };

        Ok(Spanned::new(value, tok.span))
    }

    fn parse_string_literal(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::String(s) | Token::StringSingle(s) => Ok(Spanned::new(s, tok.span)),
            other => Err(ParseError::new(
                format!("expected string literal, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected identifier, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn expect_int(&mut self) -> Result<Spanned<i64>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Int(i) => Ok(Spanned::new(i, tok.span)),
            other => Err(ParseError::new(
                format!("expected integer, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if same_kind(&tok.token, &expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {}, found {}", expected.describe(), tok.token.describe()),
                tok.span,
            ))
        }
    }

    /// Whether the next token has the same kind as `expected`.
    fn check(&mut self, expected: &Token) -> bool {
        self.lexer
            .peek()
            .map(|t| same_kind(&t.token, expected))
            .unwrap_or(false)
    }

    fn check_string(&mut self) -> bool {
        matches!(
            self.lexer.peek().map(|t| &t.token),
            Some(Token::String(_)) | Some(Token::StringSingle(_))
        )
    }

    /// Consume the next token if it has the same kind as `expected`.
    fn eat(&mut self, expected: &Token) -> Result<bool, ParseError> {
        if self.check(expected) {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn peek_token(&mut self) -> Option<(Token, Span)> {
        self.lexer.peek().map(|t| (t.token.clone(), t.span))
    }

    /// Get the next token, or an error at end of input or unrecognised input.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        let tok = self.lexer.next_token();
        if let Some(tok) = &tok {
            self.last = Some(tok.token.clone());
        }
        self.check_invalid()?;
        tok.ok_or_else(|| {
            ParseError::new("unexpected end of input", Span::point(self.source.len()))
        })
    }

    fn check_invalid(&mut self) -> Result<(), ParseError> {
        match self.lexer.take_invalid() {
            Some(span) => Err(ParseError::new(
                format!(
                    "unexpected character '{}'",
                    self.source.get(span.start..span.end).unwrap_or("?")
                ),
                span,
            )),
            None => Ok(()),
        }
    }

    /// Whether only whitespace and comments remain.
    fn at_end(&mut self) -> Result<bool, ParseError> {
        let done = self.lexer.peek().is_none();
        self.check_invalid()?;
        Ok(done)
    }

    /// Expect a `;` or the end of input after a statement.
    fn finish_statement(&mut self) -> Result<(), ParseError> {
        if self.at_end()? {
            return Ok(());
        }
        self.expect_token(Token::Semicolon)
            .map(|_| ())
            .map_err(|e| e.with_hint("terminate statements with ';'"))
    }

    /// Skip to just past the next `;` unless one was just consumed.
    fn recover(&mut self) {
        if self.last == Some(Token::Semicolon) {
            return;
        }
        while let Some(tok) = self.lexer.next_token() {
            if tok.token == Token::Semicolon {
                self.last = Some(Token::Semicolon);
                break;
            }
        }
        self.lexer.take_invalid();
    }
}

/// Collapse a single-child list into the child itself.
fn collapse(mut children: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if children.len() == 1 {
        if let Some(only) = children.pop() {
            return only;
        }
    }
    wrap(children)
}

fn same_kind(a: &Token, b: &Token) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Parse exactly one statement, optionally terminated by `;`.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(source);
    let statement = parser.parse_statement()?;
    parser.eat(&Token::Semicolon)?;

    let trailing = parser.lexer.next_token();
    parser.check_invalid()?;
    if let Some(tok) = trailing {
        return Err(ParseError::new(
            format!("unexpected {} after end of statement", tok.token.describe()),
            tok.span,
        ));
    }

    Ok(statement)
}

/// Parse every statement in a script.
///
/// Each statement yields its own result. After a syntax error the parser
/// skips to the next `;` and continues.
pub fn parse_script(source: &str) -> Vec<Result<Statement, ParseError>> {
    let mut parser = Parser::new(source);
    let mut results = Vec::new();

    loop {
        let step = (|| -> Result<Option<Statement>, ParseError> {
            while parser.eat(&Token::Semicolon)? {}
            if parser.at_end()? {
                return Ok(None);
            }
            let statement = parser.parse_statement()?;
            parser.finish_statement()?;
            Ok(Some(statement))
        })();

        match step {
            Ok(Some(statement)) => results.push(Ok(statement)),
            Ok(None) => break,
            Err(e) => {
                results.push(Err(e));
                parser.recover();
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_class() {
        let stmt = parse(
            r#"class person "people" (name: string required, age: integer default 0);"#,
        )
        .unwrap();
        assert_eq!(
            stmt,
            Statement::ClassDef(
                ClassDef::new("person")
                    .with_comment("people")
                    .with_attribute(ScalarSpec::new("name", ScalarType::String).required())
                    .with_attribute(ScalarSpec::new("age", ScalarType::Integer).with_default(0))
            )
        );
    }

    #[test]
    fn test_parse_relationship_attributes() {
        let stmt = parse(
            "class team (members: worker[10] distinct inverse teams[*] distinct required, \
             lead: worker inverse leads)",
        )
        .unwrap();
        let Statement::ClassDef(class) = stmt else {
            panic!("expected class definition");
        };
        assert_eq!(
            class.attributes[0],
            AttributeSpec::Relationship(
                RelationshipSpec::new("members", "worker", "teams")
                    .with_cardinality(Cardinality::at_most(10))
                    .distinct()
                    .with_inverse_cardinality(Cardinality::many())
                    .inverse_distinct()
                    .required()
            )
        );
        assert_eq!(
            class.attributes[1],
            AttributeSpec::Relationship(RelationshipSpec::new("lead", "worker", "leads"))
        );
    }

    #[test]
    fn test_short_type_names_are_class_names() {
        let stmt = parse("class holder (v: int inverse holders)").unwrap();
        let Statement::ClassDef(def) = stmt else {
            panic!("expected class definition");
        };
        assert!(matches!(
            &def.attributes[0],
            AttributeSpec::Relationship(rel) if rel.target == "int" && rel.inverse == "holders"
        ));
    }

    #[test]
    fn test_parse_subclass() {
        let stmt = parse("subclass manager of employee, shareholder (bonus: integer)").unwrap();
        let Statement::ClassDef(class) = stmt else {
            panic!("expected class definition");
        };
        assert_eq!(class.name, "manager");
        assert_eq!(class.superclasses, vec!["employee", "shareholder"]);
        assert_eq!(class.attributes.len(), 1);
    }

    #[test]
    fn test_relationship_without_inverse_is_rejected() {
        let err = parse("class a (b: strng)").unwrap_err();
        assert!(err.message.contains("has no inverse"));
        assert!(err.hint.unwrap().contains("scalar types"));
    }

    #[test]
    fn test_scalar_with_cardinality_is_rejected() {
        let err = parse("class a (b: integer[3])").unwrap_err();
        assert!(err.message.contains("scalar attribute 'b'"));
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse(r#"insert person (name = "Alice", age = 30, active = true)"#).unwrap();
        assert_eq!(
            stmt,
            Statement::Insert(
                InsertQuery::new("person")
                    .with_assignment(Assignment::scalar("name", "Alice"))
                    .with_assignment(Assignment::scalar("age", 30))
                    .with_assignment(Assignment::scalar("active", true))
            )
        );
    }

    #[test]
    fn test_parse_insert_from() {
        let stmt = parse(r#"insert employee from person where name = "Alice" (salary = 10)"#)
            .unwrap();
        assert_eq!(
            stmt,
            Statement::Insert(
                InsertQuery::new("employee")
                    .from_class("person", Predicate::eq("name", "Alice"))
                    .with_assignment(Assignment::scalar("salary", 10))
            )
        );
    }

    #[test]
    fn test_parse_relationship_assignments() {
        let stmt = parse(
            r#"modify worker where name = "Bob" (
                dept = dept with (name = "R&D"),
                teams = include team,
                leads = exclude team with (size > 3 and size < 10)
            )"#,
        )
        .unwrap();
        let Statement::Modify(query) = stmt else {
            panic!("expected modify");
        };
        assert_eq!(query.predicate, Predicate::eq("name", "Bob"));
        assert_eq!(
            query.assignments,
            vec![
                Assignment::relationship(
                    "dept",
                    AssignMode::Replace,
                    "dept",
                    Predicate::eq("name", "R&D")
                ),
                Assignment::relationship("teams", AssignMode::Insert, "team", Predicate::True),
                Assignment::relationship(
                    "leads",
                    AssignMode::Exclude,
                    "team",
                    Predicate::And(vec![Predicate::gt("size", 3), Predicate::lt("size", 10)])
                ),
            ]
        );
    }

    #[test]
    fn test_parse_modify_without_where() {
        let stmt = parse("modify person (age = 1)").unwrap();
        let Statement::Modify(query) = stmt else {
            panic!("expected modify");
        };
        assert_eq!(query.predicate, Predicate::True);
    }

    #[test]
    fn test_parse_retrieve_paths() {
        let stmt = parse("retrieve worker where age > 18 (name, dept.name, dept.*, *)").unwrap();
        assert_eq!(
            stmt,
            Statement::Retrieve(
                RetrieveQuery::new("worker")
                    .with_predicate(Predicate::gt("age", 18))
                    .with_path(AttributePath::attribute("name"))
                    .with_path(AttributePath::attribute("name").through(["dept"]))
                    .with_path(AttributePath::wildcard().through(["dept"]))
                    .with_path(AttributePath::wildcard())
            )
        );
    }

    #[test]
    fn test_retrieve_defaults_to_wildcard() {
        let stmt = parse("retrieve person").unwrap();
        assert_eq!(
            stmt,
            Statement::Retrieve(RetrieveQuery::new("person").with_path(AttributePath::wildcard()))
        );
    }

    #[test]
    fn test_predicate_precedence() {
        let stmt = parse("retrieve p where a = 1 or not b = 2 and c <> null (a)").unwrap();
        let Statement::Retrieve(query) = stmt else {
            panic!("expected retrieve");
        };
        assert_eq!(
            query.predicate,
            Some(Predicate::Or(vec![
                Predicate::eq("a", 1),
                Predicate::And(vec![
                    Predicate::not(Predicate::eq("b", 2)),
                    Predicate::ne("c", Value::Null),
                ]),
            ]))
        );
    }

    #[test]
    fn test_parse_source_and_index() {
        assert_eq!(
            parse(r#"source "schema.wdb";"#).unwrap(),
            Statement::Source(SourceQuery {
                filename: "schema.wdb".to_string()
            })
        );
        assert_eq!(
            parse("index person_name on person (name, age)").unwrap(),
            Statement::IndexDef(IndexDef {
                name: "person_name".to_string(),
                class_name: "person".to_string(),
                attributes: vec!["name".to_string(), "age".to_string()],
            })
        );
    }

    #[test]
    fn test_double_equals_hint() {
        let err = parse("retrieve person where age == 3").unwrap_err();
        assert_eq!(err.hint.as_deref(), Some("use '=' for equality"));
    }

    #[test]
    fn test_operator_symbols() {
        let stmt = parse("retrieve p where a != 1 and b >= 2 (a)").unwrap();
        let Statement::Retrieve(query) = stmt else {
            panic!("expected retrieve");
        };
        assert_eq!(
            query.predicate,
            Some(Predicate::And(vec![
                Predicate::ne("a", 1),
                Predicate::cond("b", CompareOp::Ge, 2),
            ]))
        );

        let err = parse("retrieve p where a like 1").unwrap_err();
        assert_eq!(err.message, "unknown operator 'like'");
        assert_eq!(err.hint.as_deref(), Some("operators are =, <>, <, <=, >, >="));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = parse("retrieve person; retrieve person").unwrap_err();
        assert!(err.message.contains("after end of statement"));
    }

    #[test]
    fn test_parse_script_recovers() {
        let results = parse_script(
            "class a (x: integer);\n\
             insert a (x = );\n\
             insert a (x = 1);;\n\
             retrieve a",
        );
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert!(results[3].is_ok());
    }

    #[test]
    fn test_parse_script_missing_semicolon() {
        let results = parse_script("retrieve a retrieve b; retrieve c;");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }
}
