//! A tiny recursive-descent parser for the parenthesized argument lists that
//! appear in doc-comment directive tags, e.g. `(table: "users", order: ASC)`.
//!
//! The grammar is deliberately rigid: names match `[A-Za-z][A-Za-z0-9_]*`,
//! values are single-line quoted strings (with backslash escapes) or bare
//! alphanumeric/dot tokens containing at least one letter. Anything else is a
//! positioned error.

use indexmap::IndexMap;

/// Ordered argument map, in source order.
pub type Arguments = IndexMap<String, ArgumentValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    /// A quoted string literal, with escapes resolved.
    String(String),
    /// A bare token such as `true`, `ASC` or `users.id`.
    Bare(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveParseError {
    #[error("expected `{expected}` at offset {offset}, found `{found}`")]
    Expected {
        expected: char,
        found: char,
        offset: usize,
    },
    #[error("unexpected end of input while looking for `{expected}`")]
    UnexpectedEnd { expected: char },
    #[error("argument name must start with a letter, found `{found}` at offset {offset}")]
    InvalidName { found: char, offset: usize },
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("string literal starting at offset {offset} spans a line break")]
    LineBreakInString { offset: usize },
    #[error("expected a value at offset {offset}, found `{found}`")]
    ExpectedValue { found: char, offset: usize },
    #[error("invalid bare value `{token}` at offset {offset}: bare values must contain a letter and must not be numeric")]
    InvalidBareValue { token: String, offset: usize },
    #[error("duplicate argument name `{name}`")]
    DuplicateArgument { name: String },
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

/// Parses a full `(name: value, ...)` argument list. The empty list `()` is
/// valid and produces an empty map.
pub fn parse_arguments(input: &str) -> Result<Arguments, DirectiveParseError> {
    let mut cursor = Cursor { input, pos: 0 };
    let mut arguments = Arguments::new();

    cursor.skip_ws();
    cursor.expect('(')?;
    cursor.skip_ws();

    if cursor.peek() != Some(')') {
        loop {
            cursor.skip_ws();
            let name = cursor.parse_name()?;
            cursor.skip_ws();
            cursor.expect(':')?;
            cursor.skip_ws();
            let value = cursor.parse_value()?;

            if arguments.insert(name.clone(), value).is_some() {
                return Err(DirectiveParseError::DuplicateArgument { name });
            }

            cursor.skip_ws();
            match cursor.peek() {
                Some(',') => {
                    cursor.bump();
                }
                Some(')') => break,
                Some(found) => {
                    return Err(DirectiveParseError::Expected {
                        expected: ',',
                        found,
                        offset: cursor.pos,
                    })
                }
                None => return Err(DirectiveParseError::UnexpectedEnd { expected: ')' }),
            }
        }
    }

    cursor.expect(')')?;
    cursor.skip_ws();
    if cursor.peek().is_some() {
        return Err(DirectiveParseError::TrailingInput { offset: cursor.pos });
    }

    Ok(arguments)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.pos += next.len_utf8();
        Some(next)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), DirectiveParseError> {
        match self.peek() {
            Some(found) if found == expected => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(DirectiveParseError::Expected {
                expected,
                found,
                offset: self.pos,
            }),
            None => Err(DirectiveParseError::UnexpectedEnd { expected }),
        }
    }

    fn parse_name(&mut self) -> Result<String, DirectiveParseError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {}
            Some(found) => {
                return Err(DirectiveParseError::InvalidName {
                    found,
                    offset: self.pos,
                })
            }
            None => return Err(DirectiveParseError::UnexpectedEnd { expected: ')' }),
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    fn parse_value(&mut self) -> Result<ArgumentValue, DirectiveParseError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => self.parse_string(quote).map(ArgumentValue::String),
            Some(c) if c.is_ascii_alphanumeric() || c == '.' => {
                self.parse_bare().map(ArgumentValue::Bare)
            }
            Some(found) => Err(DirectiveParseError::ExpectedValue {
                found,
                offset: self.pos,
            }),
            None => Err(DirectiveParseError::UnexpectedEnd { expected: ')' }),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, DirectiveParseError> {
        let start = self.pos;
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\n') => return Err(DirectiveParseError::LineBreakInString { offset: start }),
                Some('\\') => match self.bump() {
                    Some('\n') | None => {
                        return Err(DirectiveParseError::UnterminatedString { offset: start })
                    }
                    Some(escaped) => value.push(escaped),
                },
                Some(c) => value.push(c),
                None => return Err(DirectiveParseError::UnterminatedString { offset: start }),
            }
        }
    }

    fn parse_bare(&mut self) -> Result<String, DirectiveParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '.') {
            self.bump();
        }
        let token = &self.input[start..self.pos];

        // A bare token needs at least one letter, and tokens that still parse
        // as numbers (`1e5`) are ambiguous and rejected.
        let has_letter = token.chars().any(|c| c.is_ascii_alphabetic());
        if !has_letter || token.parse::<f64>().is_ok() {
            return Err(DirectiveParseError::InvalidBareValue {
                token: token.to_owned(),
                offset: start,
            });
        }

        Ok(token.to_owned())
    }
}
