//! Literal syntax for externally supplied input values.
//!
//! Raw values from defaults files, environment variables and the command line
//! are read with a small JSON-like grammar:
//!
//! - `null`, `true`, `false`
//! - integers (`42`, `-3`) and decimals (`1.5`)
//! - quoted strings, with `"` or `'`
//! - arrays `[a, b]` and objects `{key: value}`
//! - anything else is a bare word and reads as a string
//!
//! `a, b` with a top-level comma reads as the array `[a, b]`.

use std::sync::Arc;

use stratus_foundation::{PersistentMap, PersistentVec, Type, Value};
use thiserror::Error;

/// A malformed literal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct LiteralError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into the (possibly wrapped) source.
    pub offset: usize,
}

/// Parses a raw input value.
///
/// Empty text is `null`, which input resolution treats as unset.
///
/// # Errors
/// Returns [`LiteralError`] for unbalanced brackets, unterminated strings and
/// trailing garbage after a bracketed value.
pub fn parse_literal(raw: &str) -> Result<Value, LiteralError> {
    let source = wrap_list(raw);
    let mut parser = Parser::new(&source);
    parser.skip_whitespace();
    if parser.at_end() {
        return Ok(Value::Null);
    }

    let value = parser.value(true)?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error("unexpected text after value"));
    }
    Ok(value)
}

/// Parses a raw value for an input of type `ty`.
///
/// String inputs keep scalar text as written, so `007` stays `"007"` rather
/// than becoming the number 7.
///
/// # Errors
/// Returns [`LiteralError`] when the text is not a valid literal.
pub fn parse_typed(raw: &str, ty: &Type) -> Result<Value, LiteralError> {
    let value = parse_literal(raw)?;
    match (ty, &value) {
        (Type::String, Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
            Ok(Value::from(raw.trim()))
        }
        _ => Ok(value),
    }
}

/// Wraps `a, b` as `[a, b]` when the comma is outside any quotes or brackets.
fn wrap_list(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') || !has_top_level_comma(trimmed) {
        return trimmed.to_string();
    }
    format!("[{trimmed}]")
}

fn has_top_level_comma(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    /// Parses one value. At the top level a bare word runs to the end of the
    /// input; nested, it stops at a delimiter.
    fn value(&mut self, top_level: bool) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some(q @ ('"' | '\'')) => self.quoted(q).map(Value::from),
            Some(_) => {
                let word = self.bare_word(top_level);
                if word.is_empty() {
                    return Err(self.error("expected a value"));
                }
                Ok(scalar(word))
            }
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(']') {
                self.bump();
                break;
            }
            items.push(self.value(false)?);
            if !self.separator(']')? {
                break;
            }
        }
        Ok(Value::Array(items.into_iter().collect::<PersistentVec<_>>()))
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key = match self.peek() {
                Some(q @ ('"' | '\'')) => self.quoted(q)?,
                _ => self.bare_word(false).to_string(),
            };
            if key.is_empty() {
                return Err(self.error("expected an object key"));
            }
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.value(false)?;
            entries.push((Arc::<str>::from(key), value));
            if !self.separator('}')? {
                break;
            }
        }
        Ok(Value::Object(entries.into_iter().collect::<PersistentMap<_, _>>()))
    }

    /// Consumes `,` (returns true, more items follow) or `close` (returns
    /// false).
    fn separator(&mut self, close: char) -> Result<bool, LiteralError> {
        self.skip_whitespace();
        match self.bump() {
            Some(',') => Ok(true),
            Some(c) if c == close => Ok(false),
            Some(c) => Err(self.error(format!("expected `,` or `{close}`, found `{c}`"))),
            None => Err(self.error(format!("unclosed `{}`", opening(close)))),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some(c) => text.push(c),
                    None => break,
                },
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
                None => break,
            }
        }
        Err(LiteralError {
            message: "unterminated string".to_string(),
            offset: start,
        })
    }

    fn bare_word(&mut self, top_level: bool) -> &'a str {
        let rest = self.rest();
        let len = if top_level {
            rest.len()
        } else {
            rest.find([',', ']', '}', ':']).unwrap_or(rest.len())
        };
        self.pos += len;
        rest[..len].trim()
    }
}

fn opening(close: char) -> char {
    if close == ']' { '[' } else { '{' }
}

/// Reads an unquoted word as a keyword, number or string.
fn scalar(word: &str) -> Value {
    match word {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = word.parse::<i64>() {
                Value::Int(n)
            } else if looks_numeric(word) {
                word.parse::<f64>().map_or_else(|_| Value::from(word), Value::Float)
            } else {
                Value::from(word)
            }
        }
    }
}

/// Rejects words `f64::from_str` accepts but users mean as text (`inf`,
/// `NaN`).
fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}
