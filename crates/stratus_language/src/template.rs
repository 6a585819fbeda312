//! Interpolated string splitting.
//!
//! `"web-$count"` and `"${vpc.subnets[0].id}"` are split into literal text and
//! reference expressions. Supported forms:
//!
//! - `$name`: an identifier, ending at the first non-identifier character
//! - `${path}`: an identifier followed by `.field`, `[0]` or `["key"]` steps
//! - `$$`: a literal `$`
//!
//! A `$` not followed by `{`, `$` or an identifier start is kept as text.

use thiserror::Error;

use crate::ast::{Expr, TemplatePart};
use crate::build::{idx, ident, int, member, string};

/// A malformed interpolation segment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `${` without a closing `}`.
    #[error("unterminated interpolation starting at byte {0}")]
    Unterminated(usize),
    /// The text between `${` and `}` is not a reference path.
    #[error("invalid interpolation `{text}`: {reason}")]
    InvalidPath {
        /// The text inside the braces.
        text: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Splits `source` into literal and expression parts.
///
/// Adjacent literal text is merged, so `"a$$b"` yields one literal `a$b`.
///
/// # Errors
/// Returns [`TemplateError`] for unterminated or malformed `${...}` segments.
pub fn parse_template(source: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let consumed = if let Some(inner) = after.strip_prefix('{') {
            let close = inner
                .find('}')
                .ok_or(TemplateError::Unterminated(offset + pos))?;
            let expr = parse_path(&inner[..close])?;
            flush(&mut parts, &mut literal);
            parts.push(TemplatePart::Expr(expr));
            close + 2
        } else if after.starts_with('$') {
            literal.push('$');
            1
        } else {
            let len = identifier_len(after);
            if len == 0 {
                literal.push('$');
            } else {
                flush(&mut parts, &mut literal);
                parts.push(TemplatePart::Expr(ident(&after[..len])));
            }
            len
        };

        let advance = pos + 1 + consumed;
        rest = &rest[advance..];
        offset += advance;
    }

    literal.push_str(rest);
    flush(&mut parts, &mut literal);
    Ok(parts)
}

fn flush(parts: &mut Vec<TemplatePart>, literal: &mut String) {
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(std::mem::take(literal)));
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte length of the identifier at the start of `text`, or 0.
fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !is_ident_continue(*c))
        .map_or(text.len(), |(i, _)| i)
}

/// Parses `root(.field | [int] | ["key"])*`.
fn parse_path(text: &str) -> Result<Expr, TemplateError> {
    let invalid = |reason| TemplateError::InvalidPath {
        text: text.to_string(),
        reason,
    };

    let trimmed = text.trim();
    let root_len = identifier_len(trimmed);
    if root_len == 0 {
        return Err(invalid("expected an identifier"));
    }
    let mut expr = ident(&trimmed[..root_len]);
    let mut rest = &trimmed[root_len..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let len = identifier_len(after);
            if len == 0 {
                return Err(invalid("expected a field name after `.`"));
            }
            expr = member(expr, &after[..len]);
            rest = &after[len..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or_else(|| invalid("missing `]`"))?;
            let key = after[..close].trim();
            let index = if let Some(quoted) = key
                .strip_prefix('"')
                .and_then(|k| k.strip_suffix('"'))
            {
                string(quoted)
            } else {
                key.parse::<i64>()
                    .map(int)
                    .map_err(|_| invalid("index must be an integer or quoted key"))?
            };
            expr = idx(expr, index);
            rest = &after[close + 1..];
        } else {
            return Err(invalid("unexpected character"));
        }
    }

    Ok(expr)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn text_without_dollars_is_kept_verbatim(text in "[^$]{1,40}") {
            prop_assert_eq!(parse_template(&text).unwrap(), vec![TemplatePart::Literal(text)]);
        }

        #[test]
        fn escaped_dollars_never_interpolate(words in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let parts = parse_template(&words.join("$$")).unwrap();
            prop_assert_eq!(parts, vec![TemplatePart::Literal(words.join("$"))]);
        }
    }
}
