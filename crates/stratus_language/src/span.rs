//! Source locations carried by AST nodes.
//!
//! The parser fills these in; trees assembled in code use
//! [`Span::synthetic`], which renders as `<generated>` in diagnostics.

use std::fmt;

/// A region of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts; 0 for synthetic spans.
    pub line: u32,
    /// 1-based column number where this span starts; 0 for synthetic spans.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// A span for nodes that were not read from source.
    #[must_use]
    pub const fn synthetic() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Returns true if this span does not point into real source.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.line == 0
    }

    /// Creates a span covering from the start of `self` to the end of `other`.
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        if self.is_synthetic() {
            return other;
        }
        Self {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the source text this span covers, if it lies inside `source`.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<generated>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_spans_display_as_generated() {
        assert!(Span::synthetic().is_synthetic());
        assert_eq!(Span::default().to_string(), "<generated>");
        assert_eq!(Span::new(4, 9, 3, 7).to_string(), "3:7");
    }

    #[test]
    fn to_extends_real_spans() {
        let a = Span::new(0, 5, 1, 1);
        let b = Span::new(8, 12, 1, 9);
        let joined = a.to(b);
        assert_eq!((joined.start, joined.end), (0, 12));
        assert_eq!(Span::synthetic().to(b), b);
    }

    #[test]
    fn text_is_bounds_checked() {
        let source = "resource Vm main";
        assert_eq!(Span::new(9, 11, 1, 10).text(source), Some("Vm"));
        assert_eq!(Span::new(9, 99, 1, 10).text(source), None);
    }
}
