//! Error types for the Stratus system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! error is fatal to the evaluation run that raised it.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout Stratus.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Stratus operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attaches the pretty-printed declaration that failed, unless one is
    /// already present.
    #[must_use]
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        let context = self.context.get_or_insert_with(ErrorContext::new);
        if context.declaration.is_none() {
            context.declaration = Some(declaration.into());
        }
        self
    }

    /// Attaches the offending value.
    #[must_use]
    pub fn with_value(mut self, value: impl fmt::Display) -> Self {
        self.context.get_or_insert_with(ErrorContext::new).value = Some(value.to_string());
        self
    }

    /// Appends a frame to the evaluation stack.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .stack
            .push(frame.into());
        self
    }

    /// Creates a missing input error.
    #[must_use]
    pub fn missing_input(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingInput(name.into()))
    }

    /// Creates an invalid initializer error.
    #[must_use]
    pub fn invalid_init(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInit {
            name: name.into(),
            reason: reason.into(),
        })
    }

    /// Creates a duplicate declaration error.
    #[must_use]
    pub fn declaration_exists(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeclarationExists(name.into()))
    }

    /// Creates a dependency cycle error from the chain of names involved.
    #[must_use]
    pub fn cycle(path: Vec<String>) -> Self {
        Self::new(ErrorKind::Cycle(path))
    }

    /// Creates a decorator validation error.
    #[must_use]
    pub fn decorator(decorator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecoratorValidation {
            decorator: decorator.into(),
            message: message.into(),
        })
    }

    /// Creates an illegal target error.
    #[must_use]
    pub fn illegal_target(decorator: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalTarget {
            decorator: decorator.into(),
            target: target.into(),
        })
    }

    /// Creates an undefined symbol error.
    #[must_use]
    pub fn undefined_symbol(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedSymbol(name.into()))
    }

    /// Creates an unknown property error.
    #[must_use]
    pub fn unknown_property(owner: impl Into<String>, property: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownProperty {
            owner: owner.into(),
            property: property.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this is a cycle error.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self.kind, ErrorKind::Cycle(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An input has no value after exhausting every source.
    #[error("missing value for input `{0}`")]
    MissingInput(String),

    /// A declaration was initialized in a way the language forbids.
    #[error("invalid initializer for `{name}`: {reason}")]
    InvalidInit {
        /// The property, output or input involved.
        name: String,
        /// Why the initializer is rejected.
        reason: String,
    },

    /// A name was declared twice in the same scope or schema.
    #[error("declaration already exists: {0}")]
    DeclarationExists(String),

    /// Resources require each other's immediately available values.
    #[error("dependency cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// A decorator's contract was violated.
    #[error("@{decorator}: {message}")]
    DecoratorValidation {
        /// Decorator name without the `@`.
        decorator: String,
        /// Description of the violation.
        message: String,
    },

    /// A decorator or construct was applied to an unsupported node kind.
    #[error("@{decorator} cannot be applied to {target}")]
    IllegalTarget {
        /// Decorator name without the `@`.
        decorator: String,
        /// Target kind it was applied to.
        target: String,
    },

    /// No decorator with this name is registered.
    #[error("unknown decorator @{0}")]
    UnknownDecorator(String),

    /// Symbol was not defined.
    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    /// A property that the owner does not declare.
    #[error("unknown property `{property}` on {owner}")]
    UnknownProperty {
        /// Schema, struct or component name.
        owner: String,
        /// The property name.
        property: String,
    },

    /// An operation received a value of the wrong type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An external input value could not be parsed.
    #[error("cannot parse input `{name}`: {message}")]
    InputParse {
        /// Input name.
        name: String,
        /// Description of the parse failure.
        message: String,
    },

    /// Reading an input source failed.
    #[error("cannot read {path}: {message}")]
    Io {
        /// The path involved.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// Encoding a report failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// On-demand evaluation nested deeper than the configured limit.
    #[error("evaluation depth limit ({0}) exceeded")]
    DepthExceeded(usize),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Pretty-printed source of the failing declaration.
    pub declaration: Option<String>,
    /// The offending value, rendered.
    pub value: Option<String>,
    /// Declarations being evaluated when the error was raised, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declaration source.
    #[must_use]
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// Sets the offending value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(value) = &self.value {
            writeln!(f, "value: {value}")?;
        }
        if let Some(declaration) = &self.declaration {
            writeln!(f, "in declaration:")?;
            for line in declaration.lines() {
                writeln!(f, "  {line}")?;
            }
        }
        for frame in &self.stack {
            writeln!(f, "  while evaluating {frame}")?;
        }
        Ok(())
    }
}
