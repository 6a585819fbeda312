//! Type descriptors for declarations.
//!
//! Stratus does not type-check programs at evaluation time; that happens
//! before a program reaches the engine. Types are still carried on inputs,
//! outputs and schema properties because input resolution needs to know
//! whether a raw `3` means the number or the string.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor attached to a declaration.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The null type.
    Null,
    /// `boolean`
    Boolean,
    /// `number` (integer or decimal).
    Number,
    /// `string`
    String,
    /// `object` (untyped key/value map).
    Object,
    /// `T[]`
    Array(Box<Type>),
    /// A schema or struct name.
    Named(String),
    /// `any`
    Any,
}

impl Type {
    /// Creates an array type with the given element type.
    #[must_use]
    pub fn array(element: Type) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Parses a type keyword as written in source (`string`, `number[]`, ...).
    ///
    /// Unknown identifiers become [`Type::Named`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(inner) = text.strip_suffix("[]") {
            return Self::array(Self::parse(inner));
        }
        match text {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "number" => Self::Number,
            "string" => Self::String,
            "object" => Self::Object,
            "any" => Self::Any,
            other => Self::Named(other.to_string()),
        }
    }

    /// Returns true if this type is `any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if this is an array type.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns the element type of an array type.
    #[must_use]
    pub fn element(&self) -> Option<&Type> {
        match self {
            Self::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Checks whether a runtime value type is accepted by this type.
    ///
    /// `any` accepts everything and `null` is accepted everywhere, since
    /// unset and cloud-managed properties are null until apply.
    #[must_use]
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Self::Any, _) | (_, Self::Null) => true,
            (Self::Array(expected), Self::Array(inner)) => inner.is_any() || expected.accepts(inner),
            (Self::Named(_), Self::Object) => true,
            (expected, actual) => expected == actual,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Object => write!(f, "object"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Any => write!(f, "any"),
        }
    }
}
