//! `@count` expansion and instance naming.
//!
//! A counted or looped declaration produces instances named `base[0]`,
//! `base[1]`, ... for numeric counts and ranges, and `base["key"]` when a loop
//! iterates string items. When the count cannot be known until apply, no
//! instances are produced and a [`DeferredResourceTemplate`] is recorded
//! instead.
//!
//! [`DeferredResourceTemplate`]: crate::template::DeferredResourceTemplate

use std::fmt;

use stratus_foundation::{DeferredValue, Error, Result, Value};

/// The key distinguishing one instance of an expanded declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    /// Position from `@count`, a range, or a non-string collection item.
    Index(i64),
    /// String item of an iterated collection.
    Key(String),
}

impl InstanceKey {
    /// Qualified instance name for `base`.
    #[must_use]
    pub fn instance_name(&self, base: &str) -> String {
        format!("{base}{self}")
    }

    /// The numeric position, for `Index` keys.
    #[must_use]
    pub const fn index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

    /// Converts an index value (`x[0]`, `x["prod"]`) into a key.
    ///
    /// # Errors
    /// Returns `TypeMismatch` for values that cannot name an instance.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(Self::Index(*i)),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) if f.fract() == 0.0 => Ok(Self::Index(*f as i64)),
            Value::String(s) => Ok(Self::Key(s.to_string())),
            other => Err(Error::type_mismatch(format!(
                "cannot index instances with {}",
                other.value_type()
            ))
            .with_value(other)),
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, "[{k:?}]"),
        }
    }
}

/// The outcome of evaluating a `@count` argument.
#[derive(Clone, Debug, PartialEq)]
pub enum CountDirective {
    /// Produce this many instances.
    Instances(usize),
    /// The count waits on a cloud-managed value.
    Deferred(DeferredValue),
}

impl CountDirective {
    /// Interprets an evaluated `@count` argument.
    ///
    /// Fractional counts are floored. A deferred value anywhere in the
    /// argument defers the whole count.
    ///
    /// # Errors
    /// Returns `DecoratorValidation` for negative, oversized or non-numeric
    /// counts.
    pub fn from_value(value: &Value) -> Result<Self> {
        if let Some(deferred) = value.find_deferred() {
            return Ok(Self::Deferred(deferred.clone()));
        }
        match value {
            Value::Int(n) => usize::try_from(*n).map(Self::Instances).map_err(|_| {
                Error::decorator("count", "count must not be negative").with_value(value)
            }),
            Value::Float(f) if f.is_finite() => {
                let floored = f.floor();
                if floored < 0.0 {
                    return Err(
                        Error::decorator("count", "count must not be negative").with_value(value)
                    );
                }
                // 2^63, the first float past every `i64`.
                if floored >= 9_223_372_036_854_775_808.0 {
                    return Err(
                        Error::decorator("count", "count is too large").with_value(value)
                    );
                }
                #[allow(clippy::cast_possible_truncation)]
                let n = floored as i64;
                usize::try_from(n).map(Self::Instances).map_err(|_| {
                    Error::decorator("count", "count is too large").with_value(value)
                })
            }
            other => Err(Error::decorator(
                "count",
                format!("count must be a number, found {}", other.value_type()),
            )
            .with_value(other)),
        }
    }

    /// Instance keys to create, empty when deferred.
    pub fn keys(&self) -> impl Iterator<Item = InstanceKey> {
        let n = match self {
            Self::Instances(n) => *n,
            Self::Deferred(_) => 0,
        };
        (0..n).map(|i| InstanceKey::Index(i64::try_from(i).unwrap_or(i64::MAX)))
    }
}
