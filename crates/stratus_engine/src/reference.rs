//! References from one declaration to another.
//!
//! While an expression is evaluated, every reference to a resource or
//! component property is first turned into a [`ResourceRef`]: either the value
//! is known ([`ResourceRef::Resolved`]) or it is still waiting on the target
//! ([`ResourceRef::Pending`]). Pending references become
//! [`DeferredValue`] placeholders in the evaluated result.

use std::fmt;

use stratus_foundation::{DeferredValue, Value};

use crate::Shared;
use crate::resource::ResourceValue;

/// How a reference was reached, kept for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefSource {
    /// `other.property`
    PropertyAccess,
    /// `@dependsOn(other)`
    DependsOn,
    /// `other[i]` where `i` is a for-loop variable.
    ForLoopIndex,
    /// `other[0]` or `other["key"]`
    ArrayIndex,
}

impl fmt::Display for RefSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PropertyAccess => "property access",
            Self::DependsOn => "@dependsOn",
            Self::ForLoopIndex => "for-loop index",
            Self::ArrayIndex => "array index",
        };
        f.write_str(text)
    }
}

/// A reference to another resource or component, resolved or not.
#[derive(Clone, Debug)]
pub enum ResourceRef {
    /// The target or its property is not available yet.
    Pending {
        /// Instance name of the target.
        resource_name: String,
        /// Property being read, if any.
        property_path: Option<String>,
        /// How the reference was reached.
        source: RefSource,
    },
    /// The value is known.
    Resolved {
        /// Instance name of the target.
        resource_name: String,
        /// The target resource, when the reference points at a resource.
        resource: Option<Shared<ResourceValue>>,
        /// The resolved value.
        value: Value,
    },
}

impl ResourceRef {
    /// Creates a pending reference to `resource_name.property_path`.
    #[must_use]
    pub fn pending(
        resource_name: impl Into<String>,
        property_path: Option<&str>,
        source: RefSource,
    ) -> Self {
        Self::Pending {
            resource_name: resource_name.into(),
            property_path: property_path.map(str::to_string),
            source,
        }
    }

    /// Creates a resolved reference.
    #[must_use]
    pub fn resolved(
        resource_name: impl Into<String>,
        resource: Option<Shared<ResourceValue>>,
        value: Value,
    ) -> Self {
        Self::Resolved {
            resource_name: resource_name.into(),
            resource,
            value,
        }
    }

    /// Instance name of the target.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        match self {
            Self::Pending { resource_name, .. } | Self::Resolved { resource_name, .. } => {
                resource_name
            }
        }
    }

    /// Returns true for [`ResourceRef::Pending`].
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The placeholder a pending reference stands for.
    #[must_use]
    pub fn deferred(&self) -> Option<DeferredValue> {
        match self {
            Self::Pending {
                resource_name,
                property_path,
                ..
            } => Some(DeferredValue::new(
                resource_name.as_str(),
                property_path.as_deref().unwrap_or_default(),
            )),
            Self::Resolved { .. } => None,
        }
    }

    /// Collapses the reference into a value: the resolved value, or a
    /// deferred placeholder.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Resolved { value, .. } => value,
            pending @ Self::Pending { .. } => pending
                .deferred()
                .map_or(Value::Null, Value::Deferred),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending {
                resource_name,
                property_path: Some(path),
                source,
            } => write!(f, "pending {resource_name}.{path} (via {source})"),
            Self::Pending {
                resource_name,
                property_path: None,
                source,
            } => write!(f, "pending {resource_name} (via {source})"),
            Self::Resolved {
                resource_name,
                value,
                ..
            } => write!(f, "{resource_name} = {value}"),
        }
    }
}
