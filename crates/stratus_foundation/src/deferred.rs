//! Placeholders for values a cloud provider has not populated yet.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// "The value of `property_path` on `dependency_name`, not yet known."
///
/// Created when an expression reads a cloud-managed property that is still
/// null. Immutable once created; the apply phase resolves it later.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeferredValue {
    dependency_name: Arc<str>,
    property_path: Arc<str>,
}

impl DeferredValue {
    /// Creates a deferred value pointing at `dependency_name.property_path`.
    #[must_use]
    pub fn new(dependency_name: impl Into<Arc<str>>, property_path: impl Into<Arc<str>>) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            property_path: property_path.into(),
        }
    }

    /// Name of the resource or component the value waits on.
    #[must_use]
    pub fn dependency_name(&self) -> &str {
        &self.dependency_name
    }

    /// Property on the dependency that will eventually hold the value.
    #[must_use]
    pub fn property_path(&self) -> &str {
        &self.property_path
    }

    /// A placeholder for a value nested inside this one: `vpc.tags` with
    /// `env` gives `vpc.tags.env`, with `[0]` gives `vpc.tags[0]`.
    #[must_use]
    pub fn nested(&self, segment: &str) -> Self {
        let path = if self.property_path.is_empty() {
            segment.trim_start_matches('.').to_string()
        } else if segment.starts_with('[') {
            format!("{}{segment}", self.property_path)
        } else {
            format!("{}.{segment}", self.property_path)
        };
        Self::new(Arc::clone(&self.dependency_name), path)
    }
}

impl fmt::Display for DeferredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_path.is_empty() {
            write!(f, "{}", self.dependency_name)
        } else {
            write!(f, "{}.{}", self.dependency_name, self.property_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let d = DeferredValue::new("example", "vpcId");
        assert_eq!(d.dependency_name(), "example");
        assert_eq!(d.property_path(), "vpcId");
        assert_eq!(d.to_string(), "example.vpcId");
    }

    #[test]
    fn nested_paths() {
        let d = DeferredValue::new("vpc", "tags");
        assert_eq!(d.nested("env").to_string(), "vpc.tags.env");
        assert_eq!(d.nested("[0]").property_path(), "tags[0]");
        let whole = DeferredValue::new("workers[0]", "");
        assert_eq!(whole.to_string(), "workers[0]");
        assert_eq!(whole.nested("ip").to_string(), "workers[0].ip");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(
            DeferredValue::new("vpc", "id"),
            DeferredValue::new(String::from("vpc"), "id")
        );
        assert_ne!(DeferredValue::new("vpc", "id"), DeferredValue::new("vpc", "arn"));
    }
}
