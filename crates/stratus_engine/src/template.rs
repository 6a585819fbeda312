//! Deferred resource templates.

use std::collections::BTreeSet;

use stratus_foundation::DeferredValue;
use stratus_language::{Expr, Statement};

/// A counted declaration whose count is only known after apply.
///
/// No instances exist for it during evaluation. A later apply phase
/// re-evaluates `statement` once every name in `dependencies` has been
/// created.
#[derive(Clone, Debug)]
pub struct DeferredResourceTemplate {
    /// Base name of the declaration, qualified inside components.
    pub template_name: String,
    /// The `@count` argument as written.
    pub count_expression: Expr,
    /// The full resource or component statement.
    pub statement: Statement,
    /// Resources and components the count needs.
    pub dependencies: BTreeSet<String>,
    /// Schema or component type of the declaration.
    pub resource_type: String,
    /// The value the count is waiting on.
    pub blocked_on: DeferredValue,
}

impl DeferredResourceTemplate {
    /// Returns true once every dependency is among `created`.
    pub fn all_dependencies_resolved<'a>(
        &self,
        created: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        let created: BTreeSet<&str> = created.into_iter().collect();
        self.dependencies
            .iter()
            .all(|dep| created.contains(dep.as_str()))
    }

    /// The resource the count is blocked on.
    #[must_use]
    pub fn blocking_resource(&self) -> &str {
        self.blocked_on.dependency_name()
    }
}
