//! Lexically scoped bindings.
//!
//! An [`Environment`] is a handle to one scope. Scopes are shared
//! (`Rc<RefCell<_>>`) because resource bodies, loop iterations and component
//! bodies all hold on to their enclosing scope while the interpreter keeps
//! walking. Evaluation is single-threaded, so no locking is involved.
//!
//! Bindings are never created implicitly: [`Environment::init`] declares,
//! [`Environment::assign`] only updates an existing declaration.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{Error, Result};

struct Scope<T> {
    bindings: IndexMap<String, T>,
    parent: Option<Environment<T>>,
}

/// A scope of name → value bindings with an optional parent scope.
///
/// Cloning an `Environment` clones the handle, not the bindings.
pub struct Environment<T> {
    scope: Rc<RefCell<Scope<T>>>,
}

impl<T> Clone for Environment<T> {
    fn clone(&self) -> Self {
        Self {
            scope: Rc::clone(&self.scope),
        }
    }
}

impl<T> Default for Environment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Environment<T> {
    /// Creates a root scope.
    #[must_use]
    pub fn new() -> Self {
        Self::from_scope(None)
    }

    /// Creates a scope nested inside `parent`.
    #[must_use]
    pub fn with_parent(parent: &Environment<T>) -> Self {
        Self::from_scope(Some(parent.clone()))
    }

    /// Creates a scope nested inside this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::with_parent(self)
    }

    fn from_scope(parent: Option<Environment<T>>) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                bindings: IndexMap::new(),
                parent,
            })),
        }
    }

    /// Returns the enclosing scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Environment<T>> {
        self.scope.borrow().parent.clone()
    }

    /// Number of enclosing scopes above this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(env) = current {
            depth += 1;
            current = env.parent();
        }
        depth
    }

    /// Returns true if both handles point at the same scope.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.scope, &other.scope)
    }

    /// Declares `name` in this scope.
    ///
    /// # Errors
    /// Returns `DeclarationExists` if this scope already declares `name`.
    /// Shadowing a name from an enclosing scope is allowed.
    pub fn init(&self, name: impl Into<String>, value: T) -> Result<()> {
        let name = name.into();
        let mut scope = self.scope.borrow_mut();
        if scope.bindings.contains_key(&name) {
            return Err(Error::declaration_exists(name));
        }
        scope.bindings.insert(name, value);
        Ok(())
    }

    /// Updates the nearest scope that declares `name`.
    ///
    /// # Errors
    /// Returns `UndefinedSymbol` if no scope in the chain declares `name`.
    pub fn assign(&self, name: &str, value: T) -> Result<()> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            {
                let mut scope = env.scope.borrow_mut();
                if let Some(slot) = scope.bindings.get_mut(name) {
                    *slot = value;
                    return Ok(());
                }
            }
            current = env.parent();
        }
        Err(Error::undefined_symbol(name))
    }

    /// Returns true if this scope (ignoring parents) declares `name`.
    #[must_use]
    pub fn contains_local(&self, name: &str) -> bool {
        self.scope.borrow().bindings.contains_key(name)
    }

    /// Returns true if any scope in the chain declares `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve_depth(name, usize::MAX).is_some()
    }

    /// Number of parent hops to the scope declaring `name`, if any.
    #[must_use]
    pub fn resolve_depth(&self, name: &str, max_hops: usize) -> Option<usize> {
        let mut current = Some(self.clone());
        let mut hops = 0;
        while let Some(env) = current {
            if env.contains_local(name) {
                return Some(hops);
            }
            if hops == max_hops {
                return None;
            }
            hops += 1;
            current = env.parent();
        }
        None
    }

    /// Names declared in this scope, in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.scope.borrow().bindings.keys().cloned().collect()
    }

    /// Number of bindings in this scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scope.borrow().bindings.len()
    }

    /// Returns true if this scope declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scope.borrow().bindings.is_empty()
    }
}

impl<T: Clone> Environment<T> {
    /// Looks `name` up in this scope, then outward through every parent.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<T> {
        self.lookup_within(name, usize::MAX)
    }

    /// Looks `name` up in this scope and at most `hops` enclosing scopes.
    ///
    /// `hops == 0` consults only this scope.
    #[must_use]
    pub fn lookup_within(&self, name: &str, hops: usize) -> Option<T> {
        let mut current = Some(self.clone());
        let mut remaining = hops;
        while let Some(env) = current {
            if let Some(value) = env.scope.borrow().bindings.get(name) {
                return Some(value.clone());
            }
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            current = env.parent();
        }
        None
    }

    /// Looks `name` up in this scope only.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<T> {
        self.lookup_within(name, 0)
    }

    /// Bindings of this scope, in declaration order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, T)> {
        self.scope
            .borrow()
            .bindings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Environment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.scope.borrow();
        f.debug_struct("Environment")
            .field("bindings", &scope.bindings)
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn init_and_lookup() {
        let env = Environment::new();
        env.init("region", "us-east-1").unwrap();
        assert_eq!(env.lookup("region"), Some("us-east-1"));
        assert_eq!(env.lookup("zone"), None);
    }

    #[test]
    fn duplicate_init_in_same_scope_fails() {
        let env = Environment::new();
        env.init("main", 1).unwrap();
        let err = env.init("main", 2).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DeclarationExists(ref n) if n == "main"));
        assert_eq!(env.lookup("main"), Some(1));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let outer = Environment::new();
        outer.init("x", 1).unwrap();
        let inner = outer.child();
        inner.init("x", 2).unwrap();

        assert_eq!(inner.lookup("x"), Some(2));
        assert_eq!(outer.lookup("x"), Some(1));
    }

    #[test]
    fn lookup_within_zero_hops_ignores_parents() {
        let outer = Environment::new();
        outer.init("x", 1).unwrap();
        let inner = outer.child();

        assert_eq!(inner.lookup_within("x", 0), None);
        assert_eq!(inner.lookup_within("x", 1), Some(1));
        assert_eq!(inner.get("x"), None);
    }

    #[test]
    fn lookup_within_stops_after_hops() {
        let root = Environment::new();
        root.init("x", 0).unwrap();
        let mid = root.child();
        let leaf = mid.child();

        assert_eq!(leaf.lookup_within("x", 1), None);
        assert_eq!(leaf.lookup_within("x", 2), Some(0));
        assert_eq!(leaf.resolve_depth("x", usize::MAX), Some(2));
        assert_eq!(leaf.depth(), 2);
    }

    #[test]
    fn assign_updates_nearest_declaration() {
        let outer = Environment::new();
        outer.init("x", 1).unwrap();
        let inner = outer.child();

        inner.assign("x", 5).unwrap();
        assert_eq!(outer.lookup("x"), Some(5));
        assert!(!inner.contains_local("x"));
    }

    #[test]
    fn assign_undeclared_fails() {
        let env: Environment<i32> = Environment::new();
        let err = env.assign("missing", 1).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
        assert!(env.is_empty());
    }

    #[test]
    fn names_preserve_declaration_order() {
        let env = Environment::new();
        env.init("zeta", 1).unwrap();
        env.init("alpha", 2).unwrap();
        env.init("mid", 3).unwrap();
        assert_eq!(env.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn clones_share_the_scope() {
        let env = Environment::new();
        let alias = env.clone();
        alias.init("x", 1).unwrap();
        assert_eq!(env.lookup("x"), Some(1));
        assert!(env.ptr_eq(&alias));
        assert!(!env.ptr_eq(&env.child()));
    }
}
