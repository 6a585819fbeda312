//! Core values, scoping, and error types for Stratus.
//!
//! This crate provides:
//! - [`Value`] - Runtime values produced by evaluating expressions
//! - [`Type`] - Type descriptors used by declarations
//! - [`Environment`] - Lexically scoped bindings with parent links
//! - [`DeferredValue`] - Placeholder for a cloud-populated property
//! - [`Error`] - Rich error types with declaration context
//! - Persistent collections ([`PersistentVec`], [`PersistentMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod deferred;
pub mod environment;
pub mod error;
pub mod types;
pub mod value;

pub use collections::{PersistentMap, PersistentVec};
pub use deferred::DeferredValue;
pub use environment::Environment;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use types::Type;
pub use value::Value;
