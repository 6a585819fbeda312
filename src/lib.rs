//! Stratus - evaluation engine for a declarative infrastructure language
//!
//! This crate re-exports all layers of the Stratus system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: stratus_runtime    — Input resolution, sessions, plan reports, logging
//! Layer 2: stratus_engine     — Value model, dependency tracking, @count, decorators, interpreter
//! Layer 1: stratus_language   — AST, builders, templates, pretty printer
//! Layer 0: stratus_foundation — Core types (Value, Type, Environment, DeferredValue, Error)
//! ```

pub use stratus_engine as engine;
pub use stratus_foundation as foundation;
pub use stratus_language as language;
pub use stratus_runtime as runtime;
