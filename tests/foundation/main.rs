//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, DeferredValue, Environment, and Error.

mod environment;
mod errors;
mod values;
