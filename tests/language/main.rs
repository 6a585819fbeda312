//! Integration tests for Layer 1: Language
//!
//! Tests for the syntax tree: builders, interpolated strings, reference
//! collection, and pretty printing.

mod pretty;
mod syntax;
mod templates;
