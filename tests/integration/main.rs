//! End-to-end tests across all layers
//!
//! Programs are built with the language builders, evaluated through a
//! configured runtime session, and checked through both the engine's
//! evaluation and the plan report.

mod scenarios;
mod workflows;
