//! Running Stratus programs.
//!
//! This crate provides:
//! - [`InputResolver`] - input values from defaults files, environment variables and overrides
//! - [`Session`] - configured evaluation runs
//! - [`Report`] - serializable plan snapshots with sensitive values redacted
//! - [`logging::init_tracing`] - log output setup

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod inputs;
pub mod logging;
pub mod report;
pub mod session;

pub use config::RuntimeConfig;
pub use inputs::{
    CliOverrides, DefaultsFile, EnvironmentVariables, InputResolver, InputSource, LiteralError,
    parse_literal,
};
pub use report::{ComponentEntry, FieldEntry, REDACTED, Report, ResourceEntry, TemplateEntry};
pub use session::Session;
