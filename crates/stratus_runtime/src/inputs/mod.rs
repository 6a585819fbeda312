//! Input resolution.
//!
//! [`InputResolver`] layers raw value sources in increasing precedence:
//!
//! 1. `<dir>/inputs.defaults`
//! 2. `<dir>/inputs.<env>.defaults`
//! 3. environment variables `<PREFIX><NAME>`
//! 4. `name=value` command-line overrides
//!
//! Each raw value is parsed with [`parse_typed`]; the last non-null value
//! wins. When no source has a value the engine falls back to the input's
//! declared default.

mod literal;
mod sources;

pub use literal::{LiteralError, parse_literal, parse_typed};
pub use sources::{CliOverrides, DefaultsFile, EnvironmentVariables, InputSource};

use stratus_engine::InputProvider;
use stratus_foundation::{Error, ErrorKind, Result, Type, Value};
use tracing::trace;

use crate::config::RuntimeConfig;

/// Resolves program inputs from layered sources.
#[derive(Debug, Default)]
pub struct InputResolver {
    sources: Vec<Box<dyn InputSource>>,
}

impl InputResolver {
    /// Creates a resolver with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard chain described by `config`.
    ///
    /// # Errors
    /// Returns `Io` or `InputParse` if a defaults file or override cannot be
    /// read.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let mut resolver =
            Self::new().with_source(DefaultsFile::load(config.defaults_path())?);
        if let Some(path) = config.environment_defaults_path() {
            resolver = resolver.with_source(DefaultsFile::load(path)?);
        }
        let resolver = resolver
            .with_source(EnvironmentVariables::from_env(&config.env_prefix))
            .with_source(CliOverrides::parse(&config.overrides)?);
        Ok(resolver)
    }

    /// Adds a source with higher precedence than every existing one.
    #[must_use]
    pub fn with_source(mut self, source: impl InputSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl InputProvider for InputResolver {
    fn resolve(&self, name: &str, ty: &Type) -> Result<Option<Value>> {
        let mut resolved = None;
        for source in &self.sources {
            let Some(raw) = source.raw(name) else {
                continue;
            };
            let value = parse_typed(raw, ty).map_err(|e| {
                Error::new(ErrorKind::InputParse {
                    name: name.to_string(),
                    message: format!("{e} (from {})", source.label()),
                })
                .with_value(raw)
            })?;
            if !value.is_null() {
                trace!(input = name, source = %source.label(), "input value");
                resolved = Some(value);
            }
        }
        Ok(resolved)
    }
}
