//! A configured evaluation run.

use stratus_engine::{Evaluation, Interpreter};
use stratus_foundation::Result;
use stratus_language::Program;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::inputs::InputResolver;
use crate::report::Report;

/// Evaluates programs with inputs resolved from a [`RuntimeConfig`].
#[derive(Clone, Debug, Default)]
pub struct Session {
    config: RuntimeConfig,
}

impl Session {
    /// Creates a session with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with the given configuration.
    #[must_use]
    pub const fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut RuntimeConfig {
        &mut self.config
    }

    /// Evaluates `program`, resolving inputs through the standard chain.
    ///
    /// # Errors
    /// Returns input source errors, or the first evaluation error.
    pub fn evaluate(&self, program: &Program) -> Result<Evaluation> {
        let resolver = InputResolver::from_config(&self.config)?;
        self.evaluate_with(program, resolver)
    }

    /// Evaluates `program` with an explicit resolver.
    ///
    /// # Errors
    /// Returns the first evaluation error.
    pub fn evaluate_with(&self, program: &Program, resolver: InputResolver) -> Result<Evaluation> {
        info!(
            environment = self.config.environment.as_deref().unwrap_or("default"),
            sources = resolver.source_count(),
            "starting evaluation"
        );
        Interpreter::with_config(self.config.engine.clone())
            .with_inputs(resolver)
            .evaluate(program)
    }

    /// Evaluates `program` and snapshots the result.
    ///
    /// # Errors
    /// Returns any error [`Session::evaluate`] would.
    pub fn plan(&self, program: &Program) -> Result<Report> {
        Report::from_evaluation(&self.evaluate(program)?)
    }
}
