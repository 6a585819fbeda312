//! Configuration for the evaluation engine.

/// Knobs that change how a program is evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum nesting of on-demand evaluations before giving up.
    pub max_depth: usize,

    /// Reject resource properties the schema does not declare.
    pub strict_properties: bool,

    /// Text rendered in place of a deferred value inside interpolated strings.
    pub deferred_placeholder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            strict_properties: true,
            deferred_placeholder: "null".to_string(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the on-demand evaluation depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method to toggle unknown-property rejection.
    #[must_use]
    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    /// Builder method to set the interpolation placeholder for deferred values.
    #[must_use]
    pub fn with_deferred_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.deferred_placeholder = placeholder.into();
        self
    }
}
