//! Configuration for a run.

use std::path::{Path, PathBuf};

use stratus_engine::EngineConfig;

/// Where inputs come from and how the engine behaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory holding the defaults files.
    pub working_dir: PathBuf,

    /// Deployment environment (`dev`, `prod`), selecting
    /// `inputs.<env>.defaults`.
    pub environment: Option<String>,

    /// Name of the shared defaults file.
    pub defaults_file: String,

    /// Prefix of environment variables that supply inputs.
    pub env_prefix: String,

    /// `name=value` overrides from the command line.
    pub overrides: Vec<String>,

    /// Engine settings.
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            environment: None,
            defaults_file: "inputs.defaults".to_string(),
            env_prefix: "STRATUS_INPUT_".to_string(),
            overrides: Vec::new(),
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the directory holding the defaults files.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Builder method to select a deployment environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Builder method to rename the shared defaults file.
    #[must_use]
    pub fn with_defaults_file(mut self, name: impl Into<String>) -> Self {
        self.defaults_file = name.into();
        self
    }

    /// Builder method to set the environment variable prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Builder method to add a `name=value` override.
    #[must_use]
    pub fn with_override(mut self, pair: impl Into<String>) -> Self {
        self.overrides.push(pair.into());
        self
    }

    /// Builder method to set the engine configuration.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Path of the shared defaults file.
    #[must_use]
    pub fn defaults_path(&self) -> PathBuf {
        self.working_dir.join(&self.defaults_file)
    }

    /// Path of the environment's defaults file: `inputs.prod.defaults` for
    /// `inputs.defaults` in environment `prod`.
    #[must_use]
    pub fn environment_defaults_path(&self) -> Option<PathBuf> {
        let environment = self.environment.as_deref()?;
        let file = Path::new(&self.defaults_file);
        let name = match (file.file_stem(), file.extension()) {
            (Some(stem), Some(ext)) => format!(
                "{}.{environment}.{}",
                stem.to_string_lossy(),
                ext.to_string_lossy()
            ),
            _ => format!("{}.{environment}", self.defaults_file),
        };
        Some(self.working_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.defaults_path(), PathBuf::from("./inputs.defaults"));
        assert_eq!(config.environment_defaults_path(), None);
        assert_eq!(config.env_prefix, "STRATUS_INPUT_");
    }

    #[test]
    fn environment_file_sits_beside_the_shared_file() {
        let config = RuntimeConfig::new()
            .with_working_dir("/deploy")
            .with_environment("prod");
        assert_eq!(
            config.environment_defaults_path(),
            Some(PathBuf::from("/deploy/inputs.prod.defaults"))
        );

        let bare = config.with_defaults_file("defaults");
        assert_eq!(
            bare.environment_defaults_path(),
            Some(PathBuf::from("/deploy/defaults.prod"))
        );
    }

    #[test]
    fn builder_collects_overrides() {
        let config = RuntimeConfig::new()
            .with_override("region=eu-west-1")
            .with_override("size=3")
            .with_engine(EngineConfig::new().with_max_depth(8));
        assert_eq!(config.overrides, vec!["region=eu-west-1", "size=3"]);
        assert_eq!(config.engine.max_depth, 8);
    }
}
