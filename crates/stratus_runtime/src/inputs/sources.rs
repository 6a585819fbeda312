//! Places raw input values come from.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stratus_foundation::{Error, ErrorKind, Result};
use tracing::debug;

/// A source of raw (unparsed) input values.
pub trait InputSource: fmt::Debug {
    /// Short label used in logs and errors.
    fn label(&self) -> String;

    /// The raw text for input `name`, if this source has one.
    fn raw(&self, name: &str) -> Option<&str>;
}

// =============================================================================
// Files
// =============================================================================

/// A `name = value` file. Lines starting with `#` and blank lines are
/// ignored. A missing file is an empty source.
#[derive(Clone, Debug)]
pub struct DefaultsFile {
    path: PathBuf,
    values: IndexMap<String, String>,
}

impl DefaultsFile {
    /// Reads `path`.
    ///
    /// # Errors
    /// Returns `Io` if the file exists but cannot be read, and `InputParse`
    /// for a line without `=`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no defaults file");
                String::new()
            }
            Err(e) => {
                return Err(Error::new(ErrorKind::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }));
            }
        };
        let values = parse_defaults(&text, &path)?;
        debug!(path = %path.display(), values = values.len(), "loaded defaults file");
        Ok(Self { path, values })
    }

    /// Builds a source from file contents already in memory.
    ///
    /// # Errors
    /// Returns `InputParse` for a line without `=`.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let values = parse_defaults(text, &path)?;
        Ok(Self { path, values })
    }

    /// The file this source was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of values in the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the file had no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl InputSource for DefaultsFile {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

fn parse_defaults(text: &str, path: &Path) -> Result<IndexMap<String, String>> {
    let mut values = IndexMap::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            return Err(Error::new(ErrorKind::InputParse {
                name: format!("{}:{}", path.display(), number + 1),
                message: "expected `name = value`".to_string(),
            }));
        };
        values.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(values)
}

// =============================================================================
// Environment variables
// =============================================================================

/// Variables named `<prefix><NAME>`. The name after the prefix matches an
/// input case-insensitively, so `STRATUS_INPUT_REGION` supplies `region`.
#[derive(Clone, Debug)]
pub struct EnvironmentVariables {
    prefix: String,
    values: IndexMap<String, String>,
}

impl EnvironmentVariables {
    /// Captures the process environment.
    #[must_use]
    pub fn from_env(prefix: &str) -> Self {
        Self::new(prefix, std::env::vars())
    }

    /// Captures the given variables.
    #[must_use]
    pub fn new(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let values = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(prefix)?;
                (!name.is_empty()).then(|| (name.to_lowercase(), value))
            })
            .collect();
        Self {
            prefix: prefix.to_string(),
            values,
        }
    }
}

impl InputSource for EnvironmentVariables {
    fn label(&self) -> String {
        format!("environment ({}*)", self.prefix)
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_lowercase()).map(String::as_str)
    }
}

// =============================================================================
// Command line
// =============================================================================

/// `name=value` pairs given on the command line.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    values: IndexMap<String, String>,
}

impl CliOverrides {
    /// Parses `name=value` arguments. Later pairs win.
    ///
    /// # Errors
    /// Returns `InputParse` for an argument without `=` or with an empty
    /// name.
    pub fn parse<S: AsRef<str>>(pairs: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut values = IndexMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    values.insert(name.trim().to_string(), value.to_string());
                }
                _ => {
                    return Err(Error::new(ErrorKind::InputParse {
                        name: pair.to_string(),
                        message: "expected `name=value`".to_string(),
                    }));
                }
            }
        }
        Ok(Self { values })
    }
}

impl InputSource for CliOverrides {
    fn label(&self) -> String {
        "command line".to_string()
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}
