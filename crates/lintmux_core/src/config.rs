//! Configuration file model.
//!
//! Files are JSON with comments (`.lintmux.jsonc` or `.lintmux.json`).
//! Every field is optional:
//!
//! ```jsonc
//! {
//!   // Linters to run instead of the default set.
//!   "enable": ["vet", "golint", "mylint"],
//!   "linters": {
//!     "mylint": "mylint --strict:PATH:LINE:COL:MESSAGE",
//!     "golint": { "severity": "error" }
//!   },
//!   "deadline": "2m",
//!   "sort": ["path", "line"],
//!   "aggregate": true
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jsonc_parser::ParseOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::job::LinterSelection;
use crate::policy::{OutputMode, PolicyBuilder};
use crate::registry::{LinterSpec, Registry};

/// Configuration file names, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".lintmux.jsonc", ".lintmux.json"];

/// A linter entry: either the `command:pattern` shorthand or a full spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinterEntry {
    Shorthand(String),
    Spec(LinterSpec),
}

impl LinterEntry {
    pub fn to_spec(&self) -> Result<LinterSpec, ConfigError> {
        match self {
            LinterEntry::Shorthand(text) => LinterSpec::parse(text),
            LinterEntry::Spec(spec) => Ok(spec.clone()),
        }
    }
}

/// Deserialized configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub enable_all: bool,
    pub disable_all: bool,
    pub fast: bool,
    /// Custom linters, or overrides of built-in ones.
    pub linters: BTreeMap<String, LinterEntry>,
    /// Linter name to severity.
    pub severity: BTreeMap<String, String>,
    /// Linter name to message template.
    pub message_overrides: BTreeMap<String, String>,
    pub format: Option<String>,
    pub concurrency: Option<usize>,
    /// Per-linter deadline such as `30s`; `0` disables it.
    pub deadline: Option<String>,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
    pub sort: Vec<String>,
    pub aggregate: bool,
    pub errors: bool,
    pub json: bool,
    pub checkstyle: bool,
    pub tests: bool,
    pub vars: BTreeMap<String, String>,
    pub warn_unmatched_nolint: bool,
}

impl Config {
    /// Parses JSONC text. `origin` names the source in error messages.
    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
            .map_err(|e| ConfigError::file(origin, e))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        serde_json::from_value(value).map_err(|e| ConfigError::file(origin, e))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::file(&origin, e))?;
        let config = Self::parse(&content, &origin)?;
        debug!("loaded configuration from {}", origin);
        Ok(config)
    }

    /// Finds the configuration file in `dir`, if any.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads the configuration file in `dir`, if there is one.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        Self::find(dir)
            .map(|path| Self::from_file(&path).map(|config| (path, config)))
            .transpose()
    }

    /// The built-in registry extended with this file's linters.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::with_defaults()?;
        for (name, entry) in &self.linters {
            registry.define(name, &entry.to_spec()?)?;
        }
        Ok(registry)
    }

    pub fn selection(&self) -> LinterSelection {
        LinterSelection {
            enable: self.enable.clone(),
            disable: self.disable.clone(),
            enable_all: self.enable_all,
            disable_all: self.disable_all,
            fast: self.fast,
        }
    }

    /// Output mode requested by the file. JSON wins over checkstyle.
    pub fn output(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.checkstyle {
            OutputMode::Checkstyle
        } else {
            OutputMode::Text
        }
    }

    /// Applies this file's settings on top of `builder`.
    pub fn apply(&self, mut builder: PolicyBuilder) -> Result<PolicyBuilder, ConfigError> {
        if let Some(format) = &self.format {
            builder = builder.format(format.as_str());
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(deadline) = &self.deadline {
            builder = builder.deadline(parse_duration(deadline)?);
        }
        if !self.sort.is_empty() {
            builder = builder.sort(self.sort.iter().cloned());
        }
        for pattern in &self.include {
            builder = builder.include(pattern.as_str());
        }
        for pattern in &self.exclude {
            builder = builder.exclude(pattern.as_str());
        }
        for (linter, severity) in &self.severity {
            builder = builder.severity(linter.as_str(), severity.as_str());
        }
        for (linter, template) in &self.message_overrides {
            builder = builder.message_override(linter.as_str(), template.as_str());
        }
        if self.tests {
            builder = builder.tests(true);
        }
        for (name, value) in &self.vars {
            builder = builder.var(name.as_str(), value.as_str());
        }
        Ok(builder
            .aggregate(self.aggregate)
            .errors_only(self.errors)
            .warn_unmatched_nolint(self.warn_unmatched_nolint)
            .output(self.output()))
    }
}

/// Parses a duration such as `500ms`, `30s`, `2m`, `1h` or `0`.
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let text = text.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    let split = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| ConfigError::Duration(text.to_string()))?;
    let (number, unit) = text.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| ConfigError::Duration(text.to_string()))?;
    let seconds = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => return Err(ConfigError::Duration(text.to_string())),
    };
    Duration::try_from_secs_f64(seconds).map_err(|_| ConfigError::Duration(text.to_string()))
}
