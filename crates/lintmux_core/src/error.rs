//! Error types.

use std::time::Duration;

use thiserror::Error;

/// Configuration errors.
///
/// These are the only errors that abort a run; they are raised while the
/// registry, policy, and job list are being built, before any linter starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A linter output pattern failed to compile.
    #[error("invalid pattern for linter '{linter}': {source}")]
    Pattern {
        linter: String,
        #[source]
        source: regex::Error,
    },

    /// A linter output pattern has no `path` capture group.
    #[error("pattern for linter '{0}' must contain a (?P<path>...) capture group")]
    MissingPathGroup(String),

    /// A command template could not be split into arguments.
    #[error("invalid command for linter '{linter}': {reason}")]
    Command { linter: String, reason: String },

    /// A `{...}` template was malformed.
    #[error("invalid template {template:?}: {reason}")]
    Template { template: String, reason: String },

    /// An include or exclude regex failed to compile.
    #[error("invalid {kind} filter: {source}")]
    Filter {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Unknown sort key.
    #[error("unknown sort key '{0}' (expected one of none, path, line, column, severity, message, linter)")]
    SortKey(String),

    /// Unknown severity name.
    #[error("unknown severity '{0}' (expected error or warning)")]
    Severity(String),

    /// Linter names that are neither built in nor user defined.
    #[error("unknown linters: {0}")]
    UnknownLinters(String),

    /// A `name:command:pattern` definition could not be parsed.
    #[error("incorrectly formatted linter definition: {0}")]
    LinterSpec(String),

    /// A duration string could not be parsed.
    #[error("invalid duration '{0}'")]
    Duration(String),

    /// Concurrency must be at least one.
    #[error("concurrency must be at least 1")]
    Concurrency,

    /// Reading or decoding a configuration file failed.
    #[error("configuration file {path}: {reason}")]
    File { path: String, reason: String },
}

impl ConfigError {
    /// Creates a template error.
    pub fn template(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// Creates a command error.
    pub fn command(linter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            linter: linter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration file error.
    pub fn file(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::File {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors affecting a single job.
///
/// A job that fails this way contributes no issues; the batch carries on.
#[derive(Debug, Error)]
pub enum JobError {
    /// The linter process could not be started.
    #[error("failed to execute linter {linter} on {path} ({program}): {source}")]
    Launch {
        linter: String,
        path: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The linter did not finish before its deadline and was killed.
    #[error(
        "deadline exceeded by linter {linter} on {path} after {deadline:?} (try increasing --deadline)"
    )]
    Timeout {
        linter: String,
        path: String,
        deadline: Duration,
    },

    /// Waiting on the process or collecting its output failed.
    #[error("linter {linter} on {path}: {source}")]
    Io {
        linter: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl JobError {
    /// Name of the linter the failed job belonged to.
    pub fn linter(&self) -> &str {
        match self {
            Self::Launch { linter, .. } | Self::Timeout { linter, .. } | Self::Io { linter, .. } => {
                linter
            }
        }
    }

    /// Target path of the failed job.
    pub fn path(&self) -> &str {
        match self {
            Self::Launch { path, .. } | Self::Timeout { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_linter() {
        let err = JobError::Timeout {
            linter: "golint".to_string(),
            path: "./pkg/b".to_string(),
            deadline: Duration::from_millis(50),
        };
        let text = err.to_string();
        assert!(text.contains("golint on ./pkg/b"));
        assert!(text.contains("50ms"));
        assert_eq!(err.linter(), "golint");
        assert_eq!(err.path(), "./pkg/b");
    }

    #[test]
    fn test_launch_error_keeps_source() {
        let err = JobError::Launch {
            linter: "vet".to_string(),
            path: "./pkg".to_string(),
            program: "go".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("failed to execute linter vet"));
    }

    #[test]
    fn test_config_error_helpers() {
        let err = ConfigError::template("{path", "unclosed '{'");
        assert_eq!(err.to_string(), "invalid template \"{path\": unclosed '{'");

        let err = ConfigError::file("cfg.json", "bad json");
        assert_eq!(err.to_string(), "configuration file cfg.json: bad json");
    }
}
