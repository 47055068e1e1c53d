//! Non-fatal diagnostics reported alongside issues.

use std::fmt;

use serde::Serialize;

use crate::error::JobError;

/// What a [`Diagnostic`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The linter could not be started.
    Launch,
    /// The linter exceeded its deadline and was killed.
    Timeout,
    /// Collecting the linter's output failed.
    Io,
    /// A linter without partial output exited unsuccessfully.
    ExitStatus,
    /// A nolint directive suppressed nothing.
    UnmatchedNolint,
}

/// A warning about the run itself, distinct from the issues it found.
///
/// Job diagnostics carry the job's target path with `line` 0; their message
/// already names the path, so only source-line diagnostics are prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Source line, 0 when not applicable.
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn exit_status(linter: &str, path: &str, code: Option<i32>, stderr: &str) -> Self {
        let status = code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
        let detail = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let message = if detail.is_empty() {
            format!("linter {linter} on {path} exited with {status}")
        } else {
            format!("linter {linter} on {path} exited with {status}: {}", detail.trim())
        };
        Self {
            kind: DiagnosticKind::ExitStatus,
            linter: Some(linter.to_string()),
            path: Some(path.to_string()),
            line: 0,
            message,
        }
    }

    pub fn unmatched_nolint(path: impl Into<String>, line: u32) -> Self {
        Self {
            kind: DiagnosticKind::UnmatchedNolint,
            linter: None,
            path: Some(path.into()),
            line,
            message: "nolint directive did not match any issue".to_string(),
        }
    }
}

impl From<&JobError> for Diagnostic {
    fn from(err: &JobError) -> Self {
        let kind = match err {
            JobError::Launch { .. } => DiagnosticKind::Launch,
            JobError::Timeout { .. } => DiagnosticKind::Timeout,
            JobError::Io { .. } => DiagnosticKind::Io,
        };
        Self {
            kind,
            linter: Some(err.linter().to_string()),
            path: Some(err.path().to_string()),
            line: 0,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) if self.line > 0 => write!(f, "{}:{}: {}", path, self.line, self.message),
            _ => f.write_str(&self.message),
        }
    }
}
