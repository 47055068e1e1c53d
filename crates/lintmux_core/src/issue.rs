//! The normalized issue record.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;
use crate::template::Template;

/// Severity of an issue.
///
/// Ordered from most to least severe, so an ascending sort puts errors first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    Error,
    /// Warning - should be reviewed.
    #[default]
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "e" => Ok(Severity::Error),
            "warning" | "warn" | "w" => Ok(Severity::Warning),
            _ => Err(ConfigError::Severity(s.to_string())),
        }
    }
}

/// Field names available to issue format templates.
pub const FORMAT_FIELDS: &[&str] = &["path", "line", "col", "linter", "severity", "message"];

/// Default issue format.
pub const DEFAULT_FORMAT: &str = "{path}:{line}:{col}:{severity}: {message} ({linter})";

/// One normalized diagnostic produced by a linter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Issue {
    /// Linter that reported the issue.
    pub linter: String,
    /// Root-relative (or absolute) path of the offending file.
    pub path: String,
    /// 1-based line, 0 when unknown.
    pub line: u32,
    /// 1-based column, 0 when unknown.
    pub col: u32,
    pub severity: Severity,
    pub message: String,
    /// Every linter that reported this issue. Only filled in by aggregation.
    pub contributors: BTreeSet<String>,
}

impl Issue {
    /// Creates an issue with unknown position, empty message, and warning severity.
    pub fn new(linter: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            linter: linter.into(),
            path: path.into(),
            line: 0,
            col: 0,
            severity: Severity::Warning,
            message: String::new(),
            contributors: BTreeSet::new(),
        }
    }

    pub fn with_position(mut self, line: u32, col: u32) -> Self {
        self.line = line;
        self.col = col;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_contributors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contributors = names.into_iter().map(Into::into).collect();
        self
    }

    /// Linters that reported this issue: the contributor set when aggregated,
    /// otherwise just the reporting linter.
    pub fn linters(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        if self.contributors.is_empty() {
            Box::new(std::iter::once(self.linter.as_str()))
        } else {
            Box::new(self.contributors.iter().map(String::as_str))
        }
    }

    /// Linter label shown to users, e.g. `"gosimple, staticcheck"`.
    pub fn linter_label(&self) -> Cow<'_, str> {
        if self.contributors.is_empty() {
            Cow::Borrowed(&self.linter)
        } else {
            Cow::Owned(self.linters().collect::<Vec<_>>().join(", "))
        }
    }

    /// Renders the issue through a format template.
    ///
    /// `{col}` renders empty when the column is unknown.
    pub fn render(&self, template: &Template) -> String {
        template.render(|field| self.field(field))
    }

    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "path" => Some(Cow::Borrowed(&self.path)),
            "line" => Some(Cow::Owned(self.line.to_string())),
            "col" if self.col == 0 => None,
            "col" => Some(Cow::Owned(self.col.to_string())),
            "linter" => Some(self.linter_label()),
            "severity" => Some(Cow::Borrowed(self.severity.as_str())),
            "message" => Some(Cow::Borrowed(&self.message)),
            _ => None,
        }
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Issue", 6)?;
        state.serialize_field("linter", &self.linter_label())?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("col", &self.col)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}
