//! Include/exclude filtering and multi-key ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::issue::Issue;
use crate::template::Template;

/// A sort key. Keys are applied in order, each breaking ties left by the previous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Keep pipeline order.
    None,
    Path,
    Line,
    Column,
    Severity,
    Message,
    Linter,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::None,
        SortKey::Path,
        SortKey::Line,
        SortKey::Column,
        SortKey::Severity,
        SortKey::Message,
        SortKey::Linter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Path => "path",
            SortKey::Line => "line",
            SortKey::Column => "column",
            SortKey::Severity => "severity",
            SortKey::Message => "message",
            SortKey::Linter => "linter",
        }
    }

    fn compare(self, a: &Issue, b: &Issue) -> Ordering {
        match self {
            SortKey::None => Ordering::Equal,
            SortKey::Path => a.path.cmp(&b.path),
            SortKey::Line => a.line.cmp(&b.line),
            SortKey::Column => a.col.cmp(&b.col),
            SortKey::Severity => a.severity.cmp(&b.severity),
            SortKey::Message => a.message.cmp(&b.message),
            SortKey::Linter => a.linter_label().cmp(&b.linter_label()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::SortKey(s.to_string()))
    }
}

/// Parses a list of sort key names.
pub fn parse_sort_keys<S: AsRef<str>>(names: &[S]) -> Result<Vec<SortKey>, ConfigError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}

/// Sorts issues by `keys`, a composite stable comparator.
///
/// An empty list, or one made only of [`SortKey::None`], leaves the order as is.
pub fn sort_issues(issues: &mut [Issue], keys: &[SortKey]) {
    if keys.iter().all(|k| *k == SortKey::None) {
        return;
    }
    issues.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Include/exclude filter over the rendered form of an issue.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl IssueFilter {
    /// Builds a filter from pattern lists; each list is joined with `|`.
    pub fn from_patterns<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: join_patterns("include", include)?,
            exclude: join_patterns("exclude", exclude)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    /// Returns true if `rendered` survives the filter. Exclusion wins over inclusion.
    pub fn accepts(&self, rendered: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|re| re.is_match(rendered)) {
            return false;
        }
        self.include.as_ref().is_none_or(|re| re.is_match(rendered))
    }

    /// Keeps the issues whose rendering through `format` is accepted.
    pub fn apply(&self, issues: Vec<Issue>, format: &Template) -> Vec<Issue> {
        if self.is_empty() {
            return issues;
        }
        issues
            .into_iter()
            .filter(|issue| self.accepts(&issue.render(format)))
            .collect()
    }
}

fn join_patterns<S: AsRef<str>>(
    kind: &'static str,
    patterns: &[S],
) -> Result<Option<Regex>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let joined = patterns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&joined)
        .map(Some)
        .map_err(|source| ConfigError::Filter { kind, source })
}
