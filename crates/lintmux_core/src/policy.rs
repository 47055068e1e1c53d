//! Run policy.
//!
//! A [`Policy`] is built once through [`PolicyBuilder`], which validates every
//! user-supplied string (format, templates, severities, sort keys, filters)
//! before any linter starts. Components receive it by reference and never
//! read ambient state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defaults::{DEFAULT_MESSAGE_OVERRIDES, DEFAULT_VARS};
use crate::error::ConfigError;
use crate::issue::{DEFAULT_FORMAT, FORMAT_FIELDS, Severity};
use crate::sort::{IssueFilter, SortKey, parse_sort_keys};
use crate::template::Template;

/// Default per-job deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// How the final issue list will be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
    /// Checkstyle groups by file, so issues are always sorted by path.
    Checkstyle,
}

/// Validated, immutable run policy.
#[derive(Debug, Clone)]
pub struct Policy {
    concurrency: usize,
    deadline: Duration,
    aggregate: bool,
    sort: Vec<SortKey>,
    filter: IssueFilter,
    format: Template,
    severity: BTreeMap<String, Severity>,
    message_overrides: BTreeMap<String, Template>,
    vars: BTreeMap<String, String>,
    warn_unmatched_nolint: bool,
    errors_only: bool,
    output: OutputMode,
    root: PathBuf,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Per-job deadline, `None` when unbounded.
    pub fn deadline(&self) -> Option<Duration> {
        (!self.deadline.is_zero()).then_some(self.deadline)
    }

    pub fn aggregate(&self) -> bool {
        self.aggregate
    }

    /// Effective sort keys: `[path]` for checkstyle output, otherwise as configured.
    pub fn sort_keys(&self) -> &[SortKey] {
        match self.output {
            OutputMode::Checkstyle => &[SortKey::Path],
            OutputMode::Text | OutputMode::Json => &self.sort,
        }
    }

    pub fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    pub fn format(&self) -> &Template {
        &self.format
    }

    /// Configured severity for `linter`, if overridden. Built-in per-linter
    /// severities live on the linter definitions instead.
    pub fn severity_for(&self, linter: &str) -> Option<Severity> {
        self.severity.get(linter).copied()
    }

    pub fn message_override(&self, linter: &str) -> Option<&Template> {
        self.message_overrides.get(linter)
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn warn_unmatched_nolint(&self) -> bool {
        self.warn_unmatched_nolint
    }

    /// Whether only error-severity issues are reported.
    pub fn errors_only(&self) -> bool {
        self.errors_only
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    /// Directory that linters run in and that paths are made relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Builder for [`Policy`].
///
/// Starts from the built-in defaults; later calls override earlier ones.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    concurrency: Option<usize>,
    deadline: Duration,
    aggregate: bool,
    sort: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    format: String,
    severity: BTreeMap<String, String>,
    message_overrides: BTreeMap<String, String>,
    vars: BTreeMap<String, String>,
    warn_unmatched_nolint: bool,
    errors_only: bool,
    output: OutputMode,
    root: Option<PathBuf>,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyBuilder {
    pub fn new() -> Self {
        let owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            concurrency: None,
            deadline: DEFAULT_DEADLINE,
            aggregate: false,
            sort: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            format: DEFAULT_FORMAT.to_string(),
            severity: BTreeMap::new(),
            message_overrides: owned(DEFAULT_MESSAGE_OVERRIDES),
            vars: owned(DEFAULT_VARS),
            warn_unmatched_nolint: false,
            errors_only: false,
            output: OutputMode::Text,
            root: None,
        }
    }

    /// Worker count. Defaults to the available parallelism.
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = Some(workers);
        self
    }

    /// Per-job deadline; [`Duration::ZERO`] disables it.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn aggregate(mut self, yes: bool) -> Self {
        self.aggregate = yes;
        self
    }

    /// Replaces the sort key list.
    pub fn sort<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an include pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Adds an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn severity(mut self, linter: impl Into<String>, severity: impl Into<String>) -> Self {
        self.severity.insert(linter.into(), severity.into());
        self
    }

    pub fn message_override(
        mut self,
        linter: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.message_overrides
            .insert(linter.into(), template.into());
        self
    }

    /// Sets a command template variable.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Includes test files; flips the `tests` and `not_tests` variables.
    pub fn tests(self, yes: bool) -> Self {
        let (tests, not_tests) = if yes { ("true", "") } else { ("", "true") };
        self.var("tests", tests).var("not_tests", not_tests)
    }

    pub fn warn_unmatched_nolint(mut self, yes: bool) -> Self {
        self.warn_unmatched_nolint = yes;
        self
    }

    pub fn errors_only(mut self, yes: bool) -> Self {
        self.errors_only = yes;
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Validates and compiles the policy.
    pub fn build(self) -> Result<Policy, ConfigError> {
        let concurrency = match self.concurrency {
            Some(0) => return Err(ConfigError::Concurrency),
            Some(n) => n,
            None => std::thread::available_parallelism().map_or(1, |n| n.get()),
        };

        let format = Template::parse_with_fields(&self.format, FORMAT_FIELDS)?;
        let sort = parse_sort_keys(&self.sort)?;
        let filter = IssueFilter::from_patterns(&self.include, &self.exclude)?;

        let severity = self
            .severity
            .into_iter()
            .map(|(linter, name)| Ok((linter, name.parse::<Severity>()?)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;
        let message_overrides = self
            .message_overrides
            .into_iter()
            .map(|(linter, source)| Ok((linter, Template::parse(&source)?)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let root = self.root.unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

        Ok(Policy {
            concurrency,
            deadline: self.deadline,
            aggregate: self.aggregate,
            sort,
            filter,
            format,
            severity,
            message_overrides,
            vars: self.vars,
            warn_unmatched_nolint: self.warn_unmatched_nolint,
            errors_only: self.errors_only,
            output: self.output,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let policy = PolicyBuilder::new().root("/src").build().unwrap();

        assert!(policy.concurrency() >= 1);
        assert_eq!(policy.deadline(), Some(DEFAULT_DEADLINE));
        assert!(!policy.aggregate());
        assert!(policy.sort_keys().is_empty());
        assert!(policy.filter().is_empty());
        assert_eq!(policy.format().as_str(), DEFAULT_FORMAT);
        assert_eq!(policy.severity_for("vet"), None);
        assert!(policy.message_override("gofmt").is_some());
        assert_eq!(policy.var("mincyclo"), Some("10"));
        assert_eq!(policy.root(), Path::new("/src"));
    }

    #[test]
    fn test_zero_deadline_is_unbounded() {
        let policy = PolicyBuilder::new()
            .deadline(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(policy.deadline(), None);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = PolicyBuilder::new().concurrency(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::Concurrency));
    }

    #[test]
    fn test_checkstyle_forces_path_sort() {
        let policy = PolicyBuilder::new()
            .sort(["severity", "line"])
            .output(OutputMode::Checkstyle)
            .build()
            .unwrap();
        assert_eq!(policy.sort_keys(), &[SortKey::Path]);

        let policy = PolicyBuilder::new()
            .sort(["severity", "line"])
            .output(OutputMode::Json)
            .build()
            .unwrap();
        assert_eq!(policy.sort_keys(), &[SortKey::Severity, SortKey::Line]);
    }

    #[test]
    fn test_invalid_values_rejected_at_build() {
        assert!(matches!(
            PolicyBuilder::new().sort(["colour"]).build(),
            Err(ConfigError::SortKey(_))
        ));
        assert!(matches!(
            PolicyBuilder::new().severity("golint", "fatal").build(),
            Err(ConfigError::Severity(_))
        ));
        assert!(matches!(
            PolicyBuilder::new().format("{path} {bogus}").build(),
            Err(ConfigError::Template { .. })
        ));
        assert!(matches!(
            PolicyBuilder::new().message_override("x", "{oops").build(),
            Err(ConfigError::Template { .. })
        ));
        assert!(matches!(
            PolicyBuilder::new().exclude("(").build(),
            Err(ConfigError::Filter { .. })
        ));
    }

    #[test]
    fn test_tests_flag_flips_vars() {
        let policy = PolicyBuilder::new().tests(true).build().unwrap();
        assert_eq!(policy.var("tests"), Some("true"));
        assert_eq!(policy.var("not_tests"), Some(""));
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let policy = PolicyBuilder::new()
            .severity("vet", "warning")
            .message_override("gofmt", "needs gofmt")
            .build()
            .unwrap();
        assert_eq!(policy.severity_for("vet"), Some(Severity::Warning));
        assert_eq!(
            policy.message_override("gofmt").map(Template::as_str),
            Some("needs gofmt")
        );
    }
}
