//! Linter registry.
//!
//! Holds every known [`LinterDefinition`], validated once at load time: the
//! command template is parsed and split, the output pattern is compiled and
//! its capture groups are mapped to issue fields. The registry also carries
//! the two static rule tables consulted later in the pipeline: which linters
//! may be merged by aggregation, and which linter combinations are swapped for
//! a single combined linter by the job builder.

use std::collections::{BTreeMap, BTreeSet};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{
    BUILTIN_LINTERS, DEFAULT_SEVERITIES, MERGE_RULES, PREDEFINED_PATTERNS, SUBSTITUTIONS,
};
use crate::error::ConfigError;
use crate::issue::Severity;
use crate::template::Template;

/// Raw, unvalidated linter definition, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinterSpec {
    /// Command template. Empty means "keep the built-in command".
    #[serde(default)]
    pub command: String,
    /// Output pattern or shorthand. Empty means "keep the built-in pattern".
    #[serde(default)]
    pub pattern: String,
    /// Default severity for this linter's issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Whether the linter is cheap enough for `--fast` runs.
    #[serde(default)]
    pub fast: bool,
    /// Whether output is meaningful when the linter exits non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_output: Option<bool>,
    /// Whether stderr is parsed along with stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<bool>,
}

impl LinterSpec {
    /// Parses the `command:pattern` shorthand.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let (command, pattern) = spec.split_once(':').ok_or_else(|| {
            ConfigError::LinterSpec(format!(
                "{spec:?} needs at least two components (command:pattern)"
            ))
        })?;
        Ok(Self {
            command: command.to_string(),
            pattern: pattern.to_string(),
            ..Self::default()
        })
    }

    /// Layers `other` over `self`: non-empty fields of `other` win.
    pub fn overlay(mut self, other: &LinterSpec) -> Self {
        if !other.command.is_empty() {
            self.command = other.command.clone();
        }
        if !other.pattern.is_empty() {
            self.pattern = other.pattern.clone();
        }
        if other.severity.is_some() {
            self.severity = other.severity.clone();
        }
        self.fast |= other.fast;
        if other.partial_output.is_some() {
            self.partial_output = other.partial_output;
        }
        if other.stderr.is_some() {
            self.stderr = other.stderr;
        }
        self
    }
}

/// Parses a `name:command:pattern` definition.
pub fn parse_linter_spec(definition: &str) -> Result<(String, LinterSpec), ConfigError> {
    let (name, rest) = definition
        .split_once(':')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| ConfigError::LinterSpec(definition.to_string()))?;
    let spec =
        LinterSpec::parse(rest).map_err(|_| ConfigError::LinterSpec(definition.to_string()))?;
    Ok((name.to_string(), spec))
}

/// Expands a predefined pattern shorthand, or returns the pattern unchanged.
pub fn expand_pattern(pattern: &str) -> &str {
    PREDEFINED_PATTERNS
        .iter()
        .find(|(name, _)| *name == pattern)
        .map_or(pattern, |(_, regex)| *regex)
}

/// A compiled output pattern together with the fields it can produce.
#[derive(Debug, Clone)]
pub struct OutputPattern {
    regex: Regex,
    has_line: bool,
    has_col: bool,
    has_message: bool,
    has_severity: bool,
}

impl OutputPattern {
    /// Compiles a pattern (or shorthand) for `linter`.
    ///
    /// The pattern must contain a `path` group; `line`, `col`, `message` and
    /// `severity` are optional. Other named groups become template variables.
    pub fn compile(linter: &str, pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(expand_pattern(pattern)).map_err(|source| ConfigError::Pattern {
            linter: linter.to_string(),
            source,
        })?;
        let has = |group: &str| regex.capture_names().flatten().any(|n| n == group);
        if !has("path") {
            return Err(ConfigError::MissingPathGroup(linter.to_string()));
        }
        Ok(Self {
            has_line: has("line"),
            has_col: has("col"),
            has_message: has("message"),
            has_severity: has("severity"),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn captures<'t>(&self, line: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(line)
    }

    pub fn has_line(&self) -> bool {
        self.has_line
    }

    pub fn has_col(&self) -> bool {
        self.has_col
    }

    pub fn has_message(&self) -> bool {
        self.has_message
    }

    pub fn has_severity(&self) -> bool {
        self.has_severity
    }
}

/// A validated linter definition.
#[derive(Debug, Clone)]
pub struct LinterDefinition {
    pub name: String,
    /// Command template as written.
    pub command: String,
    /// The command split into argument templates.
    pub args: Vec<Template>,
    pub pattern: OutputPattern,
    pub severity: Option<Severity>,
    pub fast: bool,
    pub default_enabled: bool,
    pub partial_output: bool,
    pub stderr: bool,
}

impl LinterDefinition {
    /// Validates a spec into a definition.
    pub fn new(name: &str, spec: &LinterSpec) -> Result<Self, ConfigError> {
        let args = Self::compile_command(name, &spec.command)?;
        let pattern = OutputPattern::compile(name, &spec.pattern)?;
        let severity = spec
            .severity
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?;

        Ok(Self {
            name: name.to_string(),
            command: spec.command.clone(),
            args,
            pattern,
            severity,
            fast: spec.fast,
            default_enabled: false,
            partial_output: spec.partial_output.unwrap_or(true),
            stderr: spec.stderr.unwrap_or(true),
        })
    }

    fn compile_command(name: &str, command: &str) -> Result<Vec<Template>, ConfigError> {
        let words = shell_words::split(command)
            .map_err(|e| ConfigError::command(name, e.to_string()))?;
        if words.is_empty() {
            return Err(ConfigError::command(name, "empty command"));
        }
        words
            .iter()
            .map(|word| {
                Template::parse(word).map_err(|e| ConfigError::command(name, e.to_string()))
            })
            .collect()
    }

    /// Returns true if any argument references `{name}`.
    pub fn references(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg.references(name))
    }
}

/// How aggregation decides that two issues describe the same finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MergeKey {
    /// Same path and line, whatever the message says.
    PathLine,
    /// Same path, line, and normalized message.
    PathLineMessage,
}

/// A set of linters whose findings may be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub linters: BTreeSet<String>,
    pub key: MergeKey,
}

impl MergeRule {
    pub fn new<I, S>(linters: I, key: MergeKey) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            linters: linters.into_iter().map(Into::into).collect(),
            key,
        }
    }
}

/// Swaps a group of linters for one combined linter when all are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub replaces: BTreeSet<String>,
    pub with: String,
}

impl SubstitutionRule {
    pub fn new<I, S>(replaces: I, with: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replaces: replaces.into_iter().map(Into::into).collect(),
            with: with.into(),
        }
    }
}

/// Catalog of linter definitions plus the merge and substitution tables.
#[derive(Debug, Clone)]
pub struct Registry {
    linters: BTreeMap<String, LinterDefinition>,
    custom: BTreeSet<String>,
    merge_rules: Vec<MergeRule>,
    substitutions: Vec<SubstitutionRule>,
}

impl Registry {
    /// An empty registry without rule tables.
    pub fn empty() -> Self {
        Self {
            linters: BTreeMap::new(),
            custom: BTreeSet::new(),
            merge_rules: Vec::new(),
            substitutions: Vec::new(),
        }
    }

    /// The built-in catalog with its default merge and substitution tables.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::empty();
        for builtin in BUILTIN_LINTERS {
            let spec = builtin_spec(builtin.name).unwrap_or_default();
            let mut definition = LinterDefinition::new(builtin.name, &spec)?;
            definition.default_enabled = builtin.default_enabled;
            registry
                .linters
                .insert(builtin.name.to_string(), definition);
        }
        registry.merge_rules = MERGE_RULES
            .iter()
            .map(|(linters, key)| MergeRule::new(linters.iter().copied(), *key))
            .collect();
        registry.substitutions = SUBSTITUTIONS
            .iter()
            .map(|(replaces, with)| SubstitutionRule::new(replaces.iter().copied(), *with))
            .collect();
        Ok(registry)
    }

    /// Adds or overrides a linter.
    ///
    /// A spec for a built-in name keeps the built-in's values for any field it
    /// leaves empty.
    pub fn define(&mut self, name: &str, spec: &LinterSpec) -> Result<(), ConfigError> {
        let base = builtin_spec(name).unwrap_or_default();
        let merged = base.overlay(spec);
        let mut definition = LinterDefinition::new(name, &merged)?;
        if let Some(existing) = self.linters.get(name) {
            definition.default_enabled = existing.default_enabled;
        }
        debug!(
            "defined linter {}: command={:?} pattern={:?}",
            name,
            definition.command,
            definition.pattern.as_str()
        );
        self.linters.insert(name.to_string(), definition);
        self.custom.insert(name.to_string());
        Ok(())
    }

    pub fn add_merge_rule(&mut self, rule: MergeRule) {
        self.merge_rules.push(rule);
    }

    pub fn get(&self, name: &str) -> Option<&LinterDefinition> {
        self.linters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.linters.contains_key(name)
    }

    /// Returns true if `name` was added or overridden through [`Registry::define`].
    pub fn is_custom(&self, name: &str) -> bool {
        self.custom.contains(name)
    }

    /// Iterates over definitions sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &LinterDefinition> {
        self.linters.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.linters.keys().map(String::as_str)
    }

    pub fn merge_rules(&self) -> &[MergeRule] {
        &self.merge_rules
    }

    pub fn substitutions(&self) -> &[SubstitutionRule] {
        &self.substitutions
    }
}

fn builtin_spec(name: &str) -> Option<LinterSpec> {
    BUILTIN_LINTERS
        .iter()
        .find(|b| b.name == name)
        .map(|b| LinterSpec {
            command: b.command.to_string(),
            pattern: b.pattern.to_string(),
            severity: DEFAULT_SEVERITIES
                .iter()
                .find(|(linter, _)| *linter == name)
                .map(|(_, severity)| severity.to_string()),
            fast: b.fast,
            ..LinterSpec::default()
        })
}
