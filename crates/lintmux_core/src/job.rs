//! Linter selection and job construction.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::registry::{LinterDefinition, Registry};

/// One linter invocation against one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Sequence number, unique within a run.
    pub id: usize,
    pub linter: String,
    pub path: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Job {
    /// Shell-quoted command line, for logs.
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(&self.args))
    }
}

/// Which linters the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinterSelection {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    /// Start from every known linter.
    pub enable_all: bool,
    /// Start from nothing instead of the default-enabled set.
    pub disable_all: bool,
    /// Keep only linters marked fast.
    pub fast: bool,
}

impl LinterSelection {
    /// Resolves the selection against `registry`.
    ///
    /// The starting set is every linter with `enable_all`, the `enable` list
    /// when it is non-empty or `disable_all` is set, and the default-enabled
    /// linters otherwise. `disable` is then removed, the fast filter applied,
    /// and finally the registry's substitution rules. Names come back sorted.
    pub fn resolve(&self, registry: &Registry) -> Result<Vec<String>, ConfigError> {
        let unknown: BTreeSet<&str> = self
            .enable
            .iter()
            .chain(&self.disable)
            .map(String::as_str)
            .filter(|name| !registry.contains(name))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownLinters(
                unknown.into_iter().collect::<Vec<_>>().join(", "),
            ));
        }

        let mut selected: BTreeSet<String> = if self.enable_all {
            registry.names().map(str::to_string).collect()
        } else if self.disable_all || !self.enable.is_empty() {
            self.enable.iter().cloned().collect()
        } else {
            registry
                .iter()
                .filter(|def| def.default_enabled)
                .map(|def| def.name.clone())
                .collect()
        };

        for name in &self.disable {
            selected.remove(name);
        }
        if self.fast {
            selected.retain(|name| registry.get(name).is_some_and(|def| def.fast));
        }

        for rule in registry.substitutions() {
            if !registry.contains(&rule.with) || !rule.replaces.is_subset(&selected) {
                continue;
            }
            if !self.enable_all {
                warn!(
                    "{} are all enabled, using {} instead",
                    rule.replaces.iter().cloned().collect::<Vec<_>>().join(", "),
                    rule.with
                );
            }
            selected.retain(|name| !rule.replaces.contains(name));
            selected.insert(rule.with.clone());
        }

        debug!("enabled linters: {:?}", selected);
        Ok(selected.into_iter().collect())
    }
}

/// Expands linters × paths into jobs.
pub struct JobBuilder<'a> {
    registry: &'a Registry,
    vars: &'a BTreeMap<String, String>,
}

impl<'a> JobBuilder<'a> {
    pub fn new(registry: &'a Registry, vars: &'a BTreeMap<String, String>) -> Self {
        Self { registry, vars }
    }

    /// Builds one job per (linter, path), linters in the given order, then paths.
    ///
    /// Linters missing from the registry are skipped.
    pub fn build<L, P>(&self, linters: &[L], paths: &[P]) -> Vec<Job>
    where
        L: AsRef<str>,
        P: AsRef<str>,
    {
        let mut jobs = Vec::with_capacity(linters.len() * paths.len());
        for name in linters {
            let Some(definition) = self.registry.get(name.as_ref()) else {
                warn!("linter {} is not defined, skipping", name.as_ref());
                continue;
            };
            for path in paths {
                let path = path.as_ref();
                match self.argv(definition, path) {
                    Some((program, args)) => jobs.push(Job {
                        id: jobs.len(),
                        linter: definition.name.clone(),
                        path: path.to_string(),
                        program,
                        args,
                    }),
                    None => warn!("command for {} renders empty, skipping", definition.name),
                }
            }
        }
        jobs
    }

    /// Renders the argument templates for `path`.
    ///
    /// Tokens that render empty are dropped. When no argument mentions
    /// `{path}`, the path is appended.
    fn argv(&self, definition: &LinterDefinition, path: &str) -> Option<(String, Vec<String>)> {
        let lookup = |name: &str| match name {
            "path" => Some(path),
            _ => self.vars.get(name).map(String::as_str),
        };
        let mut argv: Vec<String> = definition
            .args
            .iter()
            .map(|arg| arg.render(lookup))
            .filter(|arg| !arg.is_empty())
            .collect();
        if argv.is_empty() {
            return None;
        }
        if !definition.references("path") {
            argv.push(path.to_string());
        }
        let program = argv.remove(0);
        Some((program, argv))
    }
}
