//! Turns linter output into issues.

use std::borrow::Cow;
use std::path::Path;

use regex::Captures;
use tracing::debug;

use crate::issue::{Issue, Severity};
use crate::policy::Policy;
use crate::process::RawOutput;
use crate::registry::LinterDefinition;

/// Parses the output of one linter.
pub struct OutputParser<'a> {
    definition: &'a LinterDefinition,
    policy: &'a Policy,
}

impl<'a> OutputParser<'a> {
    pub fn new(definition: &'a LinterDefinition, policy: &'a Policy) -> Self {
        Self { definition, policy }
    }

    /// One issue per matching line of stdout, then stderr when the linter's
    /// definition asks for it. Lines that don't match are dropped.
    pub fn parse(&self, output: &RawOutput) -> Vec<Issue> {
        let stderr = if self.definition.stderr {
            output.stderr.as_str()
        } else {
            ""
        };
        let issues: Vec<Issue> = output
            .stdout
            .lines()
            .chain(stderr.lines())
            .filter_map(|line| self.parse_line(line.trim_end_matches('\r')))
            .collect();
        debug!("{}: {} hits", self.definition.name, issues.len());
        issues
    }

    /// Parses a single output line.
    pub fn parse_line(&self, line: &str) -> Option<Issue> {
        let captures = self.definition.pattern.captures(line)?;
        let path = captures.name("path").map(|m| m.as_str()).unwrap_or("");
        if path.is_empty() {
            return None;
        }

        let pattern = &self.definition.pattern;
        let number = |group: &str, present: bool| {
            present
                .then(|| captures.name(group))
                .flatten()
                .and_then(|m| m.as_str().trim().parse::<u32>().ok())
                .unwrap_or(0)
        };
        let message = if pattern.has_message() {
            captures.name("message").map_or("", |m| m.as_str()).trim_end()
        } else {
            ""
        };

        let issue = Issue::new(self.definition.name.as_str(), self.relativize(path))
            .with_position(
                number("line", pattern.has_line()),
                number("col", pattern.has_col()),
            )
            .with_severity(self.severity(&captures))
            .with_message(self.message(&captures, message));
        Some(issue)
    }

    /// Captured severity, then the configured override, then the
    /// definition's default, then warning.
    fn severity(&self, captures: &Captures<'_>) -> Severity {
        self.definition
            .pattern
            .has_severity()
            .then(|| captures.name("severity"))
            .flatten()
            .and_then(|m| m.as_str().parse().ok())
            .or_else(|| self.policy.severity_for(&self.definition.name))
            .or(self.definition.severity)
            .unwrap_or_default()
    }

    fn message(&self, captures: &Captures<'_>, message: &str) -> String {
        let Some(template) = self.policy.message_override(&self.definition.name) else {
            return message.to_string();
        };
        template.render(|name| match name {
            "message" => Some(message),
            _ => captures
                .name(name)
                .map(|m| m.as_str())
                .or_else(|| self.policy.var(name)),
        })
    }

    /// Makes absolute paths under the policy root relative to it.
    fn relativize(&self, path: &str) -> String {
        relativize(self.policy.root(), path).into_owned()
    }
}

fn relativize<'p>(root: &Path, path: &'p str) -> Cow<'p, str> {
    let candidate = Path::new(path);
    if !candidate.is_absolute() {
        return Cow::Borrowed(path);
    }
    match candidate.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => Cow::Owned(rel.to_string_lossy().into_owned()),
        _ => Cow::Borrowed(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyBuilder;
    use crate::registry::LinterSpec;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn definition(name: &str, pattern: &str) -> LinterDefinition {
        let spec = LinterSpec {
            command: name.to_string(),
            pattern: pattern.to_string(),
            ..LinterSpec::default()
        };
        LinterDefinition::new(name, &spec).unwrap()
    }

    fn policy() -> Policy {
        PolicyBuilder::new().root("/work").build().unwrap()
    }

    fn output(stdout: &str) -> RawOutput {
        RawOutput {
            stdout: stdout.to_string(),
            ..RawOutput::default()
        }
    }

    #[test]
    fn test_counts_only_matching_lines() {
        let def = definition("a", "PATH:LINE:COL:MESSAGE");
        let policy = policy();
        let issues = OutputParser::new(&def, &policy).parse(&output(
            "banner\nfile.go:10:5: unused variable x\nsummary: 1 problem\nb.go:2:1: other\n",
        ));

        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0],
            Issue::new("a", "file.go")
                .with_position(10, 5)
                .with_message("unused variable x")
        );
    }

    #[test]
    fn test_missing_col_group_yields_zero() {
        let def = definition("b", "PATH:LINE:MESSAGE");
        let policy = policy();
        let issues = OutputParser::new(&def, &policy)
            .parse(&output("file.go:10: x declared and not used\n"));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].line, 10);
        assert_eq!(issues[0].col, 0);
        assert_eq!(issues[0].message, "x declared and not used");
    }

    #[test]
    fn test_absent_groups_leave_defaults() {
        let def = definition("d", r"^(?P<path>\S+\.go) (?P<extra>\d+)$");
        let policy = policy();
        let issue = OutputParser::new(&def, &policy)
            .parse_line("pkg/a.go 12")
            .unwrap();
        assert_eq!(
            issue,
            Issue::new("d", "pkg/a.go")
        );
    }

    #[test]
    fn test_unparsable_numbers_degrade_to_zero() {
        let def = definition("c", r"^(?P<path>[^:]+):(?P<line>[^:]*):(?P<message>.*)$");
        let policy = policy();
        let issue = OutputParser::new(&def, &policy)
            .parse_line("a.go:99999999999:huge")
            .unwrap();
        assert_eq!(issue.line, 0);
    }

    #[test]
    fn test_stderr_respects_definition() {
        let mut def = definition("a", "PATH:LINE:MESSAGE");
        let policy = policy();
        let raw = RawOutput {
            stdout: "a.go:1: out\n".to_string(),
            stderr: "b.go:2: err\n".to_string(),
            ..RawOutput::default()
        };
        assert_eq!(OutputParser::new(&def, &policy).parse(&raw).len(), 2);

        def.stderr = false;
        assert_eq!(OutputParser::new(&def, &policy).parse(&raw).len(), 1);
    }

    #[rstest]
    #[case::captured("a.go:1:error:boom", Some("warning"), None, Severity::Error)]
    #[case::policy_over_default("a.go:1::boom", Some("error"), Some("warning"), Severity::Error)]
    #[case::definition_default("a.go:1::boom", None, Some("error"), Severity::Error)]
    #[case::fallback("a.go:1::boom", None, None, Severity::Warning)]
    #[case::unknown_captured("a.go:1:fatal:boom", None, None, Severity::Warning)]
    fn test_severity_precedence(
        #[case] line: &str,
        #[case] configured: Option<&str>,
        #[case] default: Option<&str>,
        #[case] expected: Severity,
    ) {
        let spec = LinterSpec {
            command: "x".to_string(),
            pattern: r"^(?P<path>[^:]+):(?P<line>\d+):(?P<severity>[a-z]*):(?P<message>.*)$"
                .to_string(),
            severity: default.map(str::to_string),
            ..LinterSpec::default()
        };
        let def = LinterDefinition::new("x", &spec).unwrap();
        let mut builder = PolicyBuilder::new();
        if let Some(configured) = configured {
            builder = builder.severity("x", configured);
        }
        let policy = builder.build().unwrap();

        let issue = OutputParser::new(&def, &policy).parse_line(line).unwrap();
        assert_eq!(issue.severity, expected);
    }

    #[test]
    fn test_redefined_builtin_severity_applies() {
        let mut registry = crate::registry::Registry::with_defaults().unwrap();
        let policy = policy();
        let vet = registry.get("vet").unwrap();
        let issue = OutputParser::new(vet, &policy).parse_line("a.go:1:2: boom").unwrap();
        assert_eq!(issue.severity, Severity::Error);

        registry
            .define(
                "vet",
                &LinterSpec {
                    severity: Some("warning".to_string()),
                    ..LinterSpec::default()
                },
            )
            .unwrap();
        let vet = registry.get("vet").unwrap();
        let issue = OutputParser::new(vet, &policy).parse_line("a.go:1:2: boom").unwrap();
        assert_eq!(issue.severity, Severity::Warning);
    }

    #[test]
    fn test_message_override_uses_groups_and_vars() {
        let def = definition(
            "gocyclo",
            r"^(?P<cyclo>\d+)\s+\S+\s(?P<function>\S+)\s+(?P<path>.*?\.go):(?P<line>\d+):(?P<col>\d+)$",
        );
        let policy = policy();
        let issue = OutputParser::new(&def, &policy)
            .parse_line("15 main run main.go:3:1")
            .unwrap();
        assert_eq!(
            issue.message,
            "cyclomatic complexity 15 of function run() is high (> 10)"
        );
    }

    #[test]
    fn test_message_override_wraps_original() {
        let def = definition("errcheck", "PATH:LINE:COL:MESSAGE");
        let policy = policy();
        let issue = OutputParser::new(&def, &policy)
            .parse_line("main.go:7:2:\tf.Close()")
            .unwrap();
        assert_eq!(
            issue.message,
            "error return value not checked (f.Close())"
        );
    }

    #[rstest]
    #[case::under_root("/work/pkg/a.go", "pkg/a.go")]
    #[case::outside_root("/elsewhere/a.go", "/elsewhere/a.go")]
    #[case::already_relative("pkg/a.go", "pkg/a.go")]
    fn test_relativize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(relativize(Path::new("/work"), input), expected);
    }

    #[test]
    fn test_empty_path_dropped() {
        let def = definition("x", r"^(?P<path>[a-z]*)!(?P<message>.*)$");
        let policy = policy();
        assert!(OutputParser::new(&def, &policy).parse_line("!oops").is_none());
    }
}
