//! Aggregation of issues reported by more than one linter.
//!
//! Two kinds of groups are collapsed:
//!
//! - issues from linters sharing a [`MergeRule`], compared by that rule's
//!   [`MergeKey`];
//! - otherwise, issues with the same path, line, column, and normalized
//!   message, whichever linters reported them.
//!
//! A group never holds two issues from the same linter. A collapsed group
//! becomes its most severe member, carrying every contributing linter name.
//! Aggregating an already aggregated set is a no-op.

use std::collections::HashMap;

use tracing::debug;

use crate::issue::Issue;
use crate::registry::{MergeKey, MergeRule};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Rule {
        rule: usize,
        path: String,
        line: u32,
        message: Option<String>,
    },
    Exact {
        path: String,
        line: u32,
        col: u32,
        message: String,
    },
}

/// Merges duplicate issues according to a merge rule table.
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    rules: &'a [MergeRule],
    enabled: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(rules: &'a [MergeRule], enabled: bool) -> Self {
        Self { rules, enabled }
    }

    /// Aggregates `issues`. When disabled, returns them untouched.
    ///
    /// Output order follows the first appearance of each group.
    pub fn aggregate(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if !self.enabled {
            return issues;
        }

        let total = issues.len();
        let mut index: HashMap<GroupKey, Vec<usize>> = HashMap::new();
        let mut groups: Vec<Vec<Issue>> = Vec::new();
        for issue in issues {
            let slots = index.entry(self.key(&issue)).or_default();
            // A group holds at most one issue per linter; a linter's own
            // distinct findings on one line stay separate.
            let open = slots
                .iter()
                .copied()
                .find(|&slot| !shares_linter(&groups[slot], &issue));
            match open {
                Some(slot) => groups[slot].push(issue),
                None => {
                    slots.push(groups.len());
                    groups.push(vec![issue]);
                }
            }
        }

        let merged: Vec<Issue> = groups.into_iter().map(collapse).collect();
        debug!("aggregated {} issues into {}", total, merged.len());
        merged
    }

    fn key(&self, issue: &Issue) -> GroupKey {
        let rule = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.linters.contains(&issue.linter));
        match rule {
            Some((rule, MergeRule { key, .. })) => GroupKey::Rule {
                rule,
                path: issue.path.clone(),
                line: issue.line,
                message: match key {
                    MergeKey::PathLine => None,
                    MergeKey::PathLineMessage => Some(normalize_message(&issue.message)),
                },
            },
            None => GroupKey::Exact {
                path: issue.path.clone(),
                line: issue.line,
                col: issue.col,
                message: normalize_message(&issue.message),
            },
        }
    }
}

fn shares_linter(group: &[Issue], issue: &Issue) -> bool {
    group
        .iter()
        .any(|member| member.linters().any(|name| issue.linters().any(|other| other == name)))
}

fn collapse(mut group: Vec<Issue>) -> Issue {
    if group.len() == 1 {
        return group.remove(0);
    }

    let contributors: Vec<String> = group
        .iter()
        .flat_map(|issue| issue.linters().map(str::to_string).collect::<Vec<_>>())
        .collect();
    let severity = group
        .iter()
        .map(|issue| issue.severity)
        .min()
        .unwrap_or_default();

    group.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| (a.col == 0).cmp(&(b.col == 0)))
            .then_with(|| a.linter.cmp(&b.linter))
    });
    let representative = group.swap_remove(0);
    representative
        .with_severity(severity)
        .with_contributors(contributors)
}

/// Lowercases and collapses whitespace so cosmetic differences don't split groups.
pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use crate::registry::Registry;
    use pretty_assertions::assert_eq;

    fn rules() -> Vec<MergeRule> {
        vec![MergeRule::new(["a", "b"], MergeKey::PathLine)]
    }

    fn scenario() -> Vec<Issue> {
        vec![
            Issue::new("a", "file.go")
                .with_position(10, 5)
                .with_message("unused variable x"),
            Issue::new("b", "file.go")
                .with_position(10, 0)
                .with_message("x declared and not used"),
        ]
    }

    #[test]
    fn test_disabled_passes_through() {
        let rules = rules();
        let out = Aggregator::new(&rules, false).aggregate(scenario());
        assert_eq!(out, scenario());
    }

    #[test]
    fn test_mergeable_linters_collapse_on_path_line() {
        let rules = rules();
        let out = Aggregator::new(&rules, true).aggregate(scenario());

        assert_eq!(out.len(), 1);
        let merged = &out[0];
        assert_eq!(merged.linter_label(), "a, b");
        assert_eq!(merged.col, 5, "representative keeps the known column");
        assert_eq!(merged.message, "unused variable x");
    }

    #[test]
    fn test_unrelated_linters_only_merge_identical_findings() {
        let out = Aggregator::new(&[], true).aggregate(scenario());
        assert_eq!(out.len(), 2);

        let identical = vec![
            Issue::new("golint", "a.go")
                .with_position(1, 2)
                .with_message("Bad  name"),
            Issue::new("vet", "a.go")
                .with_position(1, 2)
                .with_message("bad name"),
        ];
        let out = Aggregator::new(&[], true).aggregate(identical);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].linter_label(), "golint, vet");
    }

    #[test]
    fn test_merged_severity_is_most_severe() {
        let rules = rules();
        let issues = vec![
            Issue::new("a", "f.go").with_position(3, 1),
            Issue::new("b", "f.go")
                .with_position(3, 1)
                .with_severity(Severity::Error),
        ];
        let out = Aggregator::new(&rules, true).aggregate(issues);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Error);
        assert_eq!(out[0].linter, "b");
    }

    #[test]
    fn test_singletons_unchanged() {
        let rules = rules();
        let issues = vec![
            Issue::new("a", "f.go").with_position(1, 1),
            Issue::new("a", "f.go").with_position(2, 1),
            Issue::new("c", "g.go").with_position(1, 1),
        ];
        let out = Aggregator::new(&rules, true).aggregate(issues.clone());
        assert_eq!(out, issues);
    }

    #[test]
    fn test_idempotent() {
        let rules = vec![
            MergeRule::new(["a", "b"], MergeKey::PathLine),
            MergeRule::new(["c", "d"], MergeKey::PathLineMessage),
        ];
        let issues = vec![
            Issue::new("a", "f.go").with_position(1, 1).with_message("x"),
            Issue::new("b", "f.go").with_position(1, 0).with_message("y"),
            Issue::new("c", "f.go").with_position(2, 1).with_message("Same"),
            Issue::new("d", "f.go").with_position(2, 4).with_message("same"),
            Issue::new("d", "f.go").with_position(2, 4).with_message("other"),
            Issue::new("e", "g.go").with_position(7, 7).with_message("z"),
            Issue::new("f", "g.go").with_position(7, 7).with_message("z"),
        ];
        let aggregator = Aggregator::new(&rules, true);
        let once = aggregator.aggregate(issues);
        let twice = aggregator.aggregate(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[test]
    fn test_same_linter_findings_on_one_line_survive() {
        let registry = Registry::with_defaults().unwrap();
        let issues = vec![
            Issue::new("megacheck", "a.go")
                .with_position(10, 2)
                .with_message("should use strings.Contains"),
            Issue::new("megacheck", "a.go")
                .with_position(10, 6)
                .with_message("func unusedThing is unused"),
            Issue::new("gosimple", "a.go")
                .with_position(10, 2)
                .with_message("should use strings.Contains"),
        ];
        let aggregator = Aggregator::new(registry.merge_rules(), true);
        let out = aggregator.aggregate(issues);

        let summary: Vec<(String, &str)> = out
            .iter()
            .map(|issue| (issue.linter_label().into_owned(), issue.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("gosimple, megacheck".to_string(), "should use strings.Contains"),
                ("megacheck".to_string(), "func unusedThing is unused"),
            ]
        );
        assert_eq!(aggregator.aggregate(out.clone()), out);
    }

    #[test]
    fn test_normalize_message() {
        assert_eq!(normalize_message("  Foo\tBAR  baz "), "foo bar baz");
    }
}
