//! End-to-end run: schedule, parse, suppress, aggregate, filter, sort.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::diagnostic::Diagnostic;
use crate::issue::{Issue, Severity};
use crate::job::{Job, JobBuilder};
use crate::nolint::{FsSource, NolintFilter, source_files};
use crate::parser::OutputParser;
use crate::policy::Policy;
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::sort::sort_issues;

/// Final result of a run.
#[derive(Debug, Default)]
pub struct Report {
    /// Issues in their final order.
    pub issues: Vec<Issue>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Wires the pipeline stages together for one registry and policy.
pub struct Pipeline<'a> {
    registry: &'a Registry,
    policy: &'a Policy,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a Registry, policy: &'a Policy) -> Self {
        Self { registry, policy }
    }

    /// Builds the jobs for `linters` × `paths` using the policy's variables.
    pub fn jobs<L, P>(&self, linters: &[L], paths: &[P]) -> Vec<Job>
    where
        L: AsRef<str>,
        P: AsRef<str>,
    {
        JobBuilder::new(self.registry, self.policy.vars()).build(linters, paths)
    }

    /// Runs `jobs` and post-processes everything they report.
    pub fn run(&self, jobs: Vec<Job>) -> Report {
        let targets: BTreeSet<String> = jobs.iter().map(|job| job.path.clone()).collect();
        let job_count = jobs.len();

        let execution = Scheduler::new(self.policy.concurrency(), self.policy.deadline())
            .in_dir(self.policy.root())
            .run(jobs);

        let mut issues = Vec::new();
        let mut diagnostics = Vec::new();
        for result in execution.results.iter() {
            let Ok(output) = result.outcome else {
                continue;
            };
            let Some(definition) = self.registry.get(&result.job.linter) else {
                warn!("no definition for linter {}", result.job.linter);
                continue;
            };
            if !definition.partial_output && !output.success() {
                diagnostics.push(Diagnostic::exit_status(
                    &definition.name,
                    &result.job.path,
                    output.status,
                    &output.stderr,
                ));
            }
            issues.extend(OutputParser::new(definition, self.policy).parse(&output));
        }
        // Results have closed, so every worker is done and this does not block.
        let mut job_diagnostics: Vec<Diagnostic> = execution.diagnostics.iter().collect();
        job_diagnostics.append(&mut diagnostics);
        let mut diagnostics = job_diagnostics;
        debug!("{} jobs produced {} raw issues", job_count, issues.len());

        let mut nolint = NolintFilter::new(FsSource::new(self.policy.root()));
        if self.policy.warn_unmatched_nolint() {
            let targets: Vec<String> = targets.into_iter().collect();
            nolint.preload(&source_files(self.policy.root(), &targets));
        }
        let issues = nolint.apply(issues);
        if self.policy.warn_unmatched_nolint() {
            diagnostics.extend(nolint.unmatched());
        }

        let issues = Aggregator::new(self.registry.merge_rules(), self.policy.aggregate())
            .aggregate(issues);
        let mut issues = self.policy.filter().apply(issues, self.policy.format());
        sort_issues(&mut issues, self.policy.sort_keys());
        if self.policy.errors_only() {
            issues.retain(|issue| issue.severity == Severity::Error);
        }

        info!(
            "{} issues, {} diagnostics from {} jobs",
            issues.len(),
            diagnostics.len(),
            job_count
        );
        Report {
            issues,
            diagnostics,
        }
    }
}
