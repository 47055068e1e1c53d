//! Lint command implementation

use std::path::Path;

use miette::{IntoDiagnostic, Result};
use tracing::info;

use lintmux_core::{
    Config, LinterSelection, OutputMode, Pipeline, Policy, PolicyBuilder, Report, parse_duration,
};

use super::{build_registry, load_config, split_pair};
use crate::cli::LintArgs;
use crate::output::output_report;

pub fn run_lint(args: &LintArgs) -> Result<u8> {
    let root = std::env::current_dir().into_diagnostic()?;
    let config = load_config(args, &root)?;
    let registry = build_registry(&config, args)?;
    let policy = build_policy(&config, args, &root)?;
    let linters = build_selection(&config, args)
        .resolve(&registry)
        .into_diagnostic()?;

    let paths = if args.paths.is_empty() {
        vec![".".to_string()]
    } else {
        args.paths.clone()
    };
    info!("linting {:?} with {}", paths, linters.join(", "));

    let pipeline = Pipeline::new(&registry, &policy);
    let report = pipeline.run(pipeline.jobs(&linters, &paths));

    for diagnostic in &report.diagnostics {
        eprintln!("WARNING: {}", diagnostic);
    }
    output_report(&report.issues, &policy)?;

    Ok(exit_status(&report))
}

/// 1 when issues were reported, 2 when diagnostics were emitted, or both.
fn exit_status(report: &Report) -> u8 {
    let mut status = 0;
    if !report.issues.is_empty() {
        status |= 1;
    }
    if !report.diagnostics.is_empty() {
        status |= 2;
    }
    status
}

fn build_selection(config: &Config, args: &LintArgs) -> LinterSelection {
    let mut selection = config.selection();
    selection.enable.extend(args.enable.iter().cloned());
    selection.disable.extend(args.disable.iter().cloned());
    selection.enable_all |= args.enable_all;
    selection.disable_all |= args.disable_all;
    selection.fast |= args.fast;
    selection
}

/// Defaults, then the configuration file, then flags.
fn build_policy(config: &Config, args: &LintArgs, root: &Path) -> Result<Policy> {
    let mut builder = config
        .apply(PolicyBuilder::new().root(root))
        .into_diagnostic()?;

    if let Some(format) = &args.format {
        builder = builder.format(format.as_str());
    }
    if let Some(concurrency) = args.concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(deadline) = &args.deadline {
        builder = builder.deadline(parse_duration(deadline).into_diagnostic()?);
    }
    if !args.sort.is_empty() {
        builder = builder.sort(args.sort.iter().cloned());
    }
    for pattern in &args.include {
        builder = builder.include(pattern.as_str());
    }
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.as_str());
    }
    for value in &args.severity {
        let (linter, severity) = split_pair("severity", value, ':')?;
        builder = builder.severity(linter, severity);
    }
    for value in &args.message_overrides {
        let (linter, template) = split_pair("message-overrides", value, ':')?;
        builder = builder.message_override(linter, template);
    }
    if args.tests {
        builder = builder.tests(true);
    }
    for value in &args.vars {
        let (name, text) = split_pair("var", value, '=')?;
        builder = builder.var(name, text);
    }

    let output = if args.json || config.json {
        OutputMode::Json
    } else if args.checkstyle || config.checkstyle {
        OutputMode::Checkstyle
    } else {
        OutputMode::Text
    };

    builder
        .aggregate(config.aggregate || args.aggregate)
        .errors_only(config.errors || args.errors)
        .warn_unmatched_nolint(config.warn_unmatched_nolint || args.warn_unmatched_nolint)
        .output(output)
        .build()
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintmux_core::{Issue, SortKey};

    #[test]
    fn test_exit_status_bits() {
        let mut report = Report::default();
        assert_eq!(exit_status(&report), 0);

        report.issues.push(Issue::new("vet", "a.go"));
        assert_eq!(exit_status(&report), 1);

        report
            .diagnostics
            .push(lintmux_core::Diagnostic::unmatched_nolint("a.go", 1));
        assert_eq!(exit_status(&report), 3);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            sort: vec!["line".to_string()],
            concurrency: Some(8),
            checkstyle: true,
            ..Config::default()
        };
        let args = LintArgs {
            concurrency: Some(2),
            json: true,
            sort: vec!["severity".to_string()],
            severity: vec!["golint:error".to_string()],
            ..LintArgs::default()
        };
        let policy = build_policy(&config, &args, Path::new("/src")).unwrap();

        assert_eq!(policy.concurrency(), 2);
        assert_eq!(policy.output(), OutputMode::Json);
        assert_eq!(policy.sort_keys(), &[SortKey::Severity]);
        assert_eq!(policy.severity_for("golint"), Some(lintmux_core::Severity::Error));
    }

    #[test]
    fn test_selection_merges_config_and_flags() {
        let config = Config {
            enable: vec!["vet".to_string()],
            ..Config::default()
        };
        let args = LintArgs {
            enable: vec!["golint".to_string()],
            fast: true,
            ..LintArgs::default()
        };
        let selection = build_selection(&config, &args);
        assert_eq!(selection.enable, vec!["vet", "golint"]);
        assert!(selection.fast);
    }
}
