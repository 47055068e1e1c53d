//! JSON output formatter

use miette::{IntoDiagnostic, Result};
use lintmux_core::Issue;

pub fn output_json(issues: &[Issue]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(issues).into_diagnostic()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use lintmux_core::{Issue, Severity};

    #[test]
    fn test_array_schema() {
        let issues = vec![
            Issue::new("golint", "a.go")
                .with_position(1, 2)
                .with_message("m"),
            Issue::new("vet", "b.go")
                .with_severity(Severity::Error)
                .with_contributors(["gotype", "vet"]),
        ];
        let value = serde_json::to_value(&issues).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"linter": "golint", "severity": "warning", "path": "a.go", "line": 1, "col": 2, "message": "m"},
                {"linter": "gotype, vet", "severity": "error", "path": "b.go", "line": 0, "col": 0, "message": ""}
            ])
        );
    }

    #[test]
    fn test_empty_is_empty_array() {
        let issues: Vec<Issue> = Vec::new();
        assert_eq!(serde_json::to_string(&issues).unwrap(), "[]");
    }
}
