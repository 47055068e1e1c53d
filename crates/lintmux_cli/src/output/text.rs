//! Text output formatter

use lintmux_core::{Issue, Template};

pub fn output_text(issues: &[Issue], format: &Template) {
    for line in render_text(issues, format) {
        println!("{}", line);
    }
}

fn render_text(issues: &[Issue], format: &Template) -> Vec<String> {
    issues.iter().map(|issue| issue.render(format)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintmux_core::{FORMAT_FIELDS, Severity};

    #[test]
    fn test_custom_format() {
        let format = Template::parse_with_fields("{severity}|{linter}|{path}:{line}", FORMAT_FIELDS)
            .unwrap();
        let issues = vec![
            Issue::new("vet", "a.go")
                .with_position(3, 0)
                .with_severity(Severity::Error),
            Issue::new("gosimple", "b.go")
                .with_position(1, 1)
                .with_contributors(["gosimple", "staticcheck"]),
        ];
        assert_eq!(
            render_text(&issues, &format),
            vec!["error|vet|a.go:3", "warning|gosimple, staticcheck|b.go:1"]
        );
    }
}
