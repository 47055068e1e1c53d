//! Checkstyle XML output formatter
//!
//! Issues arrive sorted by path, so each run of equal paths becomes one
//! `<file>` element.

use lintmux_core::Issue;
use xml::escape::escape_str_attribute;

pub fn output_checkstyle(issues: &[Issue]) {
    print!("{}", render_checkstyle(issues));
}

fn render_checkstyle(issues: &[Issue]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<checkstyle version=\"5.0\">\n");

    let mut current: Option<&str> = None;
    for issue in issues {
        if current != Some(issue.path.as_str()) {
            if current.is_some() {
                out.push_str("  </file>\n");
            }
            out.push_str(&format!(
                "  <file name=\"{}\">\n",
                escape_str_attribute(&issue.path)
            ));
            current = Some(issue.path.as_str());
        }
        out.push_str(&format!(
            "    <error column=\"{}\" line=\"{}\" message=\"{}\" severity=\"{}\" source=\"{}\" />\n",
            issue.col,
            issue.line,
            escape_str_attribute(&issue.message),
            issue.severity,
            escape_str_attribute(&issue.linter_label()),
        ));
    }
    if current.is_some() {
        out.push_str("  </file>\n");
    }
    out.push_str("</checkstyle>\n");
    out
}
