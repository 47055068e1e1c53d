//! Output formatting module

mod checkstyle;
mod json;
mod text;

use miette::Result;
use lintmux_core::{Issue, OutputMode, Policy};

pub fn output_report(issues: &[Issue], policy: &Policy) -> Result<()> {
    match policy.output() {
        OutputMode::Json => json::output_json(issues)?,
        OutputMode::Checkstyle => checkstyle::output_checkstyle(issues),
        OutputMode::Text => text::output_text(issues, policy.format()),
    }
    Ok(())
}
