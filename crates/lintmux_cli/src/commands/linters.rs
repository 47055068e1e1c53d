//! Linters command implementation

use std::path::Path;

use miette::{IntoDiagnostic, Result};

use lintmux_core::Registry;

use super::{build_registry, load_config};
use crate::cli::LintArgs;

pub fn run_linters(args: &LintArgs) -> Result<()> {
    let root = std::env::current_dir().into_diagnostic()?;
    let registry = load_registry(args, &root)?;
    for line in catalog_lines(&registry) {
        println!("{}", line);
    }
    Ok(())
}

fn load_registry(args: &LintArgs, root: &Path) -> Result<Registry> {
    let config = load_config(args, root)?;
    build_registry(&config, args)
}

/// One line per linter: name, flags, command, pattern.
fn catalog_lines(registry: &Registry) -> Vec<String> {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    registry
        .iter()
        .map(|def| {
            let mut flags = vec![if def.default_enabled { "enabled" } else { "disabled" }];
            if def.fast {
                flags.push("fast");
            }
            if registry.is_custom(&def.name) {
                flags.push("custom");
            }
            format!(
                "{:<width$}  ({})  {}  {}",
                def.name,
                flags.join(", "),
                def.command,
                def.pattern.as_str(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintmux_core::LinterSpec;

    #[test]
    fn test_catalog_lists_every_linter() {
        let registry = Registry::with_defaults().unwrap();
        let lines = catalog_lines(&registry);
        assert_eq!(lines.len(), registry.names().count());
        assert!(lines.iter().any(|l| l.starts_with("vet ") && l.contains("(enabled, fast)")));
        assert!(lines.iter().any(|l| l.starts_with("lll ") && l.contains("(disabled, fast)")));
    }

    #[test]
    fn test_catalog_marks_custom() {
        let mut registry = Registry::empty();
        registry
            .define("mine", &LinterSpec::parse("mine:PATH:LINE:MESSAGE").unwrap())
            .unwrap();
        let lines = catalog_lines(&registry);
        assert!(lines[0].starts_with("mine  (disabled, custom)  mine  "));
    }
}
