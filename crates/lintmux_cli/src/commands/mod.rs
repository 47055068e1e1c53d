pub mod lint;
pub mod linters;

use std::path::Path;

use miette::{IntoDiagnostic, Result, miette};
use tracing::debug;

use lintmux_core::{Config, Registry, parse_linter_spec};

use crate::cli::LintArgs;

/// Loads `--config`, or the configuration file found in `root`, or defaults.
pub fn load_config(args: &LintArgs, root: &Path) -> Result<Config> {
    if let Some(path) = &args.config {
        return Config::from_file(path).into_diagnostic();
    }
    match Config::discover(root).into_diagnostic()? {
        Some((path, config)) => {
            debug!("using configuration {}", path.display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// The configuration's registry plus any `--linter` definitions.
pub fn build_registry(config: &Config, args: &LintArgs) -> Result<Registry> {
    let mut registry = config.registry().into_diagnostic()?;
    for definition in &args.linters {
        let (name, spec) = parse_linter_spec(definition).into_diagnostic()?;
        registry.define(&name, &spec).into_diagnostic()?;
    }
    Ok(registry)
}

/// Splits a `KEY<sep>VALUE` flag value.
pub fn split_pair<'a>(flag: &str, value: &'a str, sep: char) -> Result<(&'a str, &'a str)> {
    value
        .split_once(sep)
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| miette!("invalid --{} value {:?}: expected KEY{}VALUE", flag, value, sep))
}
