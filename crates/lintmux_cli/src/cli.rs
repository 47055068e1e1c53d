//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// lintmux - run many linters concurrently and normalise their output
#[derive(Parser)]
#[command(name = "lintmux")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known linters
    Linters,
}

#[derive(Args, Debug, Default)]
pub struct LintArgs {
    /// Directories or files to lint (default: current directory)
    pub paths: Vec<String>,

    /// Configuration file path (default: .lintmux.jsonc or .lintmux.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable a linter (repeatable)
    #[arg(short = 'E', long = "enable", value_name = "LINTER")]
    pub enable: Vec<String>,

    /// Disable a linter (repeatable)
    #[arg(short = 'D', long = "disable", value_name = "LINTER")]
    pub disable: Vec<String>,

    /// Enable every known linter
    #[arg(long)]
    pub enable_all: bool,

    /// Start from no linters; combine with --enable
    #[arg(long)]
    pub disable_all: bool,

    /// Only run linters marked fast
    #[arg(long)]
    pub fast: bool,

    /// Define or override a linter
    #[arg(long = "linter", value_name = "NAME:COMMAND:PATTERN")]
    pub linters: Vec<String>,

    /// Override a linter's message template
    #[arg(long = "message-overrides", value_name = "LINTER:MESSAGE")]
    pub message_overrides: Vec<String>,

    /// Override a linter's severity
    #[arg(long = "severity", value_name = "LINTER:SEVERITY")]
    pub severity: Vec<String>,

    /// Set a command template variable
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// Issue format template
    #[arg(long, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Number of linters to run concurrently
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Exclude issues whose rendering matches (repeatable)
    #[arg(short = 'e', long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Only keep issues whose rendering matches (repeatable)
    #[arg(short = 'I', long, value_name = "REGEX")]
    pub include: Vec<String>,

    /// Sort keys: none, path, line, column, severity, message, linter
    #[arg(long, value_name = "KEY", value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Include test files
    #[arg(short, long)]
    pub tests: bool,

    /// Per-linter deadline, e.g. 30s or 2m; 0 disables it
    #[arg(long, value_name = "DURATION")]
    pub deadline: Option<String>,

    /// Only show errors
    #[arg(long)]
    pub errors: bool,

    /// Emit issues as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit issues as checkstyle XML
    #[arg(long)]
    pub checkstyle: bool,

    /// Merge issues reported by several linters
    #[arg(long)]
    pub aggregate: bool,

    /// Warn about nolint directives that suppress nothing
    #[arg(long)]
    pub warn_unmatched_nolint: bool,
}
