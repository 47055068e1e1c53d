//! # lintmux_core
//!
//! Runs many external linters concurrently and merges what they report into
//! one normalized issue stream.
//!
//! This crate provides:
//! - The linter [`Registry`] and its built-in catalog
//! - Job building and the bounded-concurrency [`Scheduler`]
//! - Output parsing, `nolint` suppression, aggregation, filtering and sorting
//! - The [`Policy`] and configuration file model
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintmux_core::{Config, Pipeline, PolicyBuilder};
//!
//! let config = Config::from_file(".lintmux.jsonc")?;
//! let registry = config.registry()?;
//! let policy = config.apply(PolicyBuilder::new())?.build()?;
//! let linters = config.selection().resolve(&registry)?;
//!
//! let pipeline = Pipeline::new(&registry, &policy);
//! let report = pipeline.run(pipeline.jobs(&linters, &["./pkg"]));
//! for issue in &report.issues {
//!     println!("{}", issue.render(policy.format()));
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod defaults;
mod diagnostic;
mod error;
mod issue;
pub mod job;
pub mod nolint;
pub mod parser;
mod pipeline;
pub mod policy;
pub mod process;
pub mod registry;
pub mod scheduler;
pub mod sort;
pub mod template;

pub use aggregate::Aggregator;
pub use config::{Config, LinterEntry, parse_duration};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{ConfigError, JobError};
pub use issue::{DEFAULT_FORMAT, FORMAT_FIELDS, Issue, Severity};
pub use job::{Job, JobBuilder, LinterSelection};
pub use nolint::{FsSource, NolintFilter, SourceReader};
pub use parser::OutputParser;
pub use pipeline::{Pipeline, Report};
pub use policy::{OutputMode, Policy, PolicyBuilder};
pub use process::RawOutput;
pub use registry::{
    LinterDefinition, LinterSpec, MergeKey, MergeRule, Registry, SubstitutionRule, parse_linter_spec,
};
pub use scheduler::{Execution, JobResult, Scheduler};
pub use sort::{IssueFilter, SortKey};
pub use template::Template;
