//! `nolint` suppression directives.
//!
//! A directive is a comment containing `nolint`, optionally followed by a
//! colon and a comma-separated list of linter names:
//!
//! ```text
//! x := f() // nolint
//! y := g() // nolint: errcheck, gosec
//! // nolint: golint
//! func Exported() {}
//! ```
//!
//! A directive suppresses matching issues on its own line. A directive that
//! sits alone on a line also covers the line after it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::diagnostic::Diagnostic;
use crate::issue::Issue;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?://|#|/\*|--)\s*nolint\b(?:\s*:\s*([\w\-]+(?:\s*,\s*[\w\-]+)*))?")
        .expect("nolint directive regex is valid")
});

/// Reads source files by their issue path.
pub trait SourceReader {
    fn read(&self, path: &Path) -> Option<String>;
}

/// Reads sources from the filesystem, resolving relative paths against a root.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceReader for FsSource {
    fn read(&self, path: &Path) -> Option<String> {
        fs::read_to_string(self.root.join(path)).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    line: u32,
    /// Empty means every linter.
    linters: BTreeSet<String>,
    /// The directive is the only thing on its line.
    standalone: bool,
    matched: bool,
}

impl Directive {
    fn applies_to(&self, line: u32) -> bool {
        self.line == line || (self.standalone && self.line + 1 == line)
    }

    fn covers(&self, issue: &Issue) -> bool {
        self.linters.is_empty() || issue.linters().any(|name| self.linters.contains(name))
    }
}

fn parse_directives(source: &str) -> Vec<Directive> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, text)| {
            let captures = DIRECTIVE.captures(text)?;
            let start = captures.get(0)?.start();
            let linters = captures
                .get(1)
                .map(|list| {
                    list.as_str()
                        .split(',')
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            Some(Directive {
                line: u32::try_from(index + 1).ok()?,
                linters,
                standalone: text[..start].trim().is_empty(),
                matched: false,
            })
        })
        .collect()
}

/// Normalizes a path into the key used to identify a source file.
fn source_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Lists the files directly inside each target path (or the target itself when
/// it is a file), relative to `root` where possible.
pub fn source_files<S: AsRef<str>>(root: &Path, targets: &[S]) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();
    for target in targets {
        let target = root.join(target.as_ref());
        for entry in WalkDir::new(&target)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            files.insert(source_key(relative));
        }
    }
    files.into_iter().collect()
}

/// Drops issues suppressed by `nolint` directives and remembers which
/// directives were used.
pub struct NolintFilter<R> {
    reader: R,
    files: HashMap<PathBuf, Vec<Directive>>,
}

impl<R: SourceReader> NolintFilter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            files: HashMap::new(),
        }
    }

    /// Scans `paths` up front, so that directives in files without issues are
    /// known to [`NolintFilter::unmatched`].
    pub fn preload(&mut self, paths: &[PathBuf])
    where
        R: Sync,
    {
        let reader = &self.reader;
        let parsed: Vec<(PathBuf, Vec<Directive>)> = paths
            .par_iter()
            .map(|path| source_key(path))
            .filter(|key| !self.files.contains_key(key))
            .filter_map(|key| {
                let source = reader.read(&key)?;
                Some((key, parse_directives(&source)))
            })
            .collect();
        debug!("preloaded nolint directives from {} files", parsed.len());
        self.files.extend(parsed);
    }

    /// Returns the issues not covered by a directive.
    pub fn apply(&mut self, issues: Vec<Issue>) -> Vec<Issue> {
        let before = issues.len();
        let kept: Vec<Issue> = issues
            .into_iter()
            .filter(|issue| !self.suppress(issue))
            .collect();
        debug!("nolint suppressed {} issues", before - kept.len());
        kept
    }

    fn suppress(&mut self, issue: &Issue) -> bool {
        if issue.line == 0 {
            return false;
        }
        let key = source_key(Path::new(&issue.path));
        let reader = &self.reader;
        let directives = self.files.entry(key).or_insert_with_key(|key| {
            reader
                .read(key)
                .map(|source| parse_directives(&source))
                .unwrap_or_default()
        });

        let mut suppressed = false;
        for directive in directives
            .iter_mut()
            .filter(|d| d.applies_to(issue.line) && d.covers(issue))
        {
            directive.matched = true;
            suppressed = true;
        }
        suppressed
    }

    /// Directives that suppressed nothing, sorted by path then line.
    pub fn unmatched(&self) -> Vec<Diagnostic> {
        let sorted: BTreeMap<&PathBuf, &Vec<Directive>> = self.files.iter().collect();
        sorted
            .into_iter()
            .flat_map(|(path, directives)| {
                directives
                    .iter()
                    .filter(|d| !d.matched)
                    .map(move |d| Diagnostic::unmatched_nolint(path.to_string_lossy(), d.line))
            })
            .collect()
    }
}
