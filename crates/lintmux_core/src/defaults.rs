//! Built-in linter catalog and compatibility tables.

use crate::registry::MergeKey;

/// Static description of a built-in linter.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinLinter {
    pub name: &'static str,
    pub command: &'static str,
    pub pattern: &'static str,
    pub fast: bool,
    pub default_enabled: bool,
}

const fn linter(
    name: &'static str,
    command: &'static str,
    pattern: &'static str,
    fast: bool,
    default_enabled: bool,
) -> BuiltinLinter {
    BuiltinLinter {
        name,
        command,
        pattern,
        fast,
        default_enabled,
    }
}

const VET_PATTERN: &str =
    r"^(?:vet:.*?\.go:\s+)?(?P<path>.*?\.go):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<message>.*)$";

const CHECK_PATTERN: &str =
    r"^(?:[^:]+: )?(?P<path>.*?\.go):(?P<line>\d+):(?P<col>\d+):\s*(?P<message>.+)$";

/// Known linters, sorted by name.
pub const BUILTIN_LINTERS: &[BuiltinLinter] = &[
    linter("aligncheck", "aligncheck", CHECK_PATTERN, false, true),
    linter(
        "deadcode",
        "deadcode",
        r"^deadcode: (?P<path>.*?\.go):(?P<line>\d+):(?P<col>\d+):\s*(?P<message>.*)$",
        true,
        true,
    ),
    linter(
        "dupl",
        "dupl -plumbing -threshold {duplthreshold}",
        r"^(?P<path>.*?\.go):(?P<line>\d+)-\d+:\s*(?P<message>.*)$",
        true,
        false,
    ),
    linter(
        "errcheck",
        "errcheck -abspath {not_tests=-ignoretests}",
        "PATH:LINE:COL:MESSAGE",
        false,
        true,
    ),
    linter(
        "gas",
        "gas -fmt=csv",
        r"^(?P<path>.*?\.go),(?P<line>\d+),(?P<message>[^,]+,[^,]+,[^,]+)",
        true,
        false,
    ),
    linter(
        "goconst",
        "goconst -min-occurrences {min_occurrences} -min-length {min_const_length}",
        "PATH:LINE:COL:MESSAGE",
        true,
        true,
    ),
    linter(
        "gocyclo",
        "gocyclo -over {mincyclo}",
        r"^(?P<cyclo>\d+)\s+\S+\s(?P<function>\S+)\s+(?P<path>.*?\.go):(?P<line>\d+):(?P<col>\d+)$",
        true,
        true,
    ),
    linter("gofmt", "gofmt -l -s", r"^(?P<path>.*?\.go)$", true, false),
    linter("goimports", "goimports -l", r"^(?P<path>.*?\.go)$", true, false),
    linter(
        "golint",
        "golint -min_confidence {min_confidence}",
        "PATH:LINE:COL:MESSAGE",
        true,
        true,
    ),
    linter("gosimple", "gosimple", "PATH:LINE:COL:MESSAGE", false, false),
    linter("gotype", "gotype -e {tests=-t}", "PATH:LINE:COL:MESSAGE", true, true),
    linter("ineffassign", "ineffassign -n", "PATH:LINE:COL:MESSAGE", true, true),
    linter("interfacer", "interfacer", "PATH:LINE:COL:MESSAGE", false, true),
    linter(
        "lll",
        "lll -g -l {maxlinelength}",
        "PATH:LINE:MESSAGE",
        true,
        false,
    ),
    linter("megacheck", "megacheck", "PATH:LINE:COL:MESSAGE", false, true),
    linter("misspell", "misspell -j 1", "PATH:LINE:COL:MESSAGE", true, false),
    linter("staticcheck", "staticcheck", "PATH:LINE:COL:MESSAGE", false, false),
    linter("structcheck", "structcheck {tests=-t}", CHECK_PATTERN, false, true),
    linter("unconvert", "unconvert", "PATH:LINE:COL:MESSAGE", false, true),
    linter("unparam", "unparam", "PATH:LINE:COL:MESSAGE", false, false),
    linter("unused", "unused", "PATH:LINE:COL:MESSAGE", false, false),
    linter("varcheck", "varcheck", CHECK_PATTERN, false, true),
    linter("vet", "go tool vet", VET_PATTERN, true, true),
    linter("vetshadow", "go tool vet --shadow", VET_PATTERN, true, false),
];

/// Pattern shorthands accepted wherever an output pattern is expected.
pub const PREDEFINED_PATTERNS: &[(&str, &str)] = &[
    (
        "PATH:LINE:COL:MESSAGE",
        r"^(?P<path>.*?\.go):(?P<line>\d+):(?P<col>\d+):\s*(?P<message>.*)$",
    ),
    (
        "PATH:LINE:MESSAGE",
        r"^(?P<path>.*?\.go):(?P<line>\d+):\s*(?P<message>.*)$",
    ),
];

/// Linter groups known to report overlapping findings.
pub const MERGE_RULES: &[(&[&str], MergeKey)] = &[
    (
        &["gosimple", "megacheck", "staticcheck", "unused"],
        MergeKey::PathLine,
    ),
    (&["gotype", "vet", "vetshadow"], MergeKey::PathLine),
];

/// `(replaced linters, replacement)`: when every replaced linter is enabled,
/// they are swapped for the replacement.
pub const SUBSTITUTIONS: &[(&[&str], &str)] =
    &[(&["gosimple", "staticcheck", "unused"], "megacheck")];

/// Default values for command template variables.
pub const DEFAULT_VARS: &[(&str, &str)] = &[
    ("duplthreshold", "50"),
    ("mincyclo", "10"),
    ("maxlinelength", "80"),
    ("min_confidence", "0.800000"),
    ("min_occurrences", "3"),
    ("min_const_length", "3"),
    ("tests", ""),
    ("not_tests", "true"),
];

/// Default per-linter message overrides.
pub const DEFAULT_MESSAGE_OVERRIDES: &[(&str, &str)] = &[
    ("errcheck", "error return value not checked ({message})"),
    (
        "gocyclo",
        "cyclomatic complexity {cyclo} of function {function}() is high (> {mincyclo})",
    ),
    ("gofmt", "file is not gofmted with -s"),
    ("goimports", "file is not goimported"),
    ("structcheck", "unused struct field {message}"),
    ("unparam", "parameter {message}"),
    ("varcheck", "unused variable or constant {message}"),
];

/// Built-in default severities, attached to the matching linter definitions.
pub const DEFAULT_SEVERITIES: &[(&str, &str)] = &[("gotype", "error"), ("vet", "error")];
