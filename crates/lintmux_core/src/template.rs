//! `{name}` placeholder templates.
//!
//! Used for linter command lines, message overrides, and the issue format.
//! Two forms are recognised:
//!
//! - `{name}` expands to the value of `name` (empty when unset).
//! - `{name=text}` expands to `text` when `name` is set and non-empty, and to
//!   nothing otherwise. Handy for optional flags such as `{tests=-t}`.
//!
//! Templates are parsed once; a malformed template is a [`ConfigError`].

use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(String),
    Conditional { name: String, text: String },
}

/// A parsed placeholder template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template, accepting any placeholder name.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| ConfigError::template(source, "unclosed '{'"))?;
            let inner = &after[..close];
            if inner.contains('{') {
                return Err(ConfigError::template(source, "nested '{'"));
            }

            let (name, text) = match inner.split_once('=') {
                Some((name, text)) => (name, Some(text)),
                None => (inner, None),
            };
            if !is_valid_name(name) {
                return Err(ConfigError::template(
                    source,
                    format!("invalid placeholder name {:?}", name),
                ));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(match text {
                Some(text) => Segment::Conditional {
                    name: name.to_string(),
                    text: text.to_string(),
                },
                None => Segment::Var(name.to_string()),
            });
            rest = &after[close + 1..];
        }

        if rest.contains('}') {
            return Err(ConfigError::template(source, "unmatched '}'"));
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Parses a template whose placeholders must all come from `fields`.
    pub fn parse_with_fields(source: &str, fields: &[&str]) -> Result<Self, ConfigError> {
        let template = Self::parse(source)?;
        if let Some(unknown) = template.placeholders().find(|name| !fields.contains(name)) {
            return Err(ConfigError::template(
                source,
                format!(
                    "unknown field {:?} (expected one of {})",
                    unknown,
                    fields.join(", ")
                ),
            ));
        }
        Ok(template)
    }

    /// Returns the original template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the template references `name`.
    pub fn references(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// Iterates over placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Literal(_) => None,
            Segment::Var(name) | Segment::Conditional { name, .. } => Some(name.as_str()),
        })
    }

    /// Renders the template, resolving placeholders through `lookup`.
    pub fn render<F, S>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<S>,
        S: AsRef<str>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => {
                    if let Some(value) = lookup(name) {
                        out.push_str(value.as_ref());
                    }
                }
                Segment::Conditional { name, text } => {
                    if lookup(name).is_some_and(|v| !v.as_ref().is_empty()) {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
