//! `${name}` placeholders in query and function templates

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use quarry_core::err::{bail, Context, Result};

/// A query template split into literal text and placeholder tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Token(String),
}

impl Template {
    /// Parses the template, failing on malformed placeholders
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = vec![];
        let mut text = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if c != '$' || !matches!(chars.peek(), Some((_, '{'))) {
                text.push(c);
                continue;
            }

            chars.next();
            let mut name = String::new();

            loop {
                match chars.next() {
                    Some((_, '}')) => break,
                    Some((_, c)) if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                    Some((_, c)) => bail!(
                        "Illegal character '{}' in placeholder at position {} of \"{}\"",
                        c,
                        idx,
                        source
                    ),
                    None => bail!(
                        "Unclosed placeholder at position {} of \"{}\"",
                        idx,
                        source
                    ),
                }
            }

            if name.is_empty() {
                bail!("Empty placeholder at position {} of \"{}\"", idx, source);
            }

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(Segment::Token(name));
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The distinct placeholder names of the template
    pub fn names(&self) -> BTreeSet<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Token(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Token(_)))
    }

    /// Checks that the bound placeholder names match the template tokens one to one
    pub fn validate_bindings<'a>(&self, bound: impl IntoIterator<Item = &'a String>) -> Result<()> {
        let names = self.names();
        let bound: BTreeSet<&String> = bound.into_iter().collect();

        if let Some(unknown) = bound.iter().find(|b| !names.contains(b.as_str())) {
            bail!(
                "Placeholder '{}' is not used in \"{}\"",
                unknown,
                self.source
            );
        }

        let unbound = names.iter().filter(|n| !bound.contains(n)).collect_vec();
        if !unbound.is_empty() {
            bail!(
                "No parameter bound for placeholders {} of \"{}\"",
                unbound.iter().map(|n| format!("'{}'", n)).join(", "),
                self.source
            );
        }

        Ok(())
    }

    /// Substitutes every token with its bound value
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());

        for segment in self.segments.iter() {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Token(name) => out.push_str(
                    values
                        .get(name)
                        .with_context(|| format!("No value bound for placeholder '{}'", name))?,
                ),
            }
        }

        Ok(out)
    }
}

/// Allowed values per placeholder token
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderDefaults {
    values: BTreeMap<String, Vec<String>>,
}

impl PlaceholderDefaults {
    /// Registers the allowed values of a placeholder declared by the template
    pub fn register(&mut self, template: &Template, name: &str, values: Vec<String>) -> Result<()> {
        if self.values.contains_key(name) {
            bail!("Duplicate placeholder '{}' values definition", name);
        }

        if !template.names().contains(name) {
            bail!(
                "Default values defined for placeholder '{}' not used in query",
                name
            );
        }

        self.values.insert(name.to_string(), values);
        Ok(())
    }

    /// The allowed values of the placeholder, empty when any value is allowed
    pub fn get(&self, name: &str) -> &[String] {
        self.values.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}
