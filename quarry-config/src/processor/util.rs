use std::{iter::Peekable, mem, str::Chars};

use quarry_core::err::{bail, Context, Result};
use serde_yaml::{Mapping, Value};

use super::ConfigStringExpr as X;

/// Recursively walks the configuration nodes uses the supplied callback
/// to transforms any strings found
pub(crate) fn process_strings(node: Value, cb: &impl Fn(String) -> Result<String>) -> Result<Value> {
    Ok(match node {
        Value::String(str) => {
            Value::String(cb(str.clone()).with_context(|| format!("Failed to process config string {}", str))?)
        }
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(|n| process_strings(n, cb))
                .collect::<Result<Vec<Value>>>()?,
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| -> Result<(Value, Value)> {
                    Ok((process_strings(k, cb)?, process_strings(v, cb)?))
                })
                .collect::<Result<Mapping>>()?,
        ),
        n => n,
    })
}

/// Parse strings into an expression AST
///
/// Interpolations are written as `${part:part:...}` and may be nested.
/// A backslash escapes the following character.
pub(crate) fn parse_expression(str: &str) -> Result<X> {
    let mut chars = str.chars().peekable();
    let parts = parse_parts(&mut chars, str, false)?;

    Ok(simplify(parts))
}

// Consumes input until the end or, inside an interpolation, until the next ':' or '}'
fn parse_parts(chars: &mut Peekable<Chars>, src: &str, nested: bool) -> Result<Vec<X>> {
    let mut parts = vec![];
    let mut buff = String::new();

    while let Some(c) = chars.peek().copied() {
        match c {
            '\\' => {
                chars.next();
                if let Some(escaped) = chars.next() {
                    buff.push(escaped);
                }
            }
            '$' => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    chars.next();
                    if !buff.is_empty() {
                        parts.push(X::Constant(mem::take(&mut buff)));
                    }
                    parts.push(parse_interpolation(chars, src)?);
                } else {
                    buff.push('$');
                }
            }
            ':' | '}' if nested => break,
            c => {
                chars.next();
                buff.push(c);
            }
        }
    }

    if !buff.is_empty() {
        parts.push(X::Constant(buff));
    }

    Ok(parts)
}

fn parse_interpolation(chars: &mut Peekable<Chars>, src: &str) -> Result<X> {
    let mut segments = vec![];

    loop {
        segments.push(simplify(parse_parts(chars, src, true)?));

        match chars.next() {
            Some(':') => continue,
            Some('}') => return Ok(X::Interpolation(segments)),
            _ => bail!(
                "Failed to parse expression \"{}\", found unclosed ${{...}}",
                src
            ),
        }
    }
}

fn simplify(mut parts: Vec<X>) -> X {
    match parts.len() {
        0 => X::Constant(String::new()),
        1 => parts.remove(0),
        _ => X::Concat(parts),
    }
}

/// Resolves interpolations from the inside out using the supplied callback
pub(crate) fn process_expression(exp: X, cb: &impl Fn(X) -> Result<X>) -> Result<X> {
    Ok(match exp {
        X::Constant(_) => exp,
        X::Concat(parts) => X::Concat(
            parts
                .into_iter()
                .map(|p| process_expression(p, cb))
                .collect::<Result<Vec<_>>>()?,
        ),
        X::Interpolation(parts) => cb(X::Interpolation(
            parts
                .into_iter()
                .map(|p| process_expression(p, cb))
                .collect::<Result<Vec<_>>>()?,
        ))?,
    })
}

/// Renders the expression back to a string, unresolved interpolations
/// are written back in their `${...}` syntax
pub(crate) fn expression_to_string(exp: X) -> String {
    match exp {
        X::Constant(s) => s,
        X::Concat(parts) => parts.into_iter().map(expression_to_string).collect(),
        X::Interpolation(parts) => format!(
            "${{{}}}",
            parts
                .into_iter()
                .map(expression_to_string)
                .collect::<Vec<_>>()
                .join(":")
        ),
    }
}
