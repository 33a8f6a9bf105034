//! Positional message templating.
//!
//! A template such as `"Order {order} failed for {customer}"` has its `{…}`
//! tokens replaced, in order of appearance, by the indented JSON rendering of
//! the supplied objects. Use [`serde_json::Value`] (for example through
//! [`serde_json::json!`]) to mix object types in one call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap_or_else(|_| unreachable!()));

/// Returns the placeholder tokens of `template`, braces included, in order.
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER.find_iter(template).map(|m| m.as_str()).collect()
}

/// Replaces the Nth placeholder of `template` with the Nth object.
///
/// Placeholders without a matching object are left as written and surplus
/// objects are ignored. If any object fails to serialize the result is an
/// empty string.
#[must_use]
pub fn serialize_objects<T: Serialize>(template: &str, objects: &[T]) -> String {
    let rendered = match objects
        .iter()
        .map(serde_json::to_string_pretty)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(rendered) => rendered,
        Err(_) => return String::new(),
    };

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for (token, text) in PLACEHOLDER.find_iter(template).zip(&rendered) {
        out.push_str(&template[last..token.start()]);
        out.push_str(text);
        last = token.end();
    }
    out.push_str(&template[last..]);
    out
}
