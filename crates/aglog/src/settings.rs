//! Settings sources for the configuration resolver.
//!
//! This module provides:
//! - [`SettingsProvider`] — an injectable key/value settings source
//! - [`EnvironmentSettings`] — settings taken from process environment variables
//! - [`JsonSettings`] — settings flattened out of a JSON document
//! - [`SettingsMap`] — the prefix-scoped settings that were actually applied
//! - [`expand_env`] — `%NAME%` / `${NAME}` expansion in setting values

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::Result;

/// Prefix-stripped, lower-cased setting keys mapped to their expanded values.
pub type SettingsMap = BTreeMap<String, String>;

/// Separator between the settings prefix and the setting key.
pub const KEY_SEPARATOR: char = ':';

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)%|\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .unwrap_or_else(|_| unreachable!())
});

/// A source of raw key/value settings.
///
/// Keys use `:` to separate sections (`aglog:file.path`).
pub trait SettingsProvider {
    /// Returns every setting the source knows about, in source order.
    fn entries(&self) -> Vec<(String, String)>;
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for &P {
    fn entries(&self) -> Vec<(String, String)> {
        (**self).entries()
    }
}

impl SettingsProvider for HashMap<String, String> {
    fn entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl SettingsProvider for BTreeMap<String, String> {
    fn entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl SettingsProvider for Vec<(String, String)> {
    fn entries(&self) -> Vec<(String, String)> {
        self.clone()
    }
}

impl SettingsProvider for [(&str, &str)] {
    fn entries(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

impl<const N: usize> SettingsProvider for [(&str, &str); N] {
    fn entries(&self) -> Vec<(String, String)> {
        self.as_slice().entries()
    }
}

/// Settings read from the process environment.
///
/// A double underscore stands in for the `:` separator, so
/// `AGLOG__FILE.PATH` becomes `AGLOG:FILE.PATH`.
///
/// Setting keys contain `.` or `-`, which POSIX shells reject in `export`;
/// pass such variables through `env`, e.g.
/// `env 'AGLOG__FILE.PATH=/var/log/app.log' aglog started`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSettings;

impl SettingsProvider for EnvironmentSettings {
    fn entries(&self) -> Vec<(String, String)> {
        std::env::vars()
            .map(|(key, value)| (key.replace("__", ":"), value))
            .collect()
    }
}

/// Settings flattened from a JSON document.
///
/// Nested objects are joined with `:`, so `{"aglog": {"file.path": "x"}}`
/// yields `aglog:file.path = x`. Scalars are rendered as text; arrays are
/// indexed by position.
#[derive(Debug, Clone, Default)]
pub struct JsonSettings {
    entries: Vec<(String, String)>,
}

impl JsonSettings {
    /// Flattens an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut entries = Vec::new();
        flatten(None, value, &mut entries);
        Self { entries }
    }

    /// Parses and flattens a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Loads and flattens a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl SettingsProvider for JsonSettings {
    fn entries(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| match prefix {
        Some(p) => format!("{p}{KEY_SEPARATOR}{key}"),
        None => key.to_string(),
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(Some(&join(key)), child, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(Some(&join(&i.to_string())), child, out);
            }
        }
        Value::Null => {
            if let Some(p) = prefix {
                out.push((p.to_string(), String::new()));
            }
        }
        Value::String(s) => {
            if let Some(p) = prefix {
                out.push((p.to_string(), s.clone()));
            }
        }
        Value::Bool(_) | Value::Number(_) => {
            if let Some(p) = prefix {
                out.push((p.to_string(), value.to_string()));
            }
        }
    }
}

/// Expands `%NAME%` and `${NAME}` references using the process environment.
///
/// References to unset variables are left as written.
#[must_use]
pub fn expand_env(value: &str) -> String {
    expand_env_with(value, |name| std::env::var(name).ok())
}

/// Expands `%NAME%` and `${NAME}` references using `lookup`.
#[must_use]
pub fn expand_env_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REFERENCE
        .replace_all(value, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Keeps the entries under `prefix`, stripping it and lower-casing the key.
///
/// Matching is case-insensitive and values are environment-expanded with
/// `lookup`.
pub fn scope_settings<F>(prefix: &str, entries: Vec<(String, String)>, lookup: F) -> SettingsMap
where
    F: Fn(&str) -> Option<String>,
{
    let scope = format!(
        "{}{KEY_SEPARATOR}",
        prefix.trim_end_matches(KEY_SEPARATOR).to_lowercase()
    );

    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.to_lowercase();
            let stripped = key.strip_prefix(&scope)?;
            Some((stripped.to_string(), expand_env_with(&value, &lookup)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "LOG_ROOT" => Some("/var/log/app".to_string()),
            "USER" => Some("svc".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_percent_references() {
        assert_eq!(
            expand_env_with("%LOG_ROOT%/app.log", lookup),
            "/var/log/app/app.log"
        );
    }

    #[test]
    fn expands_brace_references() {
        assert_eq!(
            expand_env_with("${LOG_ROOT}/${USER}.log", lookup),
            "/var/log/app/svc.log"
        );
    }

    #[test]
    fn leaves_unknown_references_alone() {
        assert_eq!(expand_env_with("%MISSING%/x", lookup), "%MISSING%/x");
        assert_eq!(expand_env_with("${MISSING}", lookup), "${MISSING}");
        assert_eq!(expand_env_with("50% off", lookup), "50% off");
    }

    #[test]
    fn scope_filters_and_strips_prefix() {
        let entries = vec![
            ("AgLog:File.Path".to_string(), "%LOG_ROOT%/a.log".to_string()),
            ("aglog:minimum-level".to_string(), "Debug".to_string()),
            ("other:file.path".to_string(), "nope".to_string()),
            ("aglogx:file.path".to_string(), "nope".to_string()),
        ];

        let map = scope_settings("aglog", entries, lookup);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("file.path").map(String::as_str), Some("/var/log/app/a.log"));
        assert_eq!(map.get("minimum-level").map(String::as_str), Some("Debug"));
    }

    #[test]
    fn scope_tolerates_trailing_separator() {
        let entries = vec![("aglog:level.length".to_string(), "4".to_string())];
        let map = scope_settings("AGLOG:", entries, lookup);
        assert_eq!(map.get("level.length").map(String::as_str), Some("4"));
    }

    #[test]
    fn json_settings_flatten_nested_objects() {
        let settings = JsonSettings::from_json(
            r#"{
                "aglog": {
                    "file.path": "logs/app.log",
                    "file.sizelimitbytes": 1024,
                    "file.addheader": true,
                    "rollover": { "interval": "Day" },
                    "tags": ["a", "b"],
                    "empty": null
                }
            }"#,
        );
        assert!(settings.is_ok());
        let entries: BTreeMap<String, String> =
            settings.map(|s| s.entries().into_iter().collect()).unwrap_or_default();

        assert_eq!(entries.get("aglog:file.path").map(String::as_str), Some("logs/app.log"));
        assert_eq!(entries.get("aglog:file.sizelimitbytes").map(String::as_str), Some("1024"));
        assert_eq!(entries.get("aglog:file.addheader").map(String::as_str), Some("true"));
        assert_eq!(entries.get("aglog:rollover:interval").map(String::as_str), Some("Day"));
        assert_eq!(entries.get("aglog:tags:1").map(String::as_str), Some("b"));
        assert_eq!(entries.get("aglog:empty").map(String::as_str), Some(""));
    }

    #[test]
    fn json_settings_rejects_invalid_json() {
        assert!(JsonSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn json_settings_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("appsettings.json");
        std::fs::write(&path, r#"{"aglog": {"minimum-level": "Error"}}"#).expect("write");

        let settings = JsonSettings::load(&path).expect("load");
        assert_eq!(
            settings.entries(),
            vec![("aglog:minimum-level".to_string(), "Error".to_string())]
        );
    }

    #[test]
    fn array_provider_entries() {
        let provider = [("aglog:file.path", "a.log"), ("aglog:level.length", "5")];
        let entries = provider.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("aglog:file.path".to_string(), "a.log".to_string()));
    }
}
