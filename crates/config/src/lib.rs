//! Configuration for healthwatch
//!
//! The configuration file is a single JSON object whose shape is only
//! partially known up front: probe kinds and notifier backends each read
//! their own keys out of it, and unknown keys are ignored. It is therefore
//! modeled as a recursive untyped map over `serde_json::Value` with typed
//! accessors, rather than as a rigid struct.
//!
//! Top-level sections: `checkInterval` (global default, in seconds despite
//! the historical name), `notificator`, `service`, and the `dashboard*`
//! keys.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// A recursive string-keyed configuration map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config(Map<String, Value>);

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Load configuration from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).context("invalid config file")?;
        Self::from_value(&value).context("config file is not a JSON object")
    }

    /// Interpret a JSON value as a config map. `None` unless it is an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|map| Config(map.clone()))
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Integer value for `key`. JSON numbers are truncated; numeric strings
    /// are not accepted here.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().map(|f| f as i64))
        })
    }

    /// Float value for `key`, with the lenient coercion of [`value_as_f64`].
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).map(value_as_f64)
    }

    /// Boolean value for `key`, if present and a bool.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// List value for `key`, if present and an array.
    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Nested section for `key`, if present and an object.
    pub fn section(&self, key: &str) -> Option<Config> {
        self.get(key).and_then(Self::from_value)
    }

    /// Iterate over (key, value) entries.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The underlying JSON map (dashboard passes service attributes through
    /// verbatim).
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Coerce any JSON value to `f64`: numbers directly, numeric strings parsed,
/// everything else `0.0`. Config files in the wild carry thresholds both as
/// numbers and as quoted strings.
pub fn value_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
