//! Conversion of merged values into native types.
//!
//! Environment layers only ever produce strings, while parsed documents carry
//! native TOML types, so every conversion accepts both.

use std::time::Duration;

use toml::Value;

use super::duration::parse_duration;
use super::ConfigError;

/// Follows a collision-absorbed sub-tree to the leaf stored under `""`.
pub(crate) fn scalar(value: &Value) -> &Value {
    match value {
        Value::Table(table) => table.get("").unwrap_or(value),
        _ => value,
    }
}

pub(crate) fn to_string(key: &str, value: &Value) -> Result<String, ConfigError> {
    match scalar(value) {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        other => Err(ConfigError::invalid(key, "string", describe(other))),
    }
}

pub(crate) fn to_bool(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match scalar(value) {
        Value::Boolean(b) => Ok(*b),
        Value::String(s) => {
            parse_bool(s.trim()).ok_or_else(|| ConfigError::invalid(key, "bool", s))
        }
        other => Err(ConfigError::invalid(key, "bool", describe(other))),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn to_i64(key: &str, value: &Value) -> Result<i64, ConfigError> {
    match scalar(value) {
        Value::Integer(i) => Ok(*i),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, "int64", s)),
        other => Err(ConfigError::invalid(key, "int64", describe(other))),
    }
}

pub(crate) fn to_i32(key: &str, value: &Value) -> Result<i32, ConfigError> {
    match scalar(value) {
        Value::Integer(i) => i32::try_from(*i).map_err(|_| ConfigError::invalid(key, "int", i)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, "int", s)),
        other => Err(ConfigError::invalid(key, "int", describe(other))),
    }
}

pub(crate) fn to_f64(key: &str, value: &Value) -> Result<f64, ConfigError> {
    match scalar(value) {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, "float64", s)),
        other => Err(ConfigError::invalid(key, "float64", describe(other))),
    }
}

pub(crate) fn to_f32(key: &str, value: &Value) -> Result<f32, ConfigError> {
    match scalar(value) {
        Value::Float(f) => Ok(*f as f32),
        Value::Integer(i) => Ok(*i as f32),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, "float32", s)),
        other => Err(ConfigError::invalid(key, "float32", describe(other))),
    }
}

/// Bare integers are whole seconds; strings may also use unit syntax.
pub(crate) fn to_duration(key: &str, value: &Value) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::invalid(key, "duration", describe(scalar(value)));
    match scalar(value) {
        Value::Integer(i) => u64::try_from(*i)
            .map(Duration::from_secs)
            .map_err(|_| invalid()),
        Value::Float(f) => Duration::try_from_secs_f64(*f).map_err(|_| invalid()),
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().map(Duration::from_secs).map_err(|_| invalid())
            } else {
                parse_duration(s).ok_or_else(invalid)
            }
        }
        _ => Err(invalid()),
    }
}

/// Arrays convert item by item; strings split on commas.
pub(crate) fn to_string_slice(key: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    match scalar(value) {
        Value::Array(items) => items.iter().map(|item| to_string(key, item)).collect(),
        Value::String(s) => Ok(split_list(s)),
        other => to_string(key, other).map(|s| vec![s]),
    }
}

fn split_list(s: &str) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',').map(|item| item.trim().to_string()).collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Table(_) => value.type_str().to_string(),
        other => other.to_string(),
    }
}
