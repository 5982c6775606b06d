//! Ordered merge of configuration layers.

use std::sync::Arc;
use std::time::Duration;

use toml::{Table, Value};

use super::convert;
use super::layer::Layer;
use super::ConfigError;

/// Merges layers into a single tree and answers key lookups over it.
///
/// Layers are merged in the order they are added, with later layers
/// overriding earlier ones. Nested tables are merged recursively; other
/// values (including arrays) are replaced entirely.
///
/// Keys are paths joined by the stack's delimiter, e.g. `db.host`.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use layerset::{LayerStack, TableLayer};
///
/// let mut stack = LayerStack::new(".");
/// stack.add_layer(Arc::new(TableLayer::from_toml("[db]\nport = 5432")?))?;
/// stack.add_layer(Arc::new(TableLayer::from_toml("[db]\nport = \"6543\"")?))?;
///
/// assert_eq!(stack.get_int("db.port")?, 6543);
/// # Ok::<(), layerset::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct LayerStack {
    delimiter: String,
    layers: Vec<Arc<dyn Layer>>,
    merged: Table,
}

impl LayerStack {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            layers: Vec::new(),
            merged: Table::new(),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Number of layers merged so far.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The merged tree.
    pub fn merged(&self) -> &Table {
        &self.merged
    }

    /// Loads `layer` and merges it over everything added before.
    ///
    /// On failure the merged view is left as it was.
    pub fn add_layer(&mut self, layer: Arc<dyn Layer>) -> Result<(), ConfigError> {
        if let Some(delimiter) = layer.delimiter() {
            if delimiter != self.delimiter {
                tracing::warn!(
                    layer = delimiter,
                    stack = %self.delimiter,
                    "layer was built for a different key delimiter"
                );
            }
        }

        let table = layer.load()?;
        tracing::debug!(keys = table.len(), position = self.layers.len(), "adding layer");
        deep_merge(&mut self.merged, table);
        self.layers.push(layer);
        Ok(())
    }

    /// Looks up the raw value at `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split(self.delimiter.as_str());
        let first = parts.next()?;
        let mut current = self.merged.get(first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn require(&self, key: &str) -> Result<&Value, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        convert::to_string(key, self.require(key)?)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        convert::to_bool(key, self.require(key)?)
    }

    pub fn get_int(&self, key: &str) -> Result<i32, ConfigError> {
        convert::to_i32(key, self.require(key)?)
    }

    pub fn get_int64(&self, key: &str) -> Result<i64, ConfigError> {
        convert::to_i64(key, self.require(key)?)
    }

    pub fn get_float32(&self, key: &str) -> Result<f32, ConfigError> {
        convert::to_f32(key, self.require(key)?)
    }

    pub fn get_float64(&self, key: &str) -> Result<f64, ConfigError> {
        convert::to_f64(key, self.require(key)?)
    }

    /// Reads a duration. Bare integers are seconds; strings may use unit
    /// syntax such as `1m30s` or `250ms`.
    pub fn get_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        convert::to_duration(key, self.require(key)?)
    }

    /// Reads a list. Strings are split on commas.
    pub fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        convert::to_string_slice(key, self.require(key)?)
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(".")
    }
}

fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
