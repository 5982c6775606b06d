//! The layer abstraction consumed by [`LayerStack`](super::LayerStack).

use std::fmt;

use toml::Table;

use super::ConfigError;

/// One source of configuration data.
///
/// A layer produces a nested tree of tables whose leaves are the raw values
/// it contributes. Layers are added to a [`LayerStack`](super::LayerStack)
/// in order, and later layers override earlier ones.
pub trait Layer: Send + Sync + fmt::Debug {
    /// Returns the tree this layer contributes.
    fn load(&self) -> Result<Table, ConfigError>;

    /// The key delimiter this layer was built for, if it cares.
    fn delimiter(&self) -> Option<&str> {
        None
    }
}

/// A layer backed by an in-memory table.
///
/// Useful for programmatic defaults or for configuration already parsed
/// elsewhere.
///
/// ```
/// use layerset::{Layer, TableLayer};
///
/// let layer = TableLayer::from_toml("[db]\nhost = \"localhost\"")?;
/// assert!(layer.load()?.contains_key("db"));
/// # Ok::<(), layerset::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableLayer {
    table: Table,
}

impl TableLayer {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Parses a TOML document into a layer.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(toml::from_str(source)?))
    }
}

impl From<Table> for TableLayer {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl Layer for TableLayer {
    fn load(&self) -> Result<Table, ConfigError> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layer_from_toml() {
        let layer = TableLayer::from_toml("port = 8080\n[db]\nhost = \"localhost\"").unwrap();
        let table = layer.load().unwrap();

        assert_eq!(table["port"].as_integer(), Some(8080));
        assert_eq!(table["db"]["host"].as_str(), Some("localhost"));
        assert_eq!(layer.delimiter(), None);
    }

    #[test]
    fn test_table_layer_malformed_toml() {
        let result = TableLayer::from_toml("port = ");
        assert!(matches!(result, Err(ConfigError::LayerParse(_))));
    }
}
