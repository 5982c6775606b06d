//! Environment-variable layer.
//!
//! Flattened variable names are turned into a nested tree: with prefix `APP`
//! and delimiter `_`, `APP_DB_HOST=localhost` becomes `db.host = "localhost"`.
//! Values are kept as raw strings; conversion happens when a typed getter
//! reads them.

use std::sync::OnceLock;

use toml::{Table, Value};

use super::layer::Layer;
use super::ConfigError;

#[derive(Debug, Clone)]
enum EnvSnapshot {
    Process,
    Fixed(Vec<(String, String)>),
}

/// A [`Layer`] built from environment variables.
///
/// The environment is read once, on the first [`load`](Layer::load). Every
/// later call returns the same tree, even if the environment changed in the
/// meantime.
///
/// Keys are matched case-insensitively and lowercased. When one variable's
/// path is a strict prefix of another's (`APP_A` and `APP_A_B`), the shorter
/// one is kept under the empty key of the sub-tree: `a = { "" = "1", b = "2" }`.
#[derive(Debug)]
pub struct EnvLayer {
    prefix: String,
    env_delimiter: String,
    internal_delimiter: String,
    snapshot: EnvSnapshot,
    tree: OnceLock<Table>,
}

impl EnvLayer {
    /// Creates a layer over the process environment.
    ///
    /// `internal_delimiter` is not used for flattening; it is reported to the
    /// [`LayerStack`](super::LayerStack) so mismatched key syntax can be
    /// flagged.
    pub fn new(
        prefix: impl Into<String>,
        env_delimiter: impl Into<String>,
        internal_delimiter: impl Into<String>,
    ) -> Self {
        Self::with_snapshot(prefix, env_delimiter, internal_delimiter, EnvSnapshot::Process)
    }

    /// Creates a layer over a fixed list of variables instead of the process
    /// environment.
    pub fn from_vars<I, K, V>(
        prefix: impl Into<String>,
        env_delimiter: impl Into<String>,
        internal_delimiter: impl Into<String>,
        vars: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::with_snapshot(
            prefix,
            env_delimiter,
            internal_delimiter,
            EnvSnapshot::Fixed(vars),
        )
    }

    /// Creates a layer from raw `KEY=VALUE` entries.
    ///
    /// Only the first `=` separates key from value. Entries without one are
    /// skipped.
    pub fn from_entries<I, S>(
        prefix: impl Into<String>,
        env_delimiter: impl Into<String>,
        internal_delimiter: impl Into<String>,
        entries: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars: Vec<(String, String)> = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref();
                let split = entry.split_once('=');
                if split.is_none() {
                    tracing::debug!(entry, "skipping environment entry without '='");
                }
                split.map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect();
        Self::from_vars(prefix, env_delimiter, internal_delimiter, vars)
    }

    fn with_snapshot(
        prefix: impl Into<String>,
        env_delimiter: impl Into<String>,
        internal_delimiter: impl Into<String>,
        snapshot: EnvSnapshot,
    ) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
            env_delimiter: env_delimiter.into().to_lowercase(),
            internal_delimiter: internal_delimiter.into(),
            snapshot,
            tree: OnceLock::new(),
        }
    }

    fn read_vars(&self) -> Vec<(String, String)> {
        match &self.snapshot {
            EnvSnapshot::Fixed(vars) => vars.clone(),
            EnvSnapshot::Process => std::env::vars_os()
                .filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
                    (Ok(k), Ok(v)) => Some((k, v)),
                    (k, _) => {
                        tracing::debug!(key = ?k, "skipping non-UTF-8 environment variable");
                        None
                    }
                })
                .collect(),
        }
    }

    fn flatten(&self) -> Table {
        let match_prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.prefix, self.env_delimiter)
        };

        let mut tree = Table::new();
        let mut matched = 0usize;

        for (key, value) in self.read_vars() {
            let key = key.to_lowercase();
            let Some(rest) = key.strip_prefix(&match_prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let path: Vec<&str> = if self.env_delimiter.is_empty() {
                vec![rest]
            } else {
                rest.split(self.env_delimiter.as_str()).collect()
            };
            insert_path(&mut tree, &path, value);
            matched += 1;
        }

        tracing::debug!(prefix = %self.prefix, matched, "flattened environment");
        tree
    }
}

impl Layer for EnvLayer {
    fn load(&self) -> Result<Table, ConfigError> {
        Ok(self.tree.get_or_init(|| self.flatten()).clone())
    }

    fn delimiter(&self) -> Option<&str> {
        Some(&self.internal_delimiter)
    }
}

/// Sets `value` at `path`, turning leaves in the way into sub-trees.
fn insert_path(root: &mut Table, path: &[&str], value: String) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut node = root;
    for part in parents {
        let entry = node
            .entry(part.to_string())
            .or_insert(Value::Table(Table::new()));
        absorb_leaf(entry);
        node = match entry.as_table_mut() {
            Some(table) => table,
            None => return,
        };
    }

    match node.get_mut(*last) {
        Some(Value::Table(sub)) => {
            sub.insert(String::new(), Value::String(value));
        }
        _ => {
            node.insert(last.to_string(), Value::String(value));
        }
    }
}

fn absorb_leaf(node: &mut Value) {
    if node.is_table() {
        return;
    }
    let leaf = std::mem::replace(node, Value::Table(Table::new()));
    if let Value::Table(sub) = node {
        sub.insert(String::new(), leaf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn layer(prefix: &str, vars: &[(&str, &str)]) -> EnvLayer {
        EnvLayer::from_vars(prefix, "_", ".", vars.iter().copied())
    }

    #[test]
    fn test_nested_keys() {
        let tree = layer("APP", &[("APP_PORT", "8080"), ("APP_DB_HOST", "localhost")])
            .load()
            .unwrap();

        assert_eq!(tree["port"].as_str(), Some("8080"));
        assert_eq!(tree["db"]["host"].as_str(), Some("localhost"));
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_filters() {
        let tree = layer(
            "app",
            &[
                ("App_Name", "demo"),
                ("APPLICATION_NAME", "nope"),
                ("OTHER_NAME", "nope"),
                ("APP", "nope"),
                ("APP_", "nope"),
            ],
        )
        .load()
        .unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree["name"].as_str(), Some("demo"));
    }

    #[test]
    fn test_values_keep_their_case() {
        let tree = layer("APP", &[("APP_MODE", "MixedCase")]).load().unwrap();
        assert_eq!(tree["mode"].as_str(), Some("MixedCase"));
    }

    #[test]
    fn test_empty_prefix_keeps_everything() {
        let tree = layer("", &[("HOME", "/root"), ("DB_HOST", "localhost")])
            .load()
            .unwrap();

        assert_eq!(tree["home"].as_str(), Some("/root"));
        assert_eq!(tree["db"]["host"].as_str(), Some("localhost"));
    }

    #[test]
    fn test_collision_absorbs_leaf() {
        let tree = layer("APP", &[("APP_A", "1"), ("APP_A_B", "2")])
            .load()
            .unwrap();

        let a = tree["a"].as_table().unwrap();
        assert_eq!(a[""].as_str(), Some("1"));
        assert_eq!(a["b"].as_str(), Some("2"));
    }

    #[test]
    fn test_collision_absorbs_leaf_in_reverse_order() {
        let tree = layer("APP", &[("APP_A_B", "2"), ("APP_A", "1")])
            .load()
            .unwrap();

        let a = tree["a"].as_table().unwrap();
        assert_eq!(a[""].as_str(), Some("1"));
        assert_eq!(a["b"].as_str(), Some("2"));
    }

    #[test]
    fn test_deep_collision() {
        let tree = layer("APP", &[("APP_A", "1"), ("APP_A_B", "2"), ("APP_A_B_C", "3")])
            .load()
            .unwrap();

        assert_eq!(tree["a"][""].as_str(), Some("1"));
        assert_eq!(tree["a"]["b"][""].as_str(), Some("2"));
        assert_eq!(tree["a"]["b"]["c"].as_str(), Some("3"));
    }

    #[test]
    fn test_last_write_wins() {
        let tree = layer("APP", &[("APP_PORT", "1"), ("app_port", "2")])
            .load()
            .unwrap();
        assert_eq!(tree["port"].as_str(), Some("2"));
    }

    #[test]
    fn test_multi_char_delimiter() {
        let layer = EnvLayer::from_vars(
            "MYAPP",
            "__",
            ".",
            [("MYAPP__DATABASE__MAX_CONNS", "10"), ("MYAPP_DATABASE", "x")],
        );
        let tree = layer.load().unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree["database"]["max_conns"].as_str(), Some("10"));
    }

    #[test]
    fn test_from_entries_splits_on_first_equals() {
        let layer = EnvLayer::from_entries(
            "APP",
            "_",
            ".",
            ["APP_DSN=user=admin", "APP_BROKEN", "APP_EMPTY="],
        );
        let tree = layer.load().unwrap();

        assert_eq!(tree["dsn"].as_str(), Some("user=admin"));
        assert_eq!(tree["empty"].as_str(), Some(""));
        assert!(!tree.contains_key("broken"));
    }

    #[test]
    fn test_reports_internal_delimiter() {
        let layer = EnvLayer::from_vars("APP", "_", "/", Vec::<(String, String)>::new());
        assert_eq!(layer.delimiter(), Some("/"));
    }

    #[test]
    #[serial]
    fn test_process_environment_is_snapshotted() {
        std::env::set_var("LAYERSET_SNAP_KEY", "before");
        let layer = EnvLayer::new("LAYERSET_SNAP", "_", ".");

        let first = layer.load().unwrap();
        std::env::set_var("LAYERSET_SNAP_KEY", "after");
        std::env::set_var("LAYERSET_SNAP_OTHER", "new");
        let second = layer.load().unwrap();
        std::env::remove_var("LAYERSET_SNAP_KEY");
        std::env::remove_var("LAYERSET_SNAP_OTHER");

        assert_eq!(first, second);
        assert_eq!(second["key"].as_str(), Some("before"));
        assert!(!second.contains_key("other"));
    }
}
