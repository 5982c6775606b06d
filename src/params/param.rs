use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use url::Url;

use super::kind::Kind;
use crate::config::{ConfigError, LayerStack};

pub type StringParam = Param<String>;
pub type BoolParam = Param<bool>;
pub type IntParam = Param<i32>;
pub type Int64Param = Param<i64>;
pub type Float32Param = Param<f32>;
pub type Float64Param = Param<f64>;
pub type DurationParam = Param<Duration>;
pub type StringSliceParam = Param<Vec<String>>;
pub type UrlParam = Param<Url>;
pub type UrlSliceParam = Param<Vec<Url>>;

/// Handle to a declared parameter.
///
/// The handle is usable as soon as it is declared: until the owning
/// [`ParamSet`](super::ParamSet) loads, [`get`](Self::get) returns the
/// default. Clones share the same state.
pub struct Param<K: Kind> {
    slot: Arc<Slot<K>>,
}

impl<K: Kind> Param<K> {
    pub(crate) fn new(key: String, default: K::Default) -> Self {
        let state = State {
            value: K::initial(&default),
            loaded: false,
            is_set: false,
        };
        Self {
            slot: Arc::new(Slot {
                key,
                default,
                state: RwLock::new(state),
            }),
        }
    }

    pub(crate) fn resolver(&self) -> Arc<dyn Resolvable> {
        self.slot.clone()
    }

    pub fn key(&self) -> &str {
        &self.slot.key
    }

    pub fn default_value(&self) -> &K::Default {
        &self.slot.default
    }

    /// The current value.
    pub fn get(&self) -> K::Value {
        self.slot.state.read().value.clone()
    }

    /// Whether the key was present in the merged configuration at the last
    /// load, regardless of whether its value differs from the default.
    pub fn is_set(&self) -> bool {
        self.slot.state.read().is_set
    }

    /// Whether a load has checked this parameter yet.
    pub fn is_loaded(&self) -> bool {
        self.slot.state.read().loaded
    }
}

impl<K: Kind> Clone for Param<K> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<K: Kind> fmt::Debug for Param<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.slot, f)
    }
}

struct State<V> {
    value: V,
    loaded: bool,
    is_set: bool,
}

struct Slot<K: Kind> {
    key: String,
    default: K::Default,
    state: RwLock<State<K::Value>>,
}

impl<K: Kind> fmt::Debug for Slot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Param")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("value", &state.value)
            .field("loaded", &state.loaded)
            .field("is_set", &state.is_set)
            .finish()
    }
}

/// Type-erased view of a declaration, driven by `ParamSet::load`.
pub(crate) trait Resolvable: Send + Sync + fmt::Debug {
    fn key(&self) -> &str;

    /// Records that a load looked at this parameter and whether its key was
    /// present. Returns the presence flag.
    fn mark_validated(&self, stack: &LayerStack) -> bool;

    /// Replaces the value from the merged view, if the kind calls for it.
    fn resolve(&self, stack: &LayerStack, is_set: bool) -> Result<(), ConfigError>;
}

impl<K: Kind> Resolvable for Slot<K> {
    fn key(&self) -> &str {
        &self.key
    }

    fn mark_validated(&self, stack: &LayerStack) -> bool {
        let present = stack.contains(&self.key);
        let mut state = self.state.write();
        state.loaded = true;
        state.is_set = present;
        present
    }

    fn resolve(&self, stack: &LayerStack, is_set: bool) -> Result<(), ConfigError> {
        if let Some(value) = K::resolve(stack, &self.key, is_set, &self.default)? {
            self.state.write().value = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_reports_default_before_load() {
        let port: IntParam = Param::new("port".into(), 80);

        assert_eq!(port.get(), 80);
        assert_eq!(*port.default_value(), 80);
        assert_eq!(port.key(), "port");
        assert!(!port.is_set());
        assert!(!port.is_loaded());
    }

    #[test]
    fn test_url_handle_before_load() {
        let good: UrlParam = Param::new("api".into(), "https://example.com".into());
        let bad: UrlParam = Param::new("api".into(), "not a url".into());

        assert_eq!(good.get().unwrap().host_str(), Some("example.com"));
        assert!(bad.get().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let name: StringParam = Param::new("name".into(), "a".into());
        let copy = name.clone();

        let mut stack = LayerStack::default();
        stack
            .add_layer(Arc::new(
                crate::config::TableLayer::from_toml("name = \"b\"").unwrap(),
            ))
            .unwrap();
        let resolver = name.resolver();
        let present = resolver.mark_validated(&stack);
        resolver.resolve(&stack, present).unwrap();

        assert_eq!(copy.get(), "b");
        assert!(copy.is_set());
    }

    #[test]
    fn test_debug_output() {
        let flag: BoolParam = Param::new("verbose".into(), true);
        let rendered = format!("{flag:?}");

        assert!(rendered.contains("key: \"verbose\""));
        assert!(rendered.contains("value: true"));
    }
}
