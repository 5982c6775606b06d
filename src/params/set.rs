use std::sync::Arc;
use std::time::Duration;

use super::kind::Kind;
use super::param::{
    BoolParam, DurationParam, Float32Param, Float64Param, Int64Param, IntParam, Param,
    Resolvable, StringParam, StringSliceParam, UrlParam, UrlSliceParam,
};
use crate::config::{ConfigError, Layer, LayerStack};

/// A registry of typed parameters resolved against merged layers.
///
/// Parameters are declared first; each declaration returns a [`Param`]
/// handle that reports its default until [`load`](Self::load) runs. Loading
/// merges the given layers and resolves every parameter in declaration
/// order.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use layerset::{EnvLayer, Layer, ParamSet};
///
/// let mut params = ParamSet::new();
/// let port = params.int("port", 80);
/// let host = params.string("db.host", "");
///
/// let env = EnvLayer::from_vars(
///     "APP",
///     "_",
///     ".",
///     [("APP_PORT", "8080"), ("APP_DB_HOST", "localhost")],
/// );
/// let layers: Vec<Arc<dyn Layer>> = vec![Arc::new(env)];
/// params.load(&layers)?;
///
/// assert_eq!(port.get(), 8080);
/// assert_eq!(host.get(), "localhost");
/// assert!(port.is_set() && host.is_set());
/// # Ok::<(), layerset::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ParamSet {
    stack: LayerStack,
    params: Vec<Arc<dyn Resolvable>>,
    loaded: bool,
}

impl ParamSet {
    /// Creates an empty set whose keys use `.` between segments.
    pub fn new() -> Self {
        Self::with_delimiter(".")
    }

    pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
        Self {
            stack: LayerStack::new(delimiter),
            params: Vec::new(),
            loaded: false,
        }
    }

    /// Declares a parameter of any supported kind.
    ///
    /// Declaring the same key twice yields two independent handles over the
    /// same merged value.
    pub fn declare<K: Kind>(&mut self, key: impl Into<String>, default: K::Default) -> Param<K> {
        let param = Param::new(key.into(), default);
        self.params.push(param.resolver());
        param
    }

    pub fn string(&mut self, key: impl Into<String>, default: impl Into<String>) -> StringParam {
        self.declare(key, default.into())
    }

    /// Declares a list parameter. Environment values are split on commas.
    pub fn string_slice<I, S>(&mut self, key: impl Into<String>, default: I) -> StringSliceParam
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(key, default.into_iter().map(Into::into).collect())
    }

    pub fn bool(&mut self, key: impl Into<String>, default: bool) -> BoolParam {
        self.declare(key, default)
    }

    pub fn int(&mut self, key: impl Into<String>, default: i32) -> IntParam {
        self.declare(key, default)
    }

    pub fn int64(&mut self, key: impl Into<String>, default: i64) -> Int64Param {
        self.declare(key, default)
    }

    pub fn float32(&mut self, key: impl Into<String>, default: f32) -> Float32Param {
        self.declare(key, default)
    }

    pub fn float64(&mut self, key: impl Into<String>, default: f64) -> Float64Param {
        self.declare(key, default)
    }

    pub fn duration(&mut self, key: impl Into<String>, default: Duration) -> DurationParam {
        self.declare(key, default)
    }

    /// Declares a URL parameter.
    ///
    /// The default is parsed on every load, so an invalid default makes
    /// [`load`](Self::load) fail even when the key is never configured.
    pub fn url(&mut self, key: impl Into<String>, default: impl Into<String>) -> UrlParam {
        self.declare(key, default.into())
    }

    /// Declares a URL list parameter. Each default entry is parsed on every
    /// load.
    pub fn url_slice<I, S>(&mut self, key: impl Into<String>, default: I) -> UrlSliceParam
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(key, default.into_iter().map(Into::into).collect())
    }

    /// Merges `layers` and resolves every declared parameter.
    ///
    /// Layers are merged in order, later ones overriding earlier ones. The
    /// first layer that fails to load, or the first parameter whose value
    /// cannot be converted to its type, aborts the load. Parameters resolved
    /// before the failure keep their new values; later ones are untouched.
    pub fn load(&mut self, layers: &[Arc<dyn Layer>]) -> Result<(), ConfigError> {
        for layer in layers {
            self.stack.add_layer(Arc::clone(layer))?;
        }

        for param in &self.params {
            let is_set = param.mark_validated(&self.stack);
            tracing::trace!(key = param.key(), is_set, "resolving parameter");
            param.resolve(&self.stack, is_set)?;
        }

        self.loaded = true;
        tracing::debug!(
            params = self.params.len(),
            layers = self.stack.layer_count(),
            "parameter set loaded"
        );
        Ok(())
    }

    /// Whether a [`load`](Self::load) has completed successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The merged view the parameters were resolved against.
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }
}

impl Default for ParamSet {
    fn default() -> Self {
        Self::new()
    }
}
