//! The closed set of parameter types a [`ParamSet`](super::ParamSet) can
//! declare.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::config::{ConfigError, LayerStack};

mod sealed {
    pub trait Sealed {}
}

/// A type that can back a declared parameter.
///
/// Implemented for `String`, `bool`, `i32`, `i64`, `f32`, `f64`,
/// [`Duration`], `Vec<String>`, [`Url`] and `Vec<Url>`. The trait is sealed.
pub trait Kind: sealed::Sealed + Send + Sync + 'static {
    /// What [`Param::get`](super::Param::get) returns.
    type Value: Clone + fmt::Debug + Send + Sync + 'static;
    /// What the parameter is declared with.
    type Default: Clone + fmt::Debug + Send + Sync + 'static;

    /// The value a handle reports before the first load.
    fn initial(default: &Self::Default) -> Self::Value;

    /// Computes the resolved value, or `None` to keep the current one.
    fn resolve(
        stack: &LayerStack,
        key: &str,
        is_set: bool,
        default: &Self::Default,
    ) -> Result<Option<Self::Value>, ConfigError>;
}

macro_rules! scalar_kind {
    ($ty:ty, $getter:ident) => {
        impl sealed::Sealed for $ty {}

        impl Kind for $ty {
            type Value = $ty;
            type Default = $ty;

            fn initial(default: &$ty) -> $ty {
                default.clone()
            }

            fn resolve(
                stack: &LayerStack,
                key: &str,
                is_set: bool,
                _default: &$ty,
            ) -> Result<Option<$ty>, ConfigError> {
                if !is_set {
                    return Ok(None);
                }
                stack.$getter(key).map(Some)
            }
        }
    };
}

scalar_kind!(String, get_string);
scalar_kind!(bool, get_bool);
scalar_kind!(i32, get_int);
scalar_kind!(i64, get_int64);
scalar_kind!(f32, get_float32);
scalar_kind!(f64, get_float64);
scalar_kind!(Duration, get_duration);
scalar_kind!(Vec<String>, get_string_slice);

// URL defaults are plain strings and are re-parsed on every load, so a bad
// default fails the load even when the key is never configured.

impl sealed::Sealed for Url {}

impl Kind for Url {
    type Value = Option<Url>;
    type Default = String;

    fn initial(default: &String) -> Option<Url> {
        Url::parse(default).ok()
    }

    fn resolve(
        stack: &LayerStack,
        key: &str,
        is_set: bool,
        default: &String,
    ) -> Result<Option<Option<Url>>, ConfigError> {
        let mut url = parse_url(key, default)?;
        if is_set {
            url = parse_url(key, &stack.get_string(key)?)?;
        }
        Ok(Some(Some(url)))
    }
}

impl sealed::Sealed for Vec<Url> {}

impl Kind for Vec<Url> {
    type Value = Option<Vec<Url>>;
    type Default = Vec<String>;

    fn initial(default: &Vec<String>) -> Option<Vec<Url>> {
        default.iter().map(|raw| Url::parse(raw).ok()).collect()
    }

    fn resolve(
        stack: &LayerStack,
        key: &str,
        is_set: bool,
        default: &Vec<String>,
    ) -> Result<Option<Option<Vec<Url>>>, ConfigError> {
        let mut urls = parse_urls(key, default)?;
        if is_set {
            urls = parse_urls(key, &stack.get_string_slice(key)?)?;
        }
        Ok(Some(Some(urls)))
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        key: key.to_string(),
        source,
    })
}

fn parse_urls(key: &str, raw: &[String]) -> Result<Vec<Url>, ConfigError> {
    raw.iter().map(|item| parse_url(key, item)).collect()
}
