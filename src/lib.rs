pub mod config;
pub mod params;

pub use config::{ConfigError, EnvLayer, Layer, LayerStack, TableLayer};
pub use params::{
    BoolParam, DurationParam, Float32Param, Float64Param, Int64Param, IntParam, Kind, Param,
    ParamSet, StringParam, StringSliceParam, UrlParam, UrlSliceParam,
};
pub use url::Url;
