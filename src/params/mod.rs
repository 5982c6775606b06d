//! Typed parameter declarations resolved against merged layers.

mod kind;
mod param;
mod set;

pub use kind::Kind;
pub use param::{
    BoolParam, DurationParam, Float32Param, Float64Param, Int64Param, IntParam, Param,
    StringParam, StringSliceParam, UrlParam, UrlSliceParam,
};
pub use set::ParamSet;
