//! Configuration layers and their merge.

mod convert;
mod duration;
mod env;
mod error;
mod layer;
mod stack;

pub use env::EnvLayer;
pub use error::ConfigError;
pub use layer::{Layer, TableLayer};
pub use stack::LayerStack;
