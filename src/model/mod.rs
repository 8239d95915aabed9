//! Morphable face model - tables, reconstruction and interpolation

mod error;
mod loader;
mod reference;

pub use error::*;
pub use loader::*;
pub use reference::*;
