//! Dataset provider.
//!
//! - the immutable table of historical sales (`dataset`)
//! - synthetic Ames-like sample generation (`sample`)

pub mod dataset;
pub mod sample;

pub use dataset::*;
pub use sample::*;
