//! Renderer-agnostic view payloads derived from one estimation.
//!
//! Each builder is a pure function of the estimation result and the dataset;
//! none of them mutate either.

pub mod distribution;
pub mod map;
pub mod scatter;

pub use distribution::*;
pub use map::*;
pub use scatter::*;
