//! Estimation engine.
//!
//! - `validate`: untrusted input -> `QueryFeatures`
//! - `estimator`: the shared context, per-session state machine and pipeline

pub mod estimator;
pub mod validate;

pub use estimator::*;
pub use validate::*;
