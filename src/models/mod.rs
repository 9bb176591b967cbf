//! Price model.
//!
//! A single ordinary least squares model, fit once over the reference dataset
//! and shared read-only by every estimation.

pub mod regression;

pub use regression::*;
