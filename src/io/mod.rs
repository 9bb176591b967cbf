//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - estimate/comparables/dataset exports (`export`)
//! - fitted-model JSON read/write (`model`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;
