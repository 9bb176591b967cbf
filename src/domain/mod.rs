//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the regression feature set (`Feature`)
//! - historical sales and query rows (`HouseRecord`, `QueryFeatures`)
//! - coordinates and map settings (`GeoPoint`, `HighlightPricing`)

pub mod types;

pub use types::*;
