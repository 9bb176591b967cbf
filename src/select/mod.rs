//! Comparable selection over the reference dataset.
//!
//! Responsibilities:
//!
//! - the tight four-condition comparable set (map / detail view)
//! - the loose living-area cohort (distribution view)

pub mod comparables;

pub use comparables::*;
