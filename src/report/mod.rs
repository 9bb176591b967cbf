//! Reporting utilities: price/area formatting and terminal summaries.

pub mod format;

pub use format::*;
