//! `house-comps` library crate.
//!
//! The binary (`comps`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimation engine can be embedded behind other front-ends
//! - code stays easy to navigate as the project grows
//!
//! Flow: `data`/`io` load sales -> `models` fits once -> `engine` validates a
//! query, scores it and selects comparables via `select` -> `views` builds the
//! renderer payloads -> `report`/`plot`/`tui` present them.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod select;
pub mod tui;
pub mod views;
