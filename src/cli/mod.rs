//! Command-line parsing for the comparable-sales price estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation code. Feature flags are collected as raw strings and handed to
//! the engine's validator untouched, so the CLI and the TUI reject bad input
//! with the same messages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::HighlightPricing;
use crate::engine::{INPUT_FIELDS, QueryInput};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "comps", version, about = "House price estimator with comparable sales")]
pub struct Cli {
    /// Extra configuration file (TOML/YAML/JSON), layered over `config/default`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate one house: price, comparables, distribution and scatter plots.
    Estimate(EstimateArgs),
    /// Fit the regression model and print coefficients and diagnostics.
    Fit(FitArgs),
    /// Launch the interactive TUI.
    Tui(TuiArgs),
    /// Write a synthetic sales dataset to CSV.
    Sample(SampleArgs),
}

/// Where the reference sales come from. Unset values fall back to configuration.
#[derive(Debug, Args, Clone, Default)]
pub struct DatasetArgs {
    /// Sales CSV (snake_case columns or Ames housing names).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Number of synthetic sales when no CSV is given.
    #[arg(short = 'n', long)]
    pub sample_count: Option<usize>,

    /// Random seed for the synthetic sample.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use a previously exported model instead of fitting at startup.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

/// The twelve query inputs, unparsed.
#[derive(Debug, Args, Clone, Default)]
pub struct FeatureArgs {
    /// Above-grade living area (sqft).
    #[arg(long)]
    pub living_area: Option<String>,
    #[arg(long)]
    pub year_built: Option<String>,
    #[arg(long)]
    pub year_remodeled: Option<String>,
    #[arg(long)]
    pub bedrooms: Option<String>,
    #[arg(long)]
    pub garage_cars: Option<String>,
    /// Garage area (sqft).
    #[arg(long)]
    pub garage_area: Option<String>,
    #[arg(long)]
    pub full_baths: Option<String>,
    #[arg(long)]
    pub half_baths: Option<String>,
    /// true/false, yes/no or 1/0.
    #[arg(long)]
    pub has_fireplace: Option<String>,
    /// Pool area (sqft).
    #[arg(long)]
    pub pool_area: Option<String>,
    /// Total basement area (sqft).
    #[arg(long)]
    pub basement_area: Option<String>,
    /// Lot area (sqft).
    #[arg(long)]
    pub lot_area: Option<String>,
}

impl FeatureArgs {
    /// Only flags that were given end up in the input; the validator reports
    /// whichever required field is missing first.
    pub fn to_query_input(&self) -> QueryInput {
        let mut input = QueryInput::new();
        for field in INPUT_FIELDS {
            if let Some(v) = self.value(field) {
                input.set(field, v.clone());
            }
        }
        input
    }

    /// The raw flag value for an input field name.
    pub fn value(&self, field: &str) -> Option<&String> {
        match field {
            "living_area" => self.living_area.as_ref(),
            "year_built" => self.year_built.as_ref(),
            "year_remodeled" => self.year_remodeled.as_ref(),
            "bedrooms" => self.bedrooms.as_ref(),
            "garage_cars" => self.garage_cars.as_ref(),
            "garage_area" => self.garage_area.as_ref(),
            "full_baths" => self.full_baths.as_ref(),
            "half_baths" => self.half_baths.as_ref(),
            "has_fireplace" => self.has_fireplace.as_ref(),
            "pool_area" => self.pool_area.as_ref(),
            "basement_area" => self.basement_area.as_ref(),
            "lot_area" => self.lot_area.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[command(flatten)]
    pub features: FeatureArgs,

    /// Price used for the highlighted map marker.
    #[arg(long, value_enum)]
    pub highlight_pricing: Option<HighlightPricing>,

    /// Histogram bucket count.
    #[arg(long)]
    pub bins: Option<usize>,

    /// Show at most N comparables in the table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Render ASCII histogram and scatter plots (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the full estimate (price, comparables, payloads) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export the comparable sales to CSV.
    #[arg(long = "export-comparables", value_name = "CSV")]
    pub export_comparables: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Export the fitted model to JSON (reusable with `--model`).
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Pre-filled form values.
    #[command(flatten)]
    pub features: FeatureArgs,

    /// Price used for the highlighted map marker.
    #[arg(long, value_enum)]
    pub highlight_pricing: Option<HighlightPricing>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, short = 'o', value_name = "CSV")]
    pub out: PathBuf,

    /// Number of sales to generate.
    #[arg(short = 'n', long)]
    pub sample_count: Option<usize>,

    /// Random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Share of sales that get coordinates (0..=1).
    #[arg(long, default_value_t = 1.0)]
    pub geocoded_share: f64,
}
