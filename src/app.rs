//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads layered configuration
//! - installs logging
//! - loads the sales dataset and fits (or loads) the model
//! - runs one estimation, or hands the session to the TUI
//! - prints reports/plots and writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, EstimateArgs, FitArgs, SampleArgs, TuiArgs};
use crate::config::Settings;
use crate::data::{SampleConfig, generate_sample};
use crate::engine::{EngineSettings, Estimator};
use crate::error::AppError;

pub mod pipeline;

use pipeline::DatasetSource;

/// Entry point for the `comps` binary.
pub fn run() -> Result<(), AppError> {
    // A `.env` file is optional.
    let _ = dotenvy::dotenv();

    // `comps` and `comps --data x.csv` behave like `comps tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let settings = Settings::load(cli.config.as_deref())?;
    let logging = match cli.command {
        Command::Tui(_) => crate::logging::tui_settings(&settings.logging),
        _ => settings.logging.clone(),
    };
    crate::logging::init(&logging);
    debug!(?settings, "configuration loaded");

    match cli.command {
        Command::Estimate(args) => handle_estimate(args, &settings),
        Command::Fit(args) => handle_fit(args, &settings),
        Command::Tui(args) => handle_tui(args, &settings),
        Command::Sample(args) => handle_sample(args, &settings),
    }
}

fn handle_estimate(args: EstimateArgs, settings: &Settings) -> Result<(), AppError> {
    let source = DatasetSource::resolve(&settings.dataset, &args.dataset);
    let context = pipeline::load_context(&source)?;
    let engine_settings = engine_settings(
        &settings.engine,
        args.highlight_pricing,
        args.bins,
    );
    let currency = engine_settings.currency_symbol.clone();

    let mut estimator = Estimator::new(context.clone(), engine_settings);
    let output = estimator.estimate(&args.features.to_query_input())?;

    println!("{}", crate::report::format_estimate_summary(output));
    println!(
        "{}",
        crate::report::format_comparables(output, context.dataset(), args.top, &currency)
    );

    if args.plot && !args.no_plot {
        println!(
            "{}",
            crate::plot::render_histogram(&output.distribution, args.width.saturating_sub(30), &currency)
        );
        println!(
            "{}",
            crate::plot::render_scatter(&output.scatter, args.width, args.height, &currency)
        );
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::write_estimate_json(path, output)?;
    }
    if let Some(path) = &args.export_comparables {
        crate::io::write_comparables_csv(path, output, context.dataset())?;
    }

    Ok(())
}

fn handle_fit(args: FitArgs, settings: &Settings) -> Result<(), AppError> {
    let source = DatasetSource::resolve(&settings.dataset, &args.dataset);
    let context = pipeline::load_context(&source)?;

    println!(
        "{}",
        crate::report::format_model_summary(
            context.dataset().stats(),
            context.model(),
            &settings.engine.currency_symbol
        )
    );

    if let Some(path) = &args.export_model {
        crate::io::write_model_json(path, context.model())?;
    }
    Ok(())
}

fn handle_tui(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    let source = DatasetSource::resolve(&settings.dataset, &args.dataset);
    let context = pipeline::load_context(&source)?;
    let engine_settings = engine_settings(&settings.engine, args.highlight_pricing, None);
    crate::tui::run(context, engine_settings, args.features.to_query_input())
}

fn handle_sample(args: SampleArgs, settings: &Settings) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.sample_count.unwrap_or(settings.dataset.sample_count),
        seed: args.seed.unwrap_or(settings.dataset.sample_seed),
        geocoded_share: args.geocoded_share,
        ..SampleConfig::default()
    };
    let records = generate_sample(&config)?;
    crate::io::write_dataset_csv(&args.out, &records)?;
    println!("Wrote {} sales to {}", records.len(), args.out.display());
    Ok(())
}

/// Configured engine settings with CLI overrides applied.
pub fn engine_settings(
    base: &EngineSettings,
    highlight_pricing: Option<crate::domain::HighlightPricing>,
    bins: Option<usize>,
) -> EngineSettings {
    EngineSettings {
        highlight_pricing: highlight_pricing.unwrap_or(base.highlight_pricing),
        histogram_bins: bins.unwrap_or(base.histogram_bins),
        ..base.clone()
    }
}

/// Rewrite argv so `comps` defaults to `comps tui`.
///
/// Rules:
/// - `comps`                      -> `comps tui`
/// - `comps --data x.csv ...`     -> `comps tui --data x.csv ...`
/// - `comps --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "fit" | "tui" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
