//! Shared startup logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset (CSV or synthetic sample) -> fit (or load) model -> estimation context
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::DatasetArgs;
use crate::config::DatasetSettings;
use crate::data::{Dataset, SampleConfig, generate_sample};
use crate::engine::EstimationContext;
use crate::error::AppError;
use crate::io::{load_dataset, read_model_json};

/// Print at most this many skipped-row warnings; the rest are summarized.
const MAX_ROW_WARNINGS: usize = 10;

/// Resolved dataset source: CLI flags over configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    pub settings: DatasetSettings,
    pub model: Option<std::path::PathBuf>,
}

impl DatasetSource {
    pub fn resolve(settings: &DatasetSettings, args: &DatasetArgs) -> Self {
        Self {
            settings: DatasetSettings {
                path: args.data.clone().or_else(|| settings.path.clone()),
                sample_count: args.sample_count.unwrap_or(settings.sample_count),
                sample_seed: args.seed.unwrap_or(settings.sample_seed),
            },
            model: args.model.clone(),
        }
    }
}

/// Load the reference sales: the CSV if one is configured, else a seeded sample.
pub fn load_dataset_from(settings: &DatasetSettings) -> Result<Dataset, AppError> {
    let Some(path) = &settings.path else {
        let records = generate_sample(&SampleConfig {
            count: settings.sample_count,
            seed: settings.sample_seed,
            ..SampleConfig::default()
        })?;
        info!(
            count = records.len(),
            seed = settings.sample_seed,
            "no dataset path configured; using synthetic sample"
        );
        return Ok(Dataset::new(records)?);
    };

    let ingest = load_dataset(path)?;
    for e in ingest.row_errors.iter().take(MAX_ROW_WARNINGS) {
        warn!(line = e.line, "skipped row: {}", e.message);
    }
    if ingest.row_errors.len() > MAX_ROW_WARNINGS {
        warn!(
            more = ingest.row_errors.len() - MAX_ROW_WARNINGS,
            "further rows skipped"
        );
    }
    Ok(ingest.dataset)
}

/// Build the shared `(Dataset, Model)` pair. Everything here is fatal on error.
pub fn load_context(source: &DatasetSource) -> Result<Arc<EstimationContext>, AppError> {
    let dataset = load_dataset_from(&source.settings)?;

    let context = match &source.model {
        Some(path) => {
            let model = read_model_json(path)?;
            info!(path = %path.display(), "loaded regression model");
            EstimationContext::from_parts(dataset, model)
        }
        None => EstimationContext::initialize(dataset)?,
    };
    Ok(Arc::new(context))
}
