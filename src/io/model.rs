//! Read/write fitted-model JSON files.
//!
//! A model file lets `estimate` and `tui` skip the startup fit: it carries the
//! intercept, the coefficients in `Feature::ALL` order and the fit diagnostics
//! recorded when it was written.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Feature;
use crate::error::AppError;
use crate::models::RegressionModel;

pub const MODEL_FILE_TOOL: &str = "comps";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    /// Feature names in coefficient order, for readers of the raw file.
    pub features: Vec<String>,
    pub model: RegressionModel,
}

impl ModelFile {
    pub fn new(model: &RegressionModel) -> Self {
        Self {
            tool: MODEL_FILE_TOOL.to_string(),
            generated: Utc::now(),
            features: Feature::ALL.iter().map(|f| f.name().to_string()).collect(),
            model: model.clone(),
        }
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &RegressionModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &ModelFile::new(model))
        .map_err(|e| AppError::runtime(format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file.
///
/// The feature list must match ours exactly; a file written for another
/// feature layout would silently misprice every query.
pub fn read_model_json(path: &Path) -> Result<RegressionModel, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let parsed: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid model JSON: {e}")))?;

    let expected: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
    if parsed.features != expected {
        return Err(AppError::config(format!(
            "Model JSON feature list {:?} does not match {:?}",
            parsed.features, expected
        )));
    }
    let m = &parsed.model;
    if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
        return Err(AppError::config("Model JSON contains non-finite coefficients"));
    }
    Ok(parsed.model)
}
