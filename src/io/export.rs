//! Exports: estimation results (JSON), comparables and datasets (CSV).
//!
//! CSVs are meant to be easy to consume in spreadsheets; the JSON export is the
//! full renderer payload so it can be re-drawn elsewhere.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::HouseRecord;
use crate::engine::EstimationOutput;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct EstimateFile<'a> {
    tool: &'static str,
    generated: DateTime<Utc>,
    #[serde(flatten)]
    output: &'a EstimationOutput,
}

/// Write the full estimation output as pretty JSON.
pub fn write_estimate_json(path: &Path, output: &EstimationOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create estimate JSON '{}': {e}", path.display())))?;

    let doc = EstimateFile {
        tool: "comps",
        generated: Utc::now(),
        output,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::runtime(format!("Failed to write estimate JSON: {e}")))?;
    Ok(())
}

const RECORD_HEADER: &str = "living_area,year_built,year_remodeled,bedrooms,garage_cars,garage_area,lot_area,full_baths,half_baths,fireplaces,pool_area,basement_area,sale_price,latitude,longitude";

/// Write the tight comparable set, one row per sale, prefixed with its dataset row.
pub fn write_comparables_csv(path: &Path, output: &EstimationOutput, dataset: &Dataset) -> Result<(), AppError> {
    let mut file = create_csv(path)?;

    writeln!(file, "row,{RECORD_HEADER}")
        .map_err(|e| AppError::runtime(format!("Failed to write comparables CSV header: {e}")))?;

    for &idx in output.result.comparables.indices() {
        let Some(r) = dataset.get(idx) else { continue };
        writeln!(file, "{idx},{}", record_row(r))
            .map_err(|e| AppError::runtime(format!("Failed to write comparables CSV row: {e}")))?;
    }
    file.flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush comparables CSV: {e}")))?;
    Ok(())
}

/// Write records in the layout `io::ingest` reads back.
pub fn write_dataset_csv(path: &Path, records: &[HouseRecord]) -> Result<(), AppError> {
    let mut file = create_csv(path)?;

    writeln!(file, "{RECORD_HEADER}")
        .map_err(|e| AppError::runtime(format!("Failed to write dataset CSV header: {e}")))?;
    for r in records {
        writeln!(file, "{}", record_row(r))
            .map_err(|e| AppError::runtime(format!("Failed to write dataset CSV row: {e}")))?;
    }
    file.flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush dataset CSV: {e}")))?;
    Ok(())
}

fn create_csv(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AppError::input(format!("Failed to create CSV '{}': {e}", path.display())))
}

fn record_row(r: &HouseRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        r.living_area,
        r.year_built,
        r.year_remodeled,
        r.bedrooms,
        r.garage_cars,
        r.garage_area,
        r.lot_area,
        r.full_baths,
        r.half_baths,
        r.fireplaces,
        r.pool_area,
        r.basement_area,
        r.sale_price,
        r.latitude.map(|v| format!("{v:.6}")).unwrap_or_default(),
        r.longitude.map(|v| format!("{v:.6}")).unwrap_or_default(),
    )
}
