//! The reference dataset of historical sales.
//!
//! A `Dataset` is built once at startup and never mutated afterwards, so it can
//! be shared freely (behind an `Arc`) between the model fit and any number of
//! estimation sessions.

use crate::domain::{DatasetStats, HouseRecord};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<HouseRecord>,
    stats: DatasetStats,
}

impl Dataset {
    /// Wrap a table of sales. An empty table cannot support a fit.
    pub fn new(records: Vec<HouseRecord>) -> Result<Self, EngineError> {
        let stats = compute_stats(&records)
            .ok_or_else(|| EngineError::configuration("dataset is empty"))?;
        Ok(Self { records, stats })
    }

    pub fn records(&self) -> &[HouseRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&HouseRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }
}

fn compute_stats(records: &[HouseRecord]) -> Option<DatasetStats> {
    let mut living_area_min = f64::INFINITY;
    let mut living_area_max = f64::NEG_INFINITY;
    let mut price_min = f64::INFINITY;
    let mut price_max = f64::NEG_INFINITY;
    let mut n_geocoded = 0usize;

    for r in records {
        living_area_min = living_area_min.min(r.living_area);
        living_area_max = living_area_max.max(r.living_area);
        price_min = price_min.min(r.sale_price);
        price_max = price_max.max(r.sale_price);
        if r.coordinates().is_some() {
            n_geocoded += 1;
        }
    }

    if !living_area_min.is_finite() || !living_area_max.is_finite() || !price_min.is_finite() || !price_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_records: records.len(),
        n_geocoded,
        living_area_min,
        living_area_max,
        price_min,
        price_max,
    })
}
