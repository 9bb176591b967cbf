//! Multiple linear regression of sale price on the fixed feature set.
//!
//! The model is fit once, at startup, and is read-only afterwards. Scoring is a
//! plain dot product with no clamping: extreme inputs can produce negative or
//! otherwise implausible prices, exactly as ordinary least squares would.
//!
//! Fitting standardizes each column before the solve so that years (~2000),
//! lot areas (~10^4) and counts (~1) are on comparable scales, then maps the
//! coefficients back to raw units.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::Dataset;
use crate::domain::{Feature, QueryFeatures};
use crate::error::EngineError;
use crate::math::{design_matrix, solve_least_squares};

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fitted intercept and per-feature coefficients (in `Feature::ALL` order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub intercept: f64,
    pub coefficients: [f64; Feature::COUNT],
    pub quality: FitQuality,
}

impl RegressionModel {
    /// Fit sale price on the twelve features over the whole dataset.
    pub fn fit(dataset: &Dataset) -> Result<Self, EngineError> {
        let records = dataset.records();
        if records.is_empty() {
            return Err(EngineError::configuration("cannot fit a model on an empty dataset"));
        }

        let rows: Vec<[f64; Feature::COUNT]> = records.iter().map(|r| r.features().to_vector()).collect();
        let y = DVector::from_iterator(records.len(), records.iter().map(|r| r.sale_price));

        let scaling = ColumnScaling::from_rows(&rows);
        let standardized: Vec<[f64; Feature::COUNT]> = rows.iter().map(|row| scaling.apply(row)).collect();
        let x = design_matrix(&standardized);

        let beta = solve_least_squares(&x, &y)
            .ok_or_else(|| EngineError::configuration("regression solve produced no finite solution"))?;

        let mut coefficients = [0.0; Feature::COUNT];
        let mut intercept = beta[0];
        for (j, coef) in coefficients.iter_mut().enumerate() {
            let sd = scaling.sd[j];
            if sd > 0.0 {
                *coef = beta[j + 1] / sd;
                intercept -= *coef * scaling.mean[j];
            }
        }

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EngineError::configuration("regression coefficients are not finite"));
        }

        let mut model = Self {
            intercept,
            coefficients,
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                r_squared: 0.0,
                n: records.len(),
            },
        };
        model.quality = model.compute_quality(dataset);

        info!(
            n = model.quality.n,
            rmse = model.quality.rmse,
            r_squared = model.quality.r_squared,
            "fitted regression model"
        );
        debug!(intercept = model.intercept, coefficients = ?model.coefficients, "model coefficients");

        Ok(model)
    }

    /// Predict a sale price for one feature row.
    pub fn predict(&self, features: &QueryFeatures) -> f64 {
        let x = features.to_vector();
        self.intercept + self.coefficients.iter().zip(x.iter()).map(|(b, v)| b * v).sum::<f64>()
    }

    pub fn coefficient(&self, feature: Feature) -> f64 {
        self.coefficients[feature as usize]
    }

    fn compute_quality(&self, dataset: &Dataset) -> FitQuality {
        let records = dataset.records();
        let n = records.len();
        let mean_y = records.iter().map(|r| r.sale_price).sum::<f64>() / n as f64;

        let mut sse = 0.0;
        let mut sst = 0.0;
        for r in records {
            let resid = r.sale_price - self.predict(&r.features());
            sse += resid * resid;
            sst += (r.sale_price - mean_y).powi(2);
        }

        let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };
        FitQuality {
            sse,
            rmse: (sse / n as f64).sqrt(),
            r_squared,
            n,
        }
    }
}

/// Per-column mean and population standard deviation.
struct ColumnScaling {
    mean: [f64; Feature::COUNT],
    sd: [f64; Feature::COUNT],
}

impl ColumnScaling {
    fn from_rows(rows: &[[f64; Feature::COUNT]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = [0.0; Feature::COUNT];
        let mut sd = [0.0; Feature::COUNT];

        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        for row in rows {
            for j in 0..Feature::COUNT {
                sd[j] += (row[j] - mean[j]).powi(2) / n;
            }
        }
        for s in sd.iter_mut() {
            *s = s.sqrt();
        }

        Self { mean, sd }
    }

    /// Constant columns map to zero so they drop out of the solve.
    fn apply(&self, row: &[f64; Feature::COUNT]) -> [f64; Feature::COUNT] {
        let mut out = [0.0; Feature::COUNT];
        for j in 0..Feature::COUNT {
            if self.sd[j] > 0.0 {
                out[j] = (row[j] - self.mean[j]) / self.sd[j];
            }
        }
        out
    }
}
