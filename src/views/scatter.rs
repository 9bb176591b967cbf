//! Price vs. living-area scatter payload.

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::engine::EstimationResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub living_area: f64,
    pub sale_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPayload {
    /// Every sale in the dataset.
    pub points: Vec<ScatterPoint>,
    /// The query's living area against its predicted price.
    pub highlight: ScatterPoint,
}

impl ScatterPayload {
    /// `([x_min, x_max], [y_min, y_max])` over all points including the highlight.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for p in self.points.iter().chain(std::iter::once(&self.highlight)) {
            x = [x[0].min(p.living_area), x[1].max(p.living_area)];
            y = [y[0].min(p.sale_price), y[1].max(p.sale_price)];
        }
        (x, y)
    }
}

pub fn build_scatter(result: &EstimationResult, dataset: &Dataset) -> ScatterPayload {
    ScatterPayload {
        points: dataset
            .records()
            .iter()
            .map(|r| ScatterPoint {
                living_area: r.living_area,
                sale_price: r.sale_price,
            })
            .collect(),
        highlight: ScatterPoint {
            living_area: result.query.living_area,
            sale_price: result.predicted_price,
        },
    }
}
