//! Map payload: comparable markers, or a single "no data" marker.
//!
//! The fallback is all-or-nothing. If the comparable set is empty, or any
//! comparable lacks coordinates, the whole map collapses to one marker at the
//! configured fallback center. A partially geocoded set is never drawn.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::Dataset;
use crate::domain::{GeoPoint, HighlightPricing, HouseRecord};
use crate::engine::{EngineSettings, EstimationResult};
use crate::models::RegressionModel;
use crate::report::{format_area, format_price};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub position: GeoPoint,
    pub sale_price: f64,
    pub living_area: f64,
    pub bedrooms: u32,
    pub year_built: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightMarker {
    pub position: GeoPoint,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapPayload {
    Comparables {
        markers: Vec<MapMarker>,
        highlight: HighlightMarker,
    },
    NoData {
        center: GeoPoint,
        message: String,
    },
}

impl MapPayload {
    pub fn is_fallback(&self) -> bool {
        matches!(self, MapPayload::NoData { .. })
    }
}

pub fn build_map(
    result: &EstimationResult,
    dataset: &Dataset,
    model: &RegressionModel,
    settings: &EngineSettings,
) -> MapPayload {
    let Some(positions) = geocode_all(result, dataset) else {
        debug!(
            comparables = result.comparables.len(),
            "no fully geocoded comparables; using fallback map marker"
        );
        return MapPayload::NoData {
            center: settings.fallback_center,
            message: settings.no_data_message.clone(),
        };
    };

    let markers: Vec<MapMarker> = result
        .comparables
        .records(dataset)
        .zip(positions.iter())
        .map(|(r, &position)| marker(r, position, &settings.currency_symbol))
        .collect();

    let n = positions.len() as f64;
    let center = GeoPoint::new(
        positions.iter().map(|p| p.latitude).sum::<f64>() / n,
        positions.iter().map(|p| p.longitude).sum::<f64>() / n,
    );

    let price = match settings.highlight_pricing {
        HighlightPricing::Query => result.predicted_price,
        HighlightPricing::FirstComparable => result
            .comparables
            .first(dataset)
            .map(|r| model.predict(&r.features()))
            .unwrap_or(result.predicted_price),
    };

    MapPayload::Comparables {
        markers,
        highlight: HighlightMarker {
            position: center,
            price,
            label: format!("Estimated: {}", format_price(price, &settings.currency_symbol)),
        },
    }
}

/// Coordinates of every comparable, or `None` if the set is empty or any
/// member is missing a coordinate.
fn geocode_all(result: &EstimationResult, dataset: &Dataset) -> Option<Vec<GeoPoint>> {
    if result.comparables.is_empty() {
        return None;
    }
    result
        .comparables
        .records(dataset)
        .map(HouseRecord::coordinates)
        .collect()
}

fn marker(r: &HouseRecord, position: GeoPoint, currency: &str) -> MapMarker {
    MapMarker {
        position,
        sale_price: r.sale_price,
        living_area: r.living_area,
        bedrooms: r.bedrooms,
        year_built: r.year_built,
        label: format!(
            "{} | {} sqft | {} bd | built {}",
            format_price(r.sale_price, currency),
            format_area(r.living_area),
            r.bedrooms,
            r.year_built
        ),
    }
}
