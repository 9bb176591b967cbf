//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and estimation
//! - exported to JSON/CSV
//! - handed to renderers without further conversion

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Regression feature, in the fixed order used for the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LivingArea,
    YearBuilt,
    YearRemodeled,
    Bedrooms,
    GarageCars,
    GarageArea,
    LotArea,
    FullBaths,
    HalfBaths,
    Fireplaces,
    PoolArea,
    BasementArea,
}

impl Feature {
    pub const COUNT: usize = 12;

    /// Design-matrix column order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::LivingArea,
        Feature::YearBuilt,
        Feature::YearRemodeled,
        Feature::Bedrooms,
        Feature::GarageCars,
        Feature::GarageArea,
        Feature::LotArea,
        Feature::FullBaths,
        Feature::HalfBaths,
        Feature::Fireplaces,
        Feature::PoolArea,
        Feature::BasementArea,
    ];

    /// Canonical snake_case column name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::LivingArea => "living_area",
            Feature::YearBuilt => "year_built",
            Feature::YearRemodeled => "year_remodeled",
            Feature::Bedrooms => "bedrooms",
            Feature::GarageCars => "garage_cars",
            Feature::GarageArea => "garage_area",
            Feature::LotArea => "lot_area",
            Feature::FullBaths => "full_baths",
            Feature::HalfBaths => "half_baths",
            Feature::Fireplaces => "fireplaces",
            Feature::PoolArea => "pool_area",
            Feature::BasementArea => "basement_area",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::LivingArea => "Living area (sqft)",
            Feature::YearBuilt => "Year built",
            Feature::YearRemodeled => "Year remodeled",
            Feature::Bedrooms => "Bedrooms",
            Feature::GarageCars => "Garage cars",
            Feature::GarageArea => "Garage area (sqft)",
            Feature::LotArea => "Lot area (sqft)",
            Feature::FullBaths => "Full baths",
            Feature::HalfBaths => "Half baths",
            Feature::Fireplaces => "Fireplaces",
            Feature::PoolArea => "Pool area (sqft)",
            Feature::BasementArea => "Basement area (sqft)",
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Approximate centroid of Ames, Iowa (home region of the reference dataset).
pub const AMES_CENTROID: GeoPoint = GeoPoint::new(42.0308, -93.6319);

/// One historical sale. Owned by the dataset; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseRecord {
    pub living_area: f64,
    pub year_built: i32,
    pub year_remodeled: i32,
    pub bedrooms: u32,
    pub garage_cars: u32,
    pub garage_area: f64,
    pub lot_area: f64,
    pub full_baths: u32,
    pub half_baths: u32,
    pub fireplaces: u32,
    pub pool_area: f64,
    pub basement_area: f64,
    pub sale_price: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl HouseRecord {
    /// The record's feature row, in the same shape as a user query.
    pub fn features(&self) -> QueryFeatures {
        QueryFeatures {
            living_area: self.living_area,
            year_built: self.year_built,
            year_remodeled: self.year_remodeled,
            bedrooms: self.bedrooms,
            garage_cars: self.garage_cars,
            garage_area: self.garage_area,
            lot_area: self.lot_area,
            full_baths: self.full_baths,
            half_baths: self.half_baths,
            fireplaces: self.fireplaces,
            pool_area: self.pool_area,
            basement_area: self.basement_area,
        }
    }

    /// Both coordinates, or `None` if either is absent.
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Validated feature values for one estimation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryFeatures {
    pub living_area: f64,
    pub year_built: i32,
    pub year_remodeled: i32,
    pub bedrooms: u32,
    pub garage_cars: u32,
    pub garage_area: f64,
    pub lot_area: f64,
    pub full_baths: u32,
    pub half_baths: u32,
    pub fireplaces: u32,
    pub pool_area: f64,
    pub basement_area: f64,
}

impl QueryFeatures {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::LivingArea => self.living_area,
            Feature::YearBuilt => f64::from(self.year_built),
            Feature::YearRemodeled => f64::from(self.year_remodeled),
            Feature::Bedrooms => f64::from(self.bedrooms),
            Feature::GarageCars => f64::from(self.garage_cars),
            Feature::GarageArea => self.garage_area,
            Feature::LotArea => self.lot_area,
            Feature::FullBaths => f64::from(self.full_baths),
            Feature::HalfBaths => f64::from(self.half_baths),
            Feature::Fireplaces => f64::from(self.fireplaces),
            Feature::PoolArea => self.pool_area,
            Feature::BasementArea => self.basement_area,
        }
    }

    /// Feature values in [`Feature::ALL`] order.
    pub fn to_vector(&self) -> [f64; Feature::COUNT] {
        Feature::ALL.map(|f| self.value(f))
    }
}

/// Which feature row prices the highlighted map marker.
///
/// `Query` scores the user's own query (the same price shown everywhere else).
/// `FirstComparable` re-scores the first comparable's feature row, reproducing
/// the legacy dashboard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightPricing {
    #[default]
    Query,
    FirstComparable,
}

/// Summary stats about the records held by a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_geocoded: usize,
    pub living_area_min: f64,
    pub living_area_max: f64,
    pub price_min: f64,
    pub price_max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> HouseRecord {
        HouseRecord {
            living_area: 1500.0,
            year_built: 2000,
            year_remodeled: 2005,
            bedrooms: 3,
            garage_cars: 2,
            garage_area: 480.0,
            lot_area: 9000.0,
            full_baths: 2,
            half_baths: 1,
            fireplaces: 1,
            pool_area: 0.0,
            basement_area: 1000.0,
            sale_price: 200_000.0,
            latitude: Some(42.0),
            longitude: None,
        }
    }

    #[test]
    fn feature_vector_follows_column_order() {
        let v = record().features().to_vector();
        assert_eq!(v[0], 1500.0);
        assert_eq!(v[1], 2000.0);
        assert_eq!(v[2], 2005.0);
        assert_eq!(v[3], 3.0);
        assert_eq!(v[9], 1.0);
        assert_eq!(v[11], 1000.0);
        assert_eq!(Feature::ALL[6].name(), "lot_area");
    }

    #[test]
    fn half_present_coordinates_are_absent() {
        let mut r = record();
        assert!(r.coordinates().is_none());
        r.longitude = Some(-93.6);
        assert_eq!(r.coordinates(), Some(GeoPoint::new(42.0, -93.6)));
    }
}
