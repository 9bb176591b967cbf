//! Synthetic Ames-like sales generation.
//!
//! Used when no CSV is supplied (demo runs, the TUI without data) and by tests.
//! Prices follow a known linear model (`PRICE_MODEL`) plus optional Gaussian
//! noise, so a fit over a noiseless sample recovers the model exactly.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{AMES_CENTROID, Feature, HouseRecord};
use crate::error::AppError;

/// Floor applied to noisy prices so every generated sale stays positive.
const MIN_PRICE: f64 = 10_000.0;

/// Spread (degrees) of generated coordinates around the home-region centroid.
const COORD_SIGMA_DEG: f64 = 0.02;

/// Intercept and per-feature coefficients (in `Feature::ALL` order) used to
/// price generated houses.
pub const PRICE_MODEL: (f64, [f64; Feature::COUNT]) = (
    -1_100_000.0,
    [
        75.0,    // living area
        300.0,   // year built
        280.0,   // year remodeled
        -3_000.0, // bedrooms
        9_000.0, // garage cars
        25.0,    // garage area
        0.6,     // lot area
        6_000.0, // full baths
        3_000.0, // half baths
        5_000.0, // fireplaces
        20.0,    // pool area
        30.0,    // basement area
    ],
);

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Standard deviation of the additive price noise (currency units).
    pub noise_sd: f64,
    /// Probability that a generated record carries coordinates.
    pub geocoded_share: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 500,
            seed: 42,
            noise_sd: 15_000.0,
            geocoded_share: 1.0,
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<HouseRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::input("Sample noise must be finite and >= 0."));
    }
    if !(0.0..=1.0).contains(&config.geocoded_share) {
        return Err(AppError::input("Geocoded share must be within [0, 1]."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let living = normal(1_500.0, 450.0)?;
    let lot = normal(10_000.0, 3_000.0)?;
    let coord = normal(0.0, COORD_SIGMA_DEG)?;
    let noise = normal(0.0, config.noise_sd)?;

    let mut records = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let living_area = living.sample(&mut rng).clamp(600.0, 4_000.0).round();
        let year_built = rng.gen_range(1900..=2010);
        let year_remodeled = if rng.gen_bool(0.5) {
            year_built
        } else {
            rng.gen_range(year_built..=2010)
        };
        let bedrooms = ((living_area / 550.0).round() as u32 + rng.gen_range(0..=1)).clamp(1, 6);
        let garage_cars = rng.gen_range(0..=3u32);
        let garage_area = if garage_cars == 0 {
            0.0
        } else {
            f64::from(garage_cars * rng.gen_range(220..=300u32))
        };
        let lot_area = lot.sample(&mut rng).clamp(1_500.0, 40_000.0).round();
        let full_baths = (1 + u32::from(living_area > 1_600.0) + rng.gen_range(0..=1u32)).min(3);
        let half_baths = rng.gen_range(0..=1u32);
        let fireplaces = if rng.gen_bool(0.5) { rng.gen_range(1..=2u32) } else { 0 };
        let pool_area = if rng.gen_bool(0.05) {
            f64::from(rng.gen_range(300..=700u32))
        } else {
            0.0
        };
        let basement_area = if rng.gen_bool(0.9) {
            (living_area * rng.gen_range(0.5..1.0)).round()
        } else {
            0.0
        };

        let (latitude, longitude) = if rng.gen_bool(config.geocoded_share) {
            (
                Some(AMES_CENTROID.latitude + coord.sample(&mut rng)),
                Some(AMES_CENTROID.longitude + coord.sample(&mut rng)),
            )
        } else {
            (None, None)
        };

        let mut record = HouseRecord {
            living_area,
            year_built,
            year_remodeled,
            bedrooms,
            garage_cars,
            garage_area,
            lot_area,
            full_baths,
            half_baths,
            fireplaces,
            pool_area,
            basement_area,
            sale_price: 0.0,
            latitude,
            longitude,
        };

        let eps = if config.noise_sd > 0.0 { noise.sample(&mut rng) } else { 0.0 };
        record.sale_price = (model_price(&record) + eps).max(MIN_PRICE).round();
        records.push(record);
    }

    Ok(records)
}

/// Noiseless price of a record under `PRICE_MODEL`.
pub fn model_price(record: &HouseRecord) -> f64 {
    let (intercept, coefs) = PRICE_MODEL;
    let x = record.features().to_vector();
    intercept + coefs.iter().zip(x.iter()).map(|(b, v)| b * v).sum::<f64>()
}

fn normal(mean: f64, sd: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, sd).map_err(|e| AppError::runtime(format!("Sample distribution error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let config = SampleConfig { count: 50, ..SampleConfig::default() };
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a, b);

        let c = generate_sample(&SampleConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn generated_records_respect_constraints() {
        let records = generate_sample(&SampleConfig { count: 300, ..SampleConfig::default() }).unwrap();
        assert_eq!(records.len(), 300);
        for r in &records {
            assert!(r.living_area > 0.0);
            assert!(r.lot_area > 0.0);
            assert!(r.year_remodeled >= r.year_built);
            assert!(r.sale_price > 0.0);
            assert!(r.coordinates().is_some());
        }
    }

    #[test]
    fn noiseless_prices_follow_the_model() {
        let config = SampleConfig {
            count: 100,
            noise_sd: 0.0,
            geocoded_share: 0.0,
            ..SampleConfig::default()
        };
        for r in generate_sample(&config).unwrap() {
            assert!((r.sale_price - model_price(&r).round()).abs() < 1e-9);
            assert!(r.coordinates().is_none());
        }
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(generate_sample(&SampleConfig { count: 0, ..SampleConfig::default() }).is_err());
        assert!(generate_sample(&SampleConfig { geocoded_share: 1.5, ..SampleConfig::default() }).is_err());
        assert!(generate_sample(&SampleConfig { noise_sd: f64::NAN, ..SampleConfig::default() }).is_err());
    }
}
