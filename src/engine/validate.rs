//! Query validation.
//!
//! Everything arriving from the UI or CLI is untrusted text. `QueryInput`
//! collects it by field name; `parse_query` turns it into typed
//! `QueryFeatures` or reports the first offending field. Nothing downstream
//! (model, selector, views) ever sees unvalidated values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::QueryFeatures;
use crate::error::EngineError;

/// Required input fields, in the order they are validated and reported.
pub const INPUT_FIELDS: [&str; 12] = [
    "living_area",
    "year_built",
    "year_remodeled",
    "bedrooms",
    "garage_cars",
    "garage_area",
    "full_baths",
    "half_baths",
    "has_fireplace",
    "pool_area",
    "basement_area",
    "lot_area",
];

/// Raw, unvalidated query fields keyed by input name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryInput {
    values: BTreeMap<String, String>,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    /// Render typed features back into input form (fireplaces > 0 → `true`).
    pub fn from_features(features: &QueryFeatures) -> Self {
        let mut input = Self::new();
        for field in INPUT_FIELDS {
            if let Some(value) = render_field(features, field) {
                input.set(field, value);
            }
        }
        input
    }
}

fn render_field(f: &QueryFeatures, field: &str) -> Option<String> {
    let value = match field {
        "living_area" => f.living_area.to_string(),
        "year_built" => f.year_built.to_string(),
        "year_remodeled" => f.year_remodeled.to_string(),
        "bedrooms" => f.bedrooms.to_string(),
        "garage_cars" => f.garage_cars.to_string(),
        "garage_area" => f.garage_area.to_string(),
        "full_baths" => f.full_baths.to_string(),
        "half_baths" => f.half_baths.to_string(),
        "has_fireplace" => (f.fireplaces > 0).to_string(),
        "pool_area" => f.pool_area.to_string(),
        "basement_area" => f.basement_area.to_string(),
        "lot_area" => f.lot_area.to_string(),
        _ => return None,
    };
    Some(value)
}

/// Parse and range-check every required field.
///
/// Each field is fully checked before the next one is read, so the error
/// always names the first bad field in `INPUT_FIELDS` order.
pub fn parse_query(input: &QueryInput) -> Result<QueryFeatures, EngineError> {
    Ok(QueryFeatures {
        living_area: area(input, "living_area", true)?,
        year_built: year(input, "year_built")?,
        year_remodeled: year(input, "year_remodeled")?,
        bedrooms: count(input, "bedrooms")?,
        garage_cars: count(input, "garage_cars")?,
        garage_area: area(input, "garage_area", false)?,
        full_baths: count(input, "full_baths")?,
        half_baths: count(input, "half_baths")?,
        fireplaces: u32::from(flag(input, "has_fireplace")?),
        pool_area: area(input, "pool_area", false)?,
        basement_area: area(input, "basement_area", false)?,
        lot_area: area(input, "lot_area", true)?,
    })
}

/// Range checks for typed features supplied directly.
pub fn check_features(f: &QueryFeatures) -> Result<(), EngineError> {
    let areas = [
        ("living_area", f.living_area, true),
        ("garage_area", f.garage_area, false),
        ("pool_area", f.pool_area, false),
        ("basement_area", f.basement_area, false),
        ("lot_area", f.lot_area, true),
    ];
    for (field, value, strictly_positive) in areas {
        check_area(field, value, strictly_positive)?;
    }
    Ok(())
}

fn check_area(field: &str, value: f64, strictly_positive: bool) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::validation(field, "must be a finite number"));
    }
    if strictly_positive && value <= 0.0 {
        return Err(EngineError::validation(field, "must be greater than 0"));
    }
    if value < 0.0 {
        return Err(EngineError::validation(field, "must not be negative"));
    }
    Ok(value)
}

fn required<'a>(input: &'a QueryInput, field: &str) -> Result<&'a str, EngineError> {
    input
        .get(field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EngineError::validation(field, "missing value"))
}

fn number(input: &QueryInput, field: &str) -> Result<f64, EngineError> {
    let raw = required(input, field)?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| EngineError::validation(field, format!("'{raw}' is not a number")))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EngineError::validation(field, "must be a finite number"))
    }
}

fn area(input: &QueryInput, field: &str, strictly_positive: bool) -> Result<f64, EngineError> {
    check_area(field, number(input, field)?, strictly_positive)
}

fn integral(input: &QueryInput, field: &str) -> Result<f64, EngineError> {
    let v = number(input, field)?;
    if v.fract() != 0.0 {
        return Err(EngineError::validation(field, "must be a whole number"));
    }
    Ok(v)
}

fn count(input: &QueryInput, field: &str) -> Result<u32, EngineError> {
    let v = integral(input, field)?;
    if v < 0.0 {
        return Err(EngineError::validation(field, "must not be negative"));
    }
    if v > f64::from(u32::MAX) {
        return Err(EngineError::validation(field, "is out of range"));
    }
    Ok(v as u32)
}

fn year(input: &QueryInput, field: &str) -> Result<i32, EngineError> {
    let v = integral(input, field)?;
    if v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return Err(EngineError::validation(field, "is out of range"));
    }
    Ok(v as i32)
}

fn flag(input: &QueryInput, field: &str) -> Result<bool, EngineError> {
    let raw = required(input, field)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(EngineError::validation(field, format!("'{raw}' is not true/false"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> QueryInput {
        QueryInput::new()
            .with("living_area", "1500")
            .with("year_built", "2000")
            .with("year_remodeled", "2004")
            .with("bedrooms", "3")
            .with("garage_cars", "2")
            .with("garage_area", "480")
            .with("full_baths", "2")
            .with("half_baths", "1")
            .with("has_fireplace", "true")
            .with("pool_area", "0")
            .with("basement_area", "900.5")
            .with("lot_area", "8500")
    }

    fn field_of(err: EngineError) -> String {
        match err {
            EngineError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_complete_query() {
        let q = parse_query(&complete()).unwrap();
        assert_eq!(q.living_area, 1500.0);
        assert_eq!(q.year_remodeled, 2004);
        assert_eq!(q.bedrooms, 3);
        assert_eq!(q.fireplaces, 1);
        assert_eq!(q.basement_area, 900.5);
    }

    #[test]
    fn fireplace_flag_coerces_to_count() {
        let q = parse_query(&complete().with("has_fireplace", "false")).unwrap();
        assert_eq!(q.fireplaces, 0);
        let q = parse_query(&complete().with("has_fireplace", " Yes ")).unwrap();
        assert_eq!(q.fireplaces, 1);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut input = complete();
        input.remove("garage_cars");
        assert_eq!(field_of(parse_query(&input).unwrap_err()), "garage_cars");

        let input = complete().with("pool_area", "   ");
        assert_eq!(field_of(parse_query(&input).unwrap_err()), "pool_area");
    }

    #[test]
    fn first_failing_field_wins() {
        let input = complete().with("lot_area", "x").with("bedrooms", "x");
        assert_eq!(field_of(parse_query(&input).unwrap_err()), "bedrooms");

        // A range failure early in the order beats a parse failure later on.
        let input = complete().with("living_area", "0").with("lot_area", "x");
        assert_eq!(field_of(parse_query(&input).unwrap_err()), "living_area");

        let input = complete().with("garage_area", "-5").with("pool_area", "x");
        assert_eq!(field_of(parse_query(&input).unwrap_err()), "garage_area");
    }

    #[test]
    fn rejects_non_numeric_and_out_of_range_values() {
        for (field, value) in [
            ("living_area", "big"),
            ("living_area", "0"),
            ("living_area", "NaN"),
            ("bedrooms", "2.5"),
            ("bedrooms", "-1"),
            ("year_built", "1999.5"),
            ("garage_area", "-10"),
            ("lot_area", "inf"),
            ("has_fireplace", "maybe"),
        ] {
            let err = parse_query(&complete().with(field, value)).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(field_of(err), field, "value {value:?}");
        }
    }

    #[test]
    fn typed_features_round_trip_through_input() {
        let q = parse_query(&complete()).unwrap();
        assert_eq!(parse_query(&QueryInput::from_features(&q)).unwrap(), q);
    }

    #[test]
    fn from_features_fills_every_input_field() {
        let input = QueryInput::from_features(&parse_query(&complete()).unwrap());
        for field in INPUT_FIELDS {
            assert!(input.get(field).is_some(), "{field} missing");
        }
    }

    #[test]
    fn check_features_catches_bad_typed_values() {
        let mut q = parse_query(&complete()).unwrap();
        q.pool_area = f64::NAN;
        assert_eq!(field_of(check_features(&q).unwrap_err()), "pool_area");
    }
}
