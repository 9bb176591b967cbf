//! CSV ingest of historical sales.
//!
//! Turns a sales export (our own snake_case layout, or the Ames housing
//! column names) into a validated `Dataset`.
//!
//! - **Strict schema**: every feature column plus the sale price must exist
//!   (exit code 3 otherwise)
//! - **Row-level validation**: bad rows are skipped and reported, not fatal
//! - coordinates are optional, per column and per row

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::data::Dataset;
use crate::domain::HouseRecord;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus what was skipped on the way.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Canonical column name and the normalized header spellings accepted for it.
const COLUMNS: [(&str, &[&str]); 15] = [
    ("living_area", &["livingarea", "grlivarea", "sqft", "sqftliving"]),
    ("year_built", &["yearbuilt"]),
    ("year_remodeled", &["yearremodeled", "yearremodadd", "yearremod"]),
    ("bedrooms", &["bedrooms", "bedroomabvgr", "beds"]),
    ("garage_cars", &["garagecars"]),
    ("garage_area", &["garagearea"]),
    ("lot_area", &["lotarea"]),
    ("full_baths", &["fullbaths", "fullbath"]),
    ("half_baths", &["halfbaths", "halfbath"]),
    ("fireplaces", &["fireplaces"]),
    ("pool_area", &["poolarea"]),
    ("basement_area", &["basementarea", "totalbsmtsf"]),
    ("sale_price", &["saleprice", "price"]),
    ("latitude", &["latitude", "lat"]),
    ("longitude", &["longitude", "lon", "lng", "long"]),
];

const OPTIONAL_COLUMNS: [&str; 2] = ["latitude", "longitude"];

/// Open `path` and ingest it.
pub fn load_dataset(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_dataset(file)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        skipped = data.row_errors.len(),
        "loaded sales dataset"
    );
    Ok(data)
}

/// Ingest CSV from any reader.
pub fn read_dataset<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns = resolve_columns(&headers)?;
    debug!(?columns, "resolved CSV columns");

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));
        match outcome {
            Ok(r) => records.push(r),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::config(format!(
            "No valid rows in dataset ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(IngestedData {
        dataset: Dataset::new(records)?,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '.' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Map canonical column names to header positions; every non-optional column
/// must be present.
fn resolve_columns(headers: &StringRecord) -> Result<HashMap<&'static str, usize>, AppError> {
    let normalized: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let mut columns = HashMap::new();
    let mut missing = Vec::new();
    for (canonical, aliases) in COLUMNS {
        match normalized.iter().position(|h| aliases.contains(&h.as_str())) {
            Some(idx) => {
                columns.insert(canonical, idx);
            }
            None if OPTIONAL_COLUMNS.contains(&canonical) => {}
            None => missing.push(canonical),
        }
    }

    if !missing.is_empty() {
        return Err(AppError::config(format!(
            "Missing required column(s): {}",
            missing.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(columns)
}

fn parse_row(record: &StringRecord, columns: &HashMap<&'static str, usize>) -> Result<HouseRecord, String> {
    let row = HouseRecord {
        living_area: get_f64(record, columns, "living_area")?,
        year_built: get_int(record, columns, "year_built")?,
        year_remodeled: get_int(record, columns, "year_remodeled")?,
        bedrooms: get_count(record, columns, "bedrooms")?,
        garage_cars: get_count(record, columns, "garage_cars")?,
        garage_area: get_f64(record, columns, "garage_area")?,
        lot_area: get_f64(record, columns, "lot_area")?,
        full_baths: get_count(record, columns, "full_baths")?,
        half_baths: get_count(record, columns, "half_baths")?,
        fireplaces: get_count(record, columns, "fireplaces")?,
        pool_area: get_f64(record, columns, "pool_area")?,
        basement_area: get_f64(record, columns, "basement_area")?,
        sale_price: get_f64(record, columns, "sale_price")?,
        latitude: get_optional(record, columns, "latitude").and_then(parse_coordinate),
        longitude: get_optional(record, columns, "longitude").and_then(parse_coordinate),
    };
    check_row(row)
}

/// Enforce record constraints. A lone latitude or longitude is dropped so the
/// record simply counts as not geocoded.
fn check_row(mut row: HouseRecord) -> Result<HouseRecord, String> {
    let positive = [
        ("living_area", row.living_area),
        ("lot_area", row.lot_area),
        ("sale_price", row.sale_price),
    ];
    for (name, v) in positive {
        if v <= 0.0 {
            return Err(format!("`{name}` must be > 0 (got {v})."));
        }
    }

    let non_negative = [
        ("garage_area", row.garage_area),
        ("pool_area", row.pool_area),
        ("basement_area", row.basement_area),
    ];
    for (name, v) in non_negative {
        if v < 0.0 {
            return Err(format!("`{name}` must be >= 0 (got {v})."));
        }
    }

    if row.year_remodeled < row.year_built {
        return Err(format!(
            "`year_remodeled` ({}) is before `year_built` ({}).",
            row.year_remodeled, row.year_built
        ));
    }

    if row.latitude.is_none() || row.longitude.is_none() {
        row.latitude = None;
        row.longitude = None;
    }
    Ok(row)
}

fn get_required<'a>(
    record: &'a StringRecord,
    columns: &HashMap<&'static str, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = columns
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Option<&'a str> {
    let idx = columns.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn get_f64(record: &StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Result<f64, String> {
    let raw = get_required(record, columns, name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{raw}'.")),
    }
}

/// Integral value; `1998.0` is accepted, `1998.5` is not.
fn get_int(record: &StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Result<i32, String> {
    let v = get_f64(record, columns, name)?;
    if v.fract() != 0.0 || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return Err(format!("`{name}` must be a whole number (got {v})."));
    }
    Ok(v as i32)
}

fn get_count(record: &StringRecord, columns: &HashMap<&'static str, usize>, name: &str) -> Result<u32, String> {
    let v = get_int(record, columns, name)?;
    u32::try_from(v).map_err(|_| format!("`{name}` must be >= 0 (got {v})."))
}

fn parse_coordinate(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EXIT_CONFIG, EXIT_INPUT};

    const SNAKE_HEADER: &str = "living_area,year_built,year_remodeled,bedrooms,garage_cars,garage_area,lot_area,full_baths,half_baths,fireplaces,pool_area,basement_area,sale_price,latitude,longitude";

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(SNAKE_HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn reads_snake_case_columns() {
        let text = csv(&[
            "1500,2000,2005,3,2,480,9000,2,1,1,0,1000,200000,42.0,-93.6",
            "1200,1975,1975,2,1,300,7500,1,0,0,0,800,140000,,",
        ]);
        let data = read_dataset(text.as_bytes()).unwrap();

        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_used, 2);
        assert!(data.row_errors.is_empty());

        let first = data.dataset.get(0).unwrap();
        assert_eq!(first.living_area, 1500.0);
        assert_eq!(first.year_remodeled, 2005);
        assert_eq!(first.fireplaces, 1);
        assert_eq!(first.latitude, Some(42.0));
        assert!(data.dataset.get(1).unwrap().coordinates().is_none());
        assert_eq!(data.dataset.stats().n_geocoded, 1);
    }

    #[test]
    fn accepts_ames_column_names_without_coordinates() {
        let text = "\u{feff}Gr_Liv_Area,Year_Built,YearRemodAdd,BedroomAbvGr,GarageCars,GarageArea,Lot_Area,FullBath,HalfBath,Fireplaces,PoolArea,TotalBsmtSF,SalePrice\n\
                    1710,2003,2003,3,2,548,8450,2,1,0,0,856,208500\n";
        let data = read_dataset(text.as_bytes()).unwrap();

        assert_eq!(data.rows_used, 1);
        let r = data.dataset.get(0).unwrap();
        assert_eq!(r.living_area, 1710.0);
        assert_eq!(r.basement_area, 856.0);
        assert_eq!(r.sale_price, 208_500.0);
        assert!(r.coordinates().is_none());
    }

    #[test]
    fn bad_rows_are_reported_and_skipped() {
        let text = csv(&[
            "1500,2000,2005,3,2,480,9000,2,1,1,0,1000,200000,42.0,-93.6",
            "0,2000,2005,3,2,480,9000,2,1,1,0,1000,200000,,",
            "1500,2000,1990,3,2,480,9000,2,1,1,0,1000,200000,,",
            "1500,2000,2005,-1,2,480,9000,2,1,1,0,1000,200000,,",
            "1500,2000,2005,3,NA,480,9000,2,1,1,0,1000,200000,,",
            "1500,2000,2005,2.5,2,480,9000,2,1,1,0,1000,200000,,",
        ]);
        let data = read_dataset(text.as_bytes()).unwrap();

        assert_eq!(data.rows_read, 6);
        assert_eq!(data.rows_used, 1);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
        assert!(data.row_errors[0].message.contains("living_area"));
        assert!(data.row_errors[1].message.contains("year_remodeled"));
    }

    #[test]
    fn half_present_coordinates_count_as_absent() {
        let text = csv(&["1500,2000,2005,3,2,480,9000,2,1,1,0,1000,200000,42.0,"]);
        let data = read_dataset(text.as_bytes()).unwrap();
        let r = data.dataset.get(0).unwrap();
        assert_eq!(r.latitude, None);
        assert_eq!(r.longitude, None);
    }

    #[test]
    fn missing_column_is_a_configuration_error() {
        let text = "living_area,year_built,sale_price\n1500,2000,200000\n";
        let err = read_dataset(text.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert!(err.message().contains("`bedrooms`"));
        assert!(!err.message().contains("`latitude`"));
    }

    #[test]
    fn no_usable_rows_is_a_configuration_error() {
        let header_only = csv(&[]);
        assert_eq!(read_dataset(header_only.as_bytes()).unwrap_err().exit_code(), EXIT_CONFIG);

        let all_bad = csv(&["0,2000,2005,3,2,480,9000,2,1,1,0,1000,200000,,"]);
        assert_eq!(read_dataset(all_bad.as_bytes()).unwrap_err().exit_code(), EXIT_CONFIG);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_dataset(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header_name(" Gr_Liv_Area "), "grlivarea");
        assert_eq!(normalize_header_name("\u{feff}Sale.Price"), "saleprice");
        assert_eq!(normalize_header_name("year-built"), "yearbuilt");
    }
}
