//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

use crate::data::Dataset;
use crate::domain::{DatasetStats, Feature};
use crate::engine::EstimationOutput;
use crate::models::RegressionModel;
use crate::views::MapPayload;

/// Currency string: rounded to whole units, `,` thousands separators.
///
/// Rounds half away from zero; negatives render as `-$1,234`.
pub fn format_price(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{}", group_thousands(rounded.abs()))
}

/// Area with thousands separators, rounded to whole square feet.
pub fn format_area(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(rounded.abs()))
}

/// `v` must already be a non-negative whole number.
fn group_thousands(v: f64) -> String {
    let digits = format!("{v:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dataset stats and fitted coefficients.
pub fn format_model_summary(stats: &DatasetStats, model: &RegressionModel, currency: &str) -> String {
    let mut out = String::new();

    out.push_str("=== comps - regression model ===\n");
    out.push_str(&format!(
        "Dataset: n={} | geocoded={} | living area=[{}, {}] sqft | price=[{}, {}]\n",
        stats.n_records,
        stats.n_geocoded,
        format_area(stats.living_area_min),
        format_area(stats.living_area_max),
        format_price(stats.price_min, currency),
        format_price(stats.price_max, currency),
    ));
    out.push_str(&format!(
        "Fit: RMSE={:.2} R2={:.4} SSE={:.3e}\n\n",
        model.quality.rmse, model.quality.r_squared, model.quality.sse
    ));

    out.push_str(&format!("{:<22} {:>14}\n", "term", "coefficient"));
    out.push_str(&format!("{:-<22} {:-<14}\n", "", ""));
    out.push_str(&format!("{:<22} {:>14.4}\n", "(intercept)", model.intercept));
    for feature in Feature::ALL {
        out.push_str(&format!("{:<22} {:>14.4}\n", feature.name(), model.coefficient(feature)));
    }

    out
}

/// One-screen summary of an estimation.
pub fn format_estimate_summary(output: &EstimationOutput) -> String {
    let mut out = String::new();
    let q = &output.result.query;

    out.push_str("=== comps - price estimate ===\n");
    out.push_str(&format!(
        "Query: {} sqft | built {} (remodeled {}) | {} bd | {} car garage | {} full / {} half baths\n",
        format_area(q.living_area),
        q.year_built,
        q.year_remodeled,
        q.bedrooms,
        q.garage_cars,
        q.full_baths,
        q.half_baths,
    ));
    out.push_str(&format!("Estimated price: {}\n", output.formatted_price));
    out.push_str(&format!(
        "Comparables: {} (same beds/garage, ±200 sqft, ±5 yrs) | cohort: {} (±200 sqft)\n",
        output.result.comparables.len(),
        output.distribution.cohort_size,
    ));

    match &output.map {
        MapPayload::Comparables { markers, highlight } => {
            out.push_str(&format!(
                "Map: {} markers centered at ({:.4}, {:.4}) | {}\n",
                markers.len(),
                highlight.position.latitude,
                highlight.position.longitude,
                highlight.label,
            ));
        }
        MapPayload::NoData { center, message } => {
            out.push_str(&format!(
                "Map: {message} (centered at {:.4}, {:.4})\n",
                center.latitude, center.longitude
            ));
        }
    }

    out
}

/// Table of the tight comparable set (first `top_n` rows).
pub fn format_comparables(output: &EstimationOutput, dataset: &Dataset, top_n: usize, currency: &str) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:>12} {:>10} {:>6} {:>6} {:>6} {:<20}\n",
            "row", "price", "area", "beds", "garage", "built", "location"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<12} {:-<10} {:-<6} {:-<6} {:-<6} {:-<20}\n", "", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for &idx in output.result.comparables.indices().iter().take(top_n) {
        let Some(r) = dataset.get(idx) else { continue };
        let location = r
            .coordinates()
            .map(|p| format!("{:.4}, {:.4}", p.latitude, p.longitude))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:>6} {:>12} {:>10} {:>6} {:>6} {:>6} {:<20}\n",
                idx,
                format_price(r.sale_price, currency),
                format_area(r.living_area),
                r.bedrooms,
                r.garage_cars,
                r.year_built,
                truncate(&location, 20),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let remaining = output.result.comparables.len().saturating_sub(top_n);
    if remaining > 0 {
        out.push_str(&format!("... and {remaining} more\n"));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
