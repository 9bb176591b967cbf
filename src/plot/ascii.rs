//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Scatter elements:
//! - sales: `o`
//! - the query at its predicted price: `*`
//! - predicted-price level: `-` line
//!
//! The histogram is drawn as one horizontal bar per bucket.

use crate::report::{format_area, format_price};
use crate::views::{DistributionPayload, ScatterPayload};

/// Price vs. living area for the whole dataset, query highlighted.
pub fn render_scatter(payload: &ScatterPayload, width: usize, height: usize, currency: &str) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let ([x_min, x_max], [y_min, y_max]) = payload.bounds();
    let (x_min, x_max) = widen_if_flat(x_min, x_max);
    let (y_min, y_max) = widen_if_flat(y_min, y_max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Price level first so points overlay it.
    let level = map_y(payload.highlight.sale_price, y_min, y_max, height);
    draw_line(&mut grid, 0, level, width - 1, level, '-');

    for p in &payload.points {
        let x = map_x(p.living_area, x_min, x_max, width);
        let y = map_y(p.sale_price, y_min, y_max, height);
        grid[y][x] = 'o';
    }
    let hx = map_x(payload.highlight.living_area, x_min, x_max, width);
    grid[level][hx] = '*';

    let mut out = String::new();
    out.push_str(&format!(
        "Scatter: living area=[{}, {}] sqft | price=[{}, {}]\n",
        format_area(x_min),
        format_area(x_max),
        format_price(y_min, currency),
        format_price(y_max, currency),
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Cohort price histogram; bars are scaled so the fullest bucket spans `width`.
pub fn render_histogram(payload: &DistributionPayload, width: usize, currency: &str) -> String {
    if payload.buckets.is_empty() {
        return "Distribution: no sales within 200 sqft of the query\n".to_string();
    }

    let width = width.max(1);
    let max_count = payload.max_count().max(1);
    let marker = payload.marker_bucket();

    let mut out = String::new();
    out.push_str(&format!(
        "Distribution: cohort={} | estimate={}\n",
        payload.cohort_size,
        format_price(payload.marker, currency)
    ));
    for (i, b) in payload.buckets.iter().enumerate() {
        let len = ((b.count as f64 / max_count as f64) * width as f64).round() as usize;
        let bar = "#".repeat(len);
        let tag = if marker == Some(i) { " <- estimate" } else { "" };
        out.push_str(&format!(
            "{:>10} - {:>10} |{bar:<width$}| {}{tag}\n",
            format_price(b.lower, currency),
            format_price(b.upper, currency),
            b.count,
        ));
    }
    out
}

fn widen_if_flat(min: f64, max: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{HistogramBucket, ScatterPoint};

    fn pt(living_area: f64, sale_price: f64) -> ScatterPoint {
        ScatterPoint {
            living_area,
            sale_price,
        }
    }

    #[test]
    fn scatter_golden_snapshot_small() {
        let payload = ScatterPayload {
            points: vec![pt(1000.0, 100_000.0), pt(2000.0, 200_000.0)],
            highlight: pt(1500.0, 150_000.0),
        };

        let txt = render_scatter(&payload, 10, 5, "$");
        let expected = concat!(
            "Scatter: living area=[1,000, 2,000] sqft | price=[$95,000, $205,000]\n",
            "         o\n",
            "          \n",
            "-----*----\n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn scatter_survives_a_single_point() {
        let payload = ScatterPayload {
            points: vec![pt(1500.0, 200_000.0)],
            highlight: pt(1500.0, 200_000.0),
        };
        let txt = render_scatter(&payload, 10, 5, "$");
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.contains('*'));
    }

    #[test]
    fn histogram_golden_snapshot_small() {
        let payload = DistributionPayload {
            buckets: vec![
                HistogramBucket {
                    lower: 0.0,
                    upper: 10.0,
                    count: 1,
                },
                HistogramBucket {
                    lower: 10.0,
                    upper: 20.0,
                    count: 2,
                },
            ],
            marker: 15.0,
            cohort_size: 3,
        };

        let txt = render_histogram(&payload, 4, "$");
        let expected = concat!(
            "Distribution: cohort=3 | estimate=$15\n",
            "        $0 -        $10 |##  | 1\n",
            "       $10 -        $20 |####| 2 <- estimate\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_histogram_says_so() {
        let payload = DistributionPayload {
            buckets: Vec::new(),
            marker: 1.0,
            cohort_size: 0,
        };
        assert!(render_histogram(&payload, 20, "$").contains("no sales"));
    }
}
