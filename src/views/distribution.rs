//! Price distribution (histogram) payload over the loose cohort.

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::engine::EstimationResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPayload {
    /// Equal-width buckets spanning the cohort's price range (empty when the
    /// cohort is empty).
    pub buckets: Vec<HistogramBucket>,
    /// The predicted price, drawn as a marker line.
    pub marker: f64,
    pub cohort_size: usize,
}

impl DistributionPayload {
    /// Index of the bucket the marker falls into, if it lies within range.
    pub fn marker_bucket(&self) -> Option<usize> {
        let last = self.buckets.len().checked_sub(1)?;
        self.buckets
            .iter()
            .position(|b| self.marker >= b.lower && self.marker < b.upper)
            .or_else(|| (self.marker == self.buckets[last].upper).then_some(last))
    }

    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Bucket cohort sale prices into `bins` equal-width buckets.
pub fn build_distribution(result: &EstimationResult, dataset: &Dataset, bins: usize) -> DistributionPayload {
    let prices: Vec<f64> = result.cohort.records(dataset).map(|r| r.sale_price).collect();
    DistributionPayload {
        buckets: bucket_prices(&prices, bins.max(1)),
        marker: result.predicted_price,
        cohort_size: prices.len(),
    }
}

fn bucket_prices(prices: &[f64], bins: usize) -> Vec<HistogramBucket> {
    let (min, max) = prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }

    // A single distinct price gets one zero-width bucket.
    if max <= min {
        return vec![HistogramBucket {
            lower: min,
            upper: max,
            count: prices.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut buckets: Vec<HistogramBucket> = (0..bins)
        .map(|i| HistogramBucket {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &p in prices {
        let idx = (((p - min) / width).floor() as usize).min(bins - 1);
        buckets[idx].count += 1;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sum_to_the_number_of_prices() {
        let prices = [100.0, 150.0, 150.0, 199.0, 200.0, 300.0, 301.5];
        for bins in [1, 3, 7, 30] {
            let buckets = bucket_prices(&prices, bins);
            assert_eq!(buckets.len(), bins);
            assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), prices.len());
            assert_eq!(buckets[0].lower, 100.0);
            assert_eq!(buckets[bins - 1].upper, 301.5);
        }
    }

    #[test]
    fn maximum_lands_in_the_last_bucket() {
        let buckets = bucket_prices(&[0.0, 10.0], 2);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn single_price_and_empty_cohort() {
        let one = bucket_prices(&[200_000.0, 200_000.0], 30);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].count, 2);
        assert!(bucket_prices(&[], 30).is_empty());
    }

    #[test]
    fn marker_bucket_lookup() {
        let payload = DistributionPayload {
            buckets: bucket_prices(&[0.0, 10.0, 20.0], 2),
            marker: 20.0,
            cohort_size: 3,
        };
        assert_eq!(payload.marker_bucket(), Some(1));
        assert_eq!(DistributionPayload { marker: 3.0, ..payload.clone() }.marker_bucket(), Some(0));
        assert_eq!(DistributionPayload { marker: 25.0, ..payload }.marker_bucket(), None);
    }
}
