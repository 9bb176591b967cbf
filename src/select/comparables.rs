//! Comparable-property selection.
//!
//! Two deliberately separate similarity definitions:
//!
//! - **comparables** (tight): living area within 200 sqft, year built within
//!   5 years, same bedroom count and same garage capacity. Feeds the map.
//! - **distribution cohort** (loose): living area within 200 sqft only. Feeds
//!   the price histogram, where broader spread is the point.
//!
//! Both windows are inclusive. An empty selection is a normal outcome.

use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::domain::{HouseRecord, QueryFeatures};

/// Living-area window (sqft) for the tight comparable set.
pub const COMPARABLE_LIVING_AREA_TOLERANCE: f64 = 200.0;

/// Year-built window (years) for the tight comparable set.
pub const COMPARABLE_YEAR_TOLERANCE: i32 = 5;

/// Living-area window (sqft) for the loose distribution cohort.
pub const COHORT_LIVING_AREA_TOLERANCE: f64 = 200.0;

/// Dataset rows selected for one query, stored as record indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparableSet {
    indices: Vec<usize>,
}

impl ComparableSet {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.indices.contains(&idx)
    }

    /// Resolve the selected records against the dataset they came from.
    pub fn records<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a HouseRecord> + 'a {
        self.indices.iter().filter_map(move |&i| dataset.get(i))
    }

    pub fn first<'a>(&self, dataset: &'a Dataset) -> Option<&'a HouseRecord> {
        self.indices.first().and_then(|&i| dataset.get(i))
    }
}

/// Tight predicate: all four conditions must hold.
pub fn is_comparable(record: &HouseRecord, query: &QueryFeatures) -> bool {
    living_area_close(record, query)
        && year_built_close(record, query)
        && same_bedrooms(record, query)
        && same_garage_cars(record, query)
}

/// Loose predicate: living-area proximity only.
pub fn in_distribution_cohort(record: &HouseRecord, query: &QueryFeatures) -> bool {
    (record.living_area - query.living_area).abs() <= COHORT_LIVING_AREA_TOLERANCE
}

/// Select the tight comparable set for the map and detail views.
pub fn select_comparables(dataset: &Dataset, query: &QueryFeatures) -> ComparableSet {
    select_where(dataset, |r| is_comparable(r, query))
}

/// Select the loose cohort for the price distribution view.
pub fn select_distribution_cohort(dataset: &Dataset, query: &QueryFeatures) -> ComparableSet {
    select_where(dataset, |r| in_distribution_cohort(r, query))
}

fn select_where(dataset: &Dataset, keep: impl Fn(&HouseRecord) -> bool) -> ComparableSet {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| keep(r))
        .map(|(i, _)| i)
        .collect();
    ComparableSet { indices }
}

fn living_area_close(record: &HouseRecord, query: &QueryFeatures) -> bool {
    (record.living_area - query.living_area).abs() <= COMPARABLE_LIVING_AREA_TOLERANCE
}

fn year_built_close(record: &HouseRecord, query: &QueryFeatures) -> bool {
    (i64::from(record.year_built) - i64::from(query.year_built)).abs() <= i64::from(COMPARABLE_YEAR_TOLERANCE)
}

fn same_bedrooms(record: &HouseRecord, query: &QueryFeatures) -> bool {
    record.bedrooms == query.bedrooms
}

fn same_garage_cars(record: &HouseRecord, query: &QueryFeatures) -> bool {
    record.garage_cars == query.garage_cars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::fixtures::house;
    use crate::data::{SampleConfig, generate_sample};

    type Predicate = fn(&HouseRecord, &QueryFeatures) -> bool;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            house(1500.0, 2000, 3, 2, 200_000.0), // exact
            house(1700.0, 2005, 3, 2, 220_000.0), // both windows at the edge
            house(1701.0, 2000, 3, 2, 221_000.0), // area just outside
            house(1500.0, 2006, 3, 2, 205_000.0), // year just outside
            house(1500.0, 2000, 4, 2, 210_000.0), // bedrooms differ
            house(1500.0, 2000, 3, 1, 190_000.0), // garage differs
        ])
        .unwrap()
    }

    fn query() -> QueryFeatures {
        house(1500.0, 2000, 3, 2, 0.0).features()
    }

    #[test]
    fn tight_set_applies_all_four_conditions_inclusively() {
        let set = select_comparables(&dataset(), &query());
        assert_eq!(set.indices(), &[0, 1]);
    }

    #[test]
    fn cohort_only_checks_living_area() {
        let set = select_distribution_cohort(&dataset(), &query());
        assert_eq!(set.indices(), &[0, 1, 3, 4, 5]);
    }

    #[test]
    fn exact_match_includes_itself() {
        let ds = Dataset::new(generate_sample(&SampleConfig { count: 80, ..SampleConfig::default() }).unwrap()).unwrap();
        for (i, r) in ds.records().iter().enumerate() {
            assert!(select_comparables(&ds, &r.features()).contains(i));
            assert!(select_distribution_cohort(&ds, &r.features()).contains(i));
        }
    }

    #[test]
    fn predicate_order_does_not_change_the_result() {
        let ds = Dataset::new(generate_sample(&SampleConfig { count: 200, ..SampleConfig::default() }).unwrap()).unwrap();
        let q = ds.records()[0].features();
        let expected = select_comparables(&ds, &q);

        let preds: [Predicate; 4] = [living_area_close, year_built_close, same_bedrooms, same_garage_cars];
        for perm in permutations(4) {
            let indices: Vec<usize> = ds
                .records()
                .iter()
                .enumerate()
                .filter(|(_, r)| perm.iter().all(|&p| preds[p](r, &q)))
                .map(|(i, _)| i)
                .collect();
            assert_eq!(indices, expected.indices(), "order {perm:?}");
        }
    }

    #[test]
    fn unmatched_bedrooms_yield_an_empty_set() {
        let mut q = query();
        q.bedrooms = 99;
        let set = select_comparables(&dataset(), &q);
        assert!(set.is_empty());
        assert!(set.first(&dataset()).is_none());
        assert_eq!(select_distribution_cohort(&dataset(), &q).len(), 5);
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for perm in permutations(n - 1) {
            for pos in 0..=perm.len() {
                let mut p = perm.clone();
                p.insert(pos, n - 1);
                out.push(p);
            }
        }
        out
    }
}
