//! The estimation state machine.
//!
//! An `Estimator` owns one session: a shared, immutable `(Dataset, Model)`
//! pair plus the latest output. Each `estimate` call runs the whole pipeline
//! synchronously:
//!
//! validate -> predict -> tight comparables -> loose cohort -> payloads -> `Ready`
//!
//! A validation failure returns before anything is computed and leaves the
//! previous state in place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::Dataset;
use crate::domain::{AMES_CENTROID, GeoPoint, HighlightPricing, QueryFeatures};
use crate::engine::validate::{QueryInput, check_features, parse_query};
use crate::error::EngineError;
use crate::models::RegressionModel;
use crate::report::format_price;
use crate::select::{ComparableSet, select_comparables, select_distribution_cohort};
use crate::views::{
    DistributionPayload, MapPayload, ScatterPayload, build_distribution, build_map, build_scatter,
};

pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
pub const DEFAULT_NO_DATA_MESSAGE: &str = "No similar houses found";

/// Presentation knobs for the view payloads. None of them affect the
/// predicted price or either similarity predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub histogram_bins: usize,
    pub fallback_center: GeoPoint,
    pub no_data_message: String,
    pub highlight_pricing: HighlightPricing,
    pub currency_symbol: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            fallback_center: AMES_CENTROID,
            no_data_message: DEFAULT_NO_DATA_MESSAGE.to_string(),
            highlight_pricing: HighlightPricing::default(),
            currency_symbol: "$".to_string(),
        }
    }
}

/// The dataset and the model fitted on it. Built once, then only read.
#[derive(Debug, Clone)]
pub struct EstimationContext {
    dataset: Dataset,
    model: RegressionModel,
}

impl EstimationContext {
    /// Fit the model on `dataset`. Any failure here is fatal for startup.
    pub fn initialize(dataset: Dataset) -> Result<Self, EngineError> {
        let model = RegressionModel::fit(&dataset)?;
        info!(
            records = dataset.len(),
            rmse = model.quality.rmse,
            r_squared = model.quality.r_squared,
            "estimation context ready"
        );
        Ok(Self { dataset, model })
    }

    pub fn from_parts(dataset: Dataset, model: RegressionModel) -> Self {
        Self { dataset, model }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn model(&self) -> &RegressionModel {
        &self.model
    }
}

/// Core numbers of one estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub predicted_price: f64,
    pub query: QueryFeatures,
    /// Tight predicate; feeds the map and comparables table.
    pub comparables: ComparableSet,
    /// Loose (living-area only) predicate; feeds the histogram.
    pub cohort: ComparableSet,
}

/// Everything a renderer needs after one trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationOutput {
    pub result: EstimationResult,
    pub formatted_price: String,
    pub distribution: DistributionPayload,
    pub scatter: ScatterPayload,
    pub map: MapPayload,
}

/// Where a session stands, borrowed from its [`Estimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineState<'a> {
    /// No estimate yet; views render blank.
    Idle,
    Ready(&'a EstimationOutput),
}

/// One estimation session over a shared context.
#[derive(Debug, Clone)]
pub struct Estimator {
    context: Arc<EstimationContext>,
    settings: EngineSettings,
    latest: Option<Box<EstimationOutput>>,
}

impl Estimator {
    pub fn new(context: Arc<EstimationContext>, settings: EngineSettings) -> Self {
        Self {
            context,
            settings,
            latest: None,
        }
    }

    pub fn state(&self) -> EngineState<'_> {
        match self.latest() {
            None => EngineState::Idle,
            Some(output) => EngineState::Ready(output),
        }
    }

    pub fn latest(&self) -> Option<&EstimationOutput> {
        self.latest.as_deref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn context(&self) -> &Arc<EstimationContext> {
        &self.context
    }

    /// Validate raw input and run the pipeline.
    pub fn estimate(&mut self, input: &QueryInput) -> Result<&EstimationOutput, EngineError> {
        let query = parse_query(input)?;
        Ok(self.commit(query))
    }

    /// Same as [`Estimator::estimate`] for callers that already hold typed features.
    pub fn estimate_features(&mut self, query: QueryFeatures) -> Result<&EstimationOutput, EngineError> {
        check_features(&query)?;
        Ok(self.commit(query))
    }

    fn commit(&mut self, query: QueryFeatures) -> &EstimationOutput {
        debug!(?query, "estimating");
        let output = run_estimate(&self.context, &self.settings, query);
        &**self.latest.insert(Box::new(output))
    }
}

/// The pipeline itself, on already-validated features. Pure: reads the
/// context, allocates the output, touches nothing else.
pub fn run_estimate(context: &EstimationContext, settings: &EngineSettings, query: QueryFeatures) -> EstimationOutput {
    let dataset = context.dataset();
    let model = context.model();

    let predicted_price = model.predict(&query);
    debug!(predicted_price, "scored query");

    let comparables = select_comparables(dataset, &query);
    let cohort = select_distribution_cohort(dataset, &query);
    debug!(comparables = comparables.len(), cohort = cohort.len(), "selected similar sales");

    let result = EstimationResult {
        predicted_price,
        query,
        comparables,
        cohort,
    };

    let distribution = build_distribution(&result, dataset, settings.histogram_bins);
    let scatter = build_scatter(&result, dataset);
    let map = build_map(&result, dataset, model, settings);
    let formatted_price = format_price(predicted_price, &settings.currency_symbol);

    EstimationOutput {
        result,
        formatted_price,
        distribution,
        scatter,
        map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::fixtures::{geocoded, house};
    use crate::domain::{Feature, HouseRecord};
    use crate::models::FitQuality;

    fn input_for(r: &HouseRecord) -> QueryInput {
        QueryInput::from_features(&r.features())
    }

    fn estimator(records: Vec<HouseRecord>) -> Estimator {
        estimator_with(records, EngineSettings::default())
    }

    fn estimator_with(records: Vec<HouseRecord>, settings: EngineSettings) -> Estimator {
        let dataset = Dataset::new(records).unwrap();
        let context = EstimationContext::initialize(dataset).unwrap();
        Estimator::new(Arc::new(context), settings)
    }

    /// A hand-set model so prices are easy to reason about:
    /// price = 100 * living_area + 10_000 * fireplaces.
    fn fixed_context(records: Vec<HouseRecord>) -> EstimationContext {
        let mut coefficients = [0.0; Feature::COUNT];
        coefficients[Feature::LivingArea as usize] = 100.0;
        coefficients[Feature::Fireplaces as usize] = 10_000.0;
        let model = RegressionModel {
            intercept: 0.0,
            coefficients,
            quality: FitQuality {
                sse: 0.0,
                rmse: 0.0,
                r_squared: 1.0,
                n: records.len(),
            },
        };
        EstimationContext::from_parts(Dataset::new(records).unwrap(), model)
    }

    fn neighborhood() -> Vec<HouseRecord> {
        vec![
            geocoded(house(1500.0, 2000, 3, 2, 200_000.0), 42.00, -93.60),
            geocoded(house(1600.0, 2003, 3, 2, 215_000.0), 42.02, -93.62),
            geocoded(house(1650.0, 1990, 3, 2, 180_000.0), 42.04, -93.64),
            geocoded(house(2400.0, 2010, 4, 3, 350_000.0), 42.06, -93.66),
            geocoded(house(1100.0, 1960, 2, 1, 120_000.0), 42.08, -93.68),
        ]
    }

    #[test]
    fn starts_idle() {
        let est = estimator(neighborhood());
        assert_eq!(est.state(), EngineState::Idle);
        assert!(est.latest().is_none());
    }

    #[test]
    fn estimate_moves_to_ready_with_the_returned_output() {
        let mut est = estimator(neighborhood());
        let out = est.estimate(&input_for(&neighborhood()[0])).unwrap().clone();
        assert_eq!(est.state(), EngineState::Ready(&out));
        assert_eq!(est.latest(), Some(&out));
    }

    #[test]
    fn validation_failure_leaves_idle_state_untouched() {
        let mut est = estimator(neighborhood());
        let mut input = input_for(&neighborhood()[0]);
        input.remove("garage_area");

        let err = est.estimate(&input).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(est.state(), EngineState::Idle);
    }

    #[test]
    fn validation_failure_keeps_previous_result() {
        let mut est = estimator(neighborhood());
        let before = est.estimate(&input_for(&neighborhood()[1])).unwrap().clone();

        let bad = input_for(&neighborhood()[1]).with("living_area", "lots");
        assert!(est.estimate(&bad).is_err());
        assert_eq!(est.latest(), Some(&before));

        let mut typed = neighborhood()[1].features();
        typed.lot_area = -1.0;
        assert!(est.estimate_features(typed).is_err());
        assert_eq!(est.latest(), Some(&before));
    }

    #[test]
    fn estimate_is_idempotent() {
        let mut est = estimator(neighborhood());
        let input = input_for(&neighborhood()[2]);
        let first = est.estimate(&input).unwrap().clone();
        let second = est.estimate(&input).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(
            first.result.predicted_price.to_bits(),
            second.result.predicted_price.to_bits()
        );
    }

    #[test]
    fn single_record_scenario() {
        let record = geocoded(house(1500.0, 2000, 3, 2, 200_000.0), 42.0, -93.6);
        let mut est = estimator(vec![record.clone()]);
        let out = est.estimate(&input_for(&record)).unwrap();

        assert_eq!(out.result.comparables.indices(), &[0]);
        match &out.map {
            MapPayload::Comparables { markers, highlight } => {
                assert_eq!(markers.len(), 1);
                assert_eq!(markers[0].position, GeoPoint::new(42.0, -93.6));
                assert_eq!(highlight.position, GeoPoint::new(42.0, -93.6));
            }
            other => panic!("expected comparables map, got {other:?}"),
        }
        assert!((out.result.predicted_price - 200_000.0).abs() < 1e-6);
        assert_eq!(out.formatted_price, "$200,000");
    }

    #[test]
    fn unmatched_bedrooms_fall_back_but_other_views_render() {
        let mut est = estimator(neighborhood());
        let input = input_for(&neighborhood()[0]).with("bedrooms", "99");
        let out = est.estimate(&input).unwrap();

        assert!(out.result.comparables.is_empty());
        assert_eq!(
            out.map,
            MapPayload::NoData {
                center: AMES_CENTROID,
                message: DEFAULT_NO_DATA_MESSAGE.to_string(),
            }
        );
        // Loose cohort ignores bedrooms: 1500, 1600 and 1650 are all within 200 sqft.
        assert_eq!(out.distribution.cohort_size, 3);
        assert_eq!(out.scatter.points.len(), 5);
    }

    #[test]
    fn fallback_when_any_comparable_lacks_coordinates() {
        let mut records = neighborhood();
        records[1].longitude = None;
        let mut est = estimator(records.clone());
        let out = est.estimate(&input_for(&records[0])).unwrap();

        assert_eq!(out.result.comparables.len(), 2);
        assert!(out.map.is_fallback());
    }

    #[test]
    fn fully_geocoded_set_centers_highlight_on_mean() {
        let mut est = estimator(neighborhood());
        let out = est.estimate(&input_for(&neighborhood()[0])).unwrap();

        assert_eq!(out.result.comparables.indices(), &[0, 1]);
        let MapPayload::Comparables { markers, highlight } = &out.map else {
            panic!("expected comparables map");
        };
        assert_eq!(markers.len(), 2);
        assert!((highlight.position.latitude - 42.01).abs() < 1e-12);
        assert!((highlight.position.longitude + 93.61).abs() < 1e-12);
        assert_eq!(markers[0].label, "$200,000 | 1,500 sqft | 3 bd | built 2000");
    }

    #[test]
    fn has_fireplace_false_scores_zero_fireplaces() {
        let context = Arc::new(fixed_context(neighborhood()));
        let mut est = Estimator::new(context, EngineSettings::default());
        let base = input_for(&neighborhood()[0]);

        let without = est.estimate(&base.clone().with("has_fireplace", "false")).unwrap().clone();
        assert_eq!(without.result.query.fireplaces, 0);
        assert_eq!(without.result.predicted_price, 150_000.0);

        let with = est.estimate(&base.with("has_fireplace", "yes")).unwrap();
        assert_eq!(with.result.query.fireplaces, 1);
        assert_eq!(with.result.predicted_price, 160_000.0);
    }

    #[test]
    fn highlight_price_defaults_to_query() {
        let context = Arc::new(fixed_context(neighborhood()));
        let mut est = Estimator::new(context, EngineSettings::default());
        // 1550 sqft: comparables are rows 0 (1500) and 1 (1600).
        let input = input_for(&neighborhood()[0]).with("living_area", "1550");
        let out = est.estimate(&input).unwrap();

        let MapPayload::Comparables { highlight, .. } = &out.map else {
            panic!("expected comparables map");
        };
        assert_eq!(highlight.price, 155_000.0);
        assert_eq!(highlight.price, out.result.predicted_price);
        assert_eq!(highlight.label, "Estimated: $155,000");
    }

    #[test]
    fn highlight_price_first_comparable_parity() {
        let context = Arc::new(fixed_context(neighborhood()));
        let settings = EngineSettings {
            highlight_pricing: HighlightPricing::FirstComparable,
            ..EngineSettings::default()
        };
        let mut est = Estimator::new(context, settings);
        let input = input_for(&neighborhood()[0]).with("living_area", "1550");
        let out = est.estimate(&input).unwrap();

        let MapPayload::Comparables { highlight, .. } = &out.map else {
            panic!("expected comparables map");
        };
        // Re-scored on row 0 (1500 sqft), not the 1550 sqft query.
        assert_eq!(highlight.price, 150_000.0);
        assert_eq!(out.result.predicted_price, 155_000.0);
        assert_eq!(out.formatted_price, "$155,000");
    }

    #[test]
    fn histogram_counts_sum_to_cohort_size() {
        let mut est = estimator_with(
            neighborhood(),
            EngineSettings {
                histogram_bins: 4,
                ..EngineSettings::default()
            },
        );
        let out = est.estimate(&input_for(&neighborhood()[1])).unwrap();

        let total: usize = out.distribution.buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, out.result.cohort.len());
        assert_eq!(out.distribution.cohort_size, out.result.cohort.len());
        assert_eq!(out.distribution.buckets.len(), 4);
        assert_eq!(out.distribution.marker, out.result.predicted_price);
    }

    #[test]
    fn scatter_covers_dataset_and_highlights_query() {
        let mut est = estimator(neighborhood());
        let out = est.estimate(&input_for(&neighborhood()[3])).unwrap();

        assert_eq!(out.scatter.points.len(), neighborhood().len());
        assert_eq!(out.scatter.highlight.living_area, 2400.0);
        assert_eq!(out.scatter.highlight.sale_price, out.result.predicted_price);
    }

    #[test]
    fn custom_fallback_settings_are_used() {
        let settings = EngineSettings {
            fallback_center: GeoPoint::new(1.0, 2.0),
            no_data_message: "nothing nearby".to_string(),
            currency_symbol: "€".to_string(),
            ..EngineSettings::default()
        };
        let mut est = estimator_with(vec![house(1500.0, 2000, 3, 2, 200_000.0)], settings);
        let out = est.estimate(&input_for(&house(1500.0, 2000, 3, 2, 0.0))).unwrap();

        assert_eq!(
            out.map,
            MapPayload::NoData {
                center: GeoPoint::new(1.0, 2.0),
                message: "nothing nearby".to_string(),
            }
        );
        assert!(out.formatted_price.starts_with('€'));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logs_at(level: tracing::Level, est: &mut Estimator, query: QueryFeatures) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            est.estimate_features(query).unwrap();
        });
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn map_fallback_is_not_a_warning() {
        let mut est = estimator(neighborhood());
        let mut query = neighborhood()[0].features();
        query.bedrooms = 99;

        assert_eq!(logs_at(tracing::Level::WARN, &mut est, query), "");
        assert!(est.latest().unwrap().map.is_fallback());
        assert!(logs_at(tracing::Level::DEBUG, &mut est, query).contains("fallback map marker"));
    }
}
