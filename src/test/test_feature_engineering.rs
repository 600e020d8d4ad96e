use crate::constants::{PREDICTOR_COLUMNS, QUARTER_COLUMN};
use crate::error::ForecastError;
use crate::pipeline::step_1_dataset_alignment::align_series;
use crate::pipeline::step_2_feature_engineering::engineer_features;
use crate::test::fixtures::{month, monthly_series, synthetic_indicators};

#[test]
fn test_leading_rows_without_lookback_are_dropped() {
    let start = month(2020, 11);
    let target = monthly_series(start, 10, |i| 200.0 + i as f64);
    let aligned = align_series(&target, &synthetic_indicators(start, 10)).unwrap();

    let features = engineer_features(&aligned).unwrap();

    assert_eq!(features.height(), 8);
    assert_eq!(features.dates().unwrap()[0], month(2021, 1));
}

#[test]
fn test_derived_values() {
    let start = month(2020, 11);
    let indicators = synthetic_indicators(start, 10);
    let target = monthly_series(start, 10, |i| 200.0 + i as f64);
    let aligned = align_series(&target, &indicators).unwrap();

    let features = engineer_features(&aligned).unwrap();
    let predictors = features.predictor_matrix().unwrap();
    let cpi: Vec<f64> = indicators.price_index.points().iter().map(|p| p.1).collect();
    let fuel: Vec<f64> = indicators.fuel_price.points().iter().map(|p| p.1).collect();

    // First kept row is the third aligned month (2021-01)
    let expected_mean = (cpi[0] + cpi[1] + cpi[2]) / 3.0;
    assert!((predictors[[0, 4]] - expected_mean).abs() < 1e-9);
    assert!((predictors[[0, 5]] - (fuel[2] - fuel[1])).abs() < 1e-9);
    assert_eq!(predictors[[0, 6]], 1.0);
    assert_eq!(predictors[[0, 7]], 1.0);

    // 2021-05 is row 4: month 5, quarter 2
    assert_eq!(predictors[[4, 6]], 5.0);
    assert_eq!(predictors[[4, 7]], 2.0);
}

#[test]
fn test_target_is_not_a_predictor() {
    let start = month(2019, 1);
    let target = monthly_series(start, 12, |i| 50.0 * i as f64);
    let aligned = align_series(&target, &synthetic_indicators(start, 12)).unwrap();
    let features = engineer_features(&aligned).unwrap();

    let predictors = features.predictor_matrix().unwrap();
    let target = features.target_vector().unwrap();

    assert_eq!(predictors.ncols(), PREDICTOR_COLUMNS.len());
    assert_eq!(PREDICTOR_COLUMNS.last(), Some(&QUARTER_COLUMN));
    assert_eq!(target.len(), predictors.nrows());
    assert_eq!(target[0], 100.0);
}

#[test]
fn test_too_few_rows_is_data_error() {
    let start = month(2019, 1);
    let target = monthly_series(start, 2, |i| i as f64);
    let aligned = align_series(&target, &synthetic_indicators(start, 2)).unwrap();

    let err = engineer_features(&aligned).unwrap_err();
    assert!(matches!(err, ForecastError::Data(_)));
}
