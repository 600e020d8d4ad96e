use ndarray::{array, Array1};

use crate::error::ForecastError;
use crate::pipeline::step_3_scaling::{MinMaxScaler, ScalingParameters};
use crate::test::fixtures::random_matrix;

#[test]
fn test_transform_maps_onto_unit_interval() {
    let data = random_matrix(40, 5, 3).mapv(|v| v * 900.0 - 250.0);
    let scaler = MinMaxScaler::fit(&data).unwrap();
    let scaled = scaler.transform(&data).unwrap();

    for column in scaled.columns() {
        let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(min.abs() < 1e-12);
        assert!((max - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_round_trip_restores_fitting_sample() {
    let data = random_matrix(30, 4, 11).mapv(|v| v * 1e4 + 3.0);
    let scaler = MinMaxScaler::fit(&data).unwrap();

    let restored = scaler
        .inverse_transform(&scaler.transform(&data).unwrap())
        .unwrap();
    for (a, b) in data.iter().zip(restored.iter()) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }
}

#[test]
fn test_target_round_trip() {
    let predictors = random_matrix(6, 2, 5);
    let target: Array1<f64> = array![1520.0, 1490.5, 1610.0, 1700.25, 1655.0, 1580.0];
    let scaling = ScalingParameters::fit(&predictors, &target).unwrap();

    let normalized = scaling.transform_target(&target).unwrap();
    for (original, scaled) in target.iter().zip(normalized.iter()) {
        assert!((scaling.inverse_target(*scaled) - original).abs() < 1e-6);
    }

    let restored = scaling.inverse_target_all(&normalized).unwrap();
    for (a, b) in target.iter().zip(restored.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_constant_predictor_column_does_not_divide_by_zero() {
    let data = array![[1.0, 7.0], [2.0, 7.0], [3.0, 7.0]];
    let scaler = MinMaxScaler::fit(&data).unwrap();

    assert!(scaler.is_constant(1));
    let scaled = scaler.transform(&data).unwrap();
    assert!(scaled.column(1).iter().all(|&v| v == 0.0));

    let restored = scaler.inverse_transform(&scaled).unwrap();
    assert!(restored.column(1).iter().all(|&v| v == 7.0));
}

#[test]
fn test_constant_target_is_compute_error() {
    let predictors = random_matrix(4, 3, 1);
    let target = array![5.0, 5.0, 5.0, 5.0];

    let err = ScalingParameters::fit(&predictors, &target).unwrap_err();
    assert!(matches!(err, ForecastError::Compute(_)));
}

#[test]
fn test_width_mismatch_is_rejected() {
    let scaler = MinMaxScaler::fit(&random_matrix(5, 3, 2)).unwrap();
    assert!(scaler.transform(&random_matrix(5, 4, 2)).is_err());
}
