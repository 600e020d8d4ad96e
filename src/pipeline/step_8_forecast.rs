// External imports
use burn::tensor::backend::Backend;
use burn::tensor::cast::ToElement;
use chrono::{Months, NaiveDate};
use log::info;
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::Rng;

// Internal imports
use super::step_3_scaling::ScalingParameters;
use super::step_4_windowing::Window;
use super::step_6_regressor_arch::SequenceRegressor;
use crate::error::{ForecastError, Result};

/// One forecast month
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forecast months in date order, one per horizon step
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPath {
    points: Vec<ForecastPoint>,
}

impl ForecastPath {
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Settings of the autoregressive roll-out
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutSettings {
    pub horizon: usize,
    pub anchor: NaiveDate,
    pub perturbation: f64,
    /// Predictor column replaced by each step's normalized prediction
    pub feedback_slot: usize,
}

/// `count` first-of-month dates starting at `anchor`
pub fn monthly_dates(anchor: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (0..count)
        .map(|step| {
            anchor
                .checked_add_months(Months::new(step as u32))
                .ok_or_else(|| ForecastError::compute(format!("Forecast date overflow at step {}", step)))
        })
        .collect()
}

/// Next input window: drop the oldest row, append a perturbed copy of the
/// newest row whose feedback slot holds the unperturbed prediction
pub fn next_window(
    current: &Array2<f64>,
    prediction: f64,
    perturbation: f64,
    feedback_slot: usize,
    rng: &mut StdRng,
) -> Array2<f64> {
    let (sequence_length, n_features) = current.dim();

    let mut new_row: Array1<f64> = current.row(sequence_length - 1).to_owned();
    if perturbation > 0.0 {
        new_row.mapv_inplace(|v| v + rng.random_range(-perturbation..=perturbation));
    }
    new_row[feedback_slot] = prediction;

    let mut next = Array2::<f64>::zeros((sequence_length, n_features));
    next.slice_mut(s![..sequence_length - 1, ..])
        .assign(&current.slice(s![1.., ..]));
    next.row_mut(sequence_length - 1).assign(&new_row);
    next
}

/// Rolls the trained regressor forward `settings.horizon` months
///
/// # Arguments
///
/// * `model` - Trained regressor, used in inference mode
/// * `last_window` - Final training window, the seed of the roll-out
/// * `scaling` - Parameters used to map predictions back to prices
/// * `settings` - Horizon, date anchor, noise amplitude and feedback slot
/// * `rng` - Source of the per-step perturbation
/// * `device` - Device the model lives on
///
/// # Returns
///
/// Returns a `ForecastPath` with exactly `horizon` points, or an error if any
/// step fails. No partial path is returned.
pub fn forecast_path<B: Backend>(
    model: &SequenceRegressor<B>,
    last_window: &Window,
    scaling: &ScalingParameters,
    settings: &RolloutSettings,
    rng: &mut StdRng,
    device: &B::Device,
) -> Result<ForecastPath> {
    let (sequence_length, n_features) = last_window.rows.dim();
    if sequence_length == 0 {
        return Err(ForecastError::compute("Seed window is empty"));
    }
    if settings.feedback_slot >= n_features {
        return Err(ForecastError::compute(format!(
            "Feedback slot {} is outside the {} predictor columns",
            settings.feedback_slot, n_features
        )));
    }

    let dates = monthly_dates(settings.anchor, settings.horizon)?;
    let mut current = Window {
        rows: last_window.rows.clone(),
        next_target: last_window.next_target,
    };
    let mut points = Vec::with_capacity(settings.horizon);

    for (step, date) in dates.into_iter().enumerate() {
        let prediction = model
            .predict(current.to_tensor::<B>(device))
            .into_scalar()
            .to_f64();
        if !prediction.is_finite() {
            return Err(ForecastError::compute(format!(
                "Model produced a non-finite prediction at step {}",
                step
            )));
        }

        points.push(ForecastPoint {
            date,
            value: scaling.inverse_target(prediction),
        });

        current.rows = next_window(
            &current.rows,
            prediction,
            settings.perturbation,
            settings.feedback_slot,
            rng,
        );
        current.next_target = prediction;
    }

    info!(
        "Forecast {} months starting {}",
        points.len(),
        settings.anchor
    );

    Ok(ForecastPath { points })
}
