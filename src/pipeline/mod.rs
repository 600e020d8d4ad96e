/// # Forecasting pipeline
///
/// One request runs every step in order, synchronously, with nothing cached
/// between requests:
///
/// 1. **step_1_dataset_alignment**: inner-join the material and indicator series by month
/// 2. **step_2_feature_engineering**: rolling mean, fuel-price difference, calendar columns
/// 3. **step_3_scaling**: min-max parameters for predictors and target
/// 4. **step_4_windowing**: fixed-length windows paired with next-month targets
/// 5. **step_5_lstm_layer**: LSTM layer returning full sequences
/// 6. **step_6_regressor_arch**: two stacked LSTM layers, dropout, linear head
/// 7. **step_7_train_model**: Adam training with early stopping on the training loss
/// 8. **step_8_forecast**: autoregressive roll-out with injected perturbation
///
/// The scaler and the early-stopping monitor both see the full history; there
/// is no held-out split.
pub mod step_1_dataset_alignment;
pub mod step_2_feature_engineering;
pub mod step_3_scaling;
pub mod step_4_windowing;
pub mod step_5_lstm_layer;
pub mod step_6_regressor_arch;
pub mod step_7_train_model;
pub mod step_8_forecast;

// External crates
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;
use chrono::NaiveDate;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

// Internal modules
use crate::constants::{
    BATCH_SIZE, DROPOUT_RATE, EARLY_STOPPING_PATIENCE, FIRST_LAYER_UNITS, FORECAST_ANCHOR,
    FORECAST_HORIZON, LEARNING_RATE, MAX_EPOCHS, PERTURBATION_AMPLITUDE, PREDICTOR_COLUMNS,
    SECOND_LAYER_UNITS, SEQUENCE_LENGTH,
};
use crate::error::{ForecastError, Result};
use step_1_dataset_alignment::{align_series, MacroIndicators, TimeSeries};
use step_2_feature_engineering::engineer_features;
use step_3_scaling::ScalingParameters;
use step_4_windowing::build_windows;
use step_6_regressor_arch::SequenceRegressorConfig;
use step_7_train_model::{train_regressor, TrainingBackend, TrainingConfig};
use step_8_forecast::{forecast_path, ForecastPath, RolloutSettings};

/// Every tunable of a forecast run; `Default` gives the production values
///
/// Fields missing from a serialized config fall back to those defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub sequence_length: usize,
    pub horizon: usize,
    pub first_layer_units: usize,
    pub second_layer_units: usize,
    pub dropout_rate: f64,
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub perturbation: f64,
    pub anchor: NaiveDate,
    /// Seeds shuffling, weight initialization and perturbation. `None` draws
    /// from the OS, so repeated runs differ.
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        let (year, month, day) = FORECAST_ANCHOR;
        Self {
            sequence_length: SEQUENCE_LENGTH,
            horizon: FORECAST_HORIZON,
            first_layer_units: FIRST_LAYER_UNITS,
            second_layer_units: SECOND_LAYER_UNITS,
            dropout_rate: DROPOUT_RATE,
            learning_rate: LEARNING_RATE,
            max_epochs: MAX_EPOCHS,
            batch_size: BATCH_SIZE,
            patience: EARLY_STOPPING_PATIENCE,
            perturbation: PERTURBATION_AMPLITUDE,
            anchor: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
            seed: None,
        }
    }
}

impl ForecastConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            learning_rate: self.learning_rate,
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            patience: self.patience,
            shuffle: true,
        }
    }

    pub fn model_config(&self, input_size: usize) -> SequenceRegressorConfig {
        SequenceRegressorConfig::new(
            input_size,
            self.first_layer_units,
            self.second_layer_units,
            self.dropout_rate,
        )
    }

    pub fn rollout_settings(&self, feedback_slot: usize) -> RolloutSettings {
        RolloutSettings {
            horizon: self.horizon,
            anchor: self.anchor,
            perturbation: self.perturbation,
            feedback_slot,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Clean series handed to the pipeline by a data source
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub target: TimeSeries,
    pub indicators: MacroIndicators,
}

/// Runs alignment through forecasting for one request
///
/// A new regressor is built, trained on this request's windows, used for the
/// roll-out and dropped on return.
pub fn run_pipeline(inputs: &PipelineInputs, config: &ForecastConfig) -> Result<ForecastPath> {
    if config.horizon == 0 {
        return Err(ForecastError::compute("Forecast horizon must be at least 1"));
    }

    let aligned = align_series(&inputs.target, &inputs.indicators)?;
    let features = engineer_features(&aligned)?;
    info!(
        "Feature table: {} aligned months, {} after derivation",
        aligned.height(),
        features.height()
    );

    let predictors = features.predictor_matrix()?;
    let target = features.target_vector()?;
    let scaling = ScalingParameters::fit(&predictors, &target)?;
    let windows = build_windows(
        &scaling.transform_predictors(&predictors)?,
        &scaling.transform_target(&target)?,
        config.sequence_length,
    )?;

    let mut rng = config.rng();
    if let Some(seed) = config.seed {
        TrainingBackend::seed(seed);
    }
    let device = <TrainingBackend as Backend>::Device::default();

    let (model, report) = train_regressor::<TrainingBackend>(
        &windows,
        &config.model_config(windows.n_features()),
        &config.training_config(),
        &mut rng,
        &device,
    )?;
    info!(
        "Training finished after {} epochs (best loss {:.6} at epoch {})",
        report.loss_history.len(),
        report.best_loss,
        report.best_epoch
    );

    let last_window = windows
        .last()
        .ok_or_else(|| ForecastError::data("No window to start the forecast from"))?;

    forecast_path(
        &model.valid(),
        last_window,
        &scaling,
        &config.rollout_settings(PREDICTOR_COLUMNS.len() - 1),
        &mut rng,
        &device,
    )
}
