// External imports
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::cast::ToElement;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

// Internal imports
use super::step_4_windowing::WindowSet;
use super::step_6_regressor_arch::{SequenceRegressor, SequenceRegressorConfig};
use crate::constants::{BATCH_SIZE, EARLY_STOPPING_PATIENCE, LEARNING_RATE, MAX_EPOCHS};
use crate::error::{ForecastError, Result};

/// Backend used to train a regressor for one request
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Configuration for training the model
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub max_epochs: usize,
    pub patience: usize, // Epochs without training-loss improvement before stopping
    pub shuffle: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: LEARNING_RATE,
            batch_size: BATCH_SIZE,
            max_epochs: MAX_EPOCHS,
            patience: EARLY_STOPPING_PATIENCE,
            shuffle: true,
        }
    }
}

/// What happened during one training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub loss_history: Vec<f64>,
    pub best_epoch: usize,
    pub best_loss: f64,
    pub stopped_early: bool,
}

/// Patience-based stopping rule that remembers the best model seen so far
///
/// An epoch improves on the best only when its loss is strictly lower.
#[derive(Debug, Clone)]
pub struct EarlyStopping<M> {
    patience: usize,
    best: Option<M>,
    best_loss: f64,
    best_epoch: usize,
    epochs_no_improve: usize,
}

impl<M: Clone> EarlyStopping<M> {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best: None,
            best_loss: f64::INFINITY,
            best_epoch: 0,
            epochs_no_improve: 0,
        }
    }

    /// Records the loss of `epoch` and the model that finished it
    ///
    /// Returns `true` once `patience` consecutive epochs failed to improve.
    pub fn update(&mut self, epoch: usize, loss: f64, model: &M) -> bool {
        if loss < self.best_loss {
            self.best_loss = loss;
            self.best_epoch = epoch;
            self.best = Some(model.clone());
            self.epochs_no_improve = 0;
            false
        } else {
            self.epochs_no_improve += 1;
            self.epochs_no_improve >= self.patience
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    pub fn into_best(self) -> Option<M> {
        self.best
    }
}

/// Trains a new regressor on every window of `windows`
///
/// Minimizes the mean-squared error with Adam at a fixed learning rate. The
/// monitored quantity is the training loss itself: once it has not improved
/// for `patience` epochs the loop stops, and the weights of the best epoch
/// are returned in every case.
///
/// Best weights are also restored when the epoch cap ends training before
/// patience runs out.
///
/// # Arguments
///
/// * `windows` - Training windows and their next-step targets
/// * `model_config` - Layer sizes and dropout of the regressor
/// * `config` - Optimizer and early-stopping settings
/// * `rng` - Source for per-epoch batch shuffling
/// * `device` - Device to train on
///
/// # Returns
///
/// Returns the best model together with a `TrainingReport`
pub fn train_regressor<B: AutodiffBackend>(
    windows: &WindowSet,
    model_config: &SequenceRegressorConfig,
    config: &TrainingConfig,
    rng: &mut StdRng,
    device: &B::Device,
) -> Result<(SequenceRegressor<B>, TrainingReport)> {
    if windows.is_empty() {
        return Err(ForecastError::data("No training windows available"));
    }
    if config.batch_size == 0 || config.max_epochs == 0 {
        return Err(ForecastError::compute(
            "Batch size and epoch cap must both be at least 1",
        ));
    }
    if model_config.input_size != windows.n_features() {
        return Err(ForecastError::compute(format!(
            "Model expects {} features but windows carry {}",
            model_config.input_size,
            windows.n_features()
        )));
    }

    info!(
        "Training regressor on {} windows of {}x{} (max {} epochs, batch {})",
        windows.len(),
        windows.sequence_length(),
        windows.n_features(),
        config.max_epochs,
        config.batch_size
    );

    let mut model: SequenceRegressor<B> = model_config.init(device);
    let mut optimizer = AdamConfig::new().init::<B, SequenceRegressor<B>>();
    let loss_fn = MseLoss::new();

    let mut order: Vec<usize> = (0..windows.len()).collect();
    let mut stopping = EarlyStopping::new(config.patience);
    let mut stopped_early = false;
    let mut loss_history = Vec::with_capacity(config.max_epochs);

    for epoch in 1..=config.max_epochs {
        if config.shuffle {
            order.shuffle(rng);
        }

        let mut epoch_loss = 0.0;
        for batch in order.chunks(config.batch_size) {
            let (features, targets) = windows.to_tensors::<B>(batch, device);
            let predictions = model.forward(features, true);
            let loss = loss_fn.forward(predictions, targets, Reduction::Mean);

            let batch_loss = loss.clone().into_scalar().to_f64();
            if !batch_loss.is_finite() {
                return Err(ForecastError::compute(format!(
                    "Training diverged: non-finite loss at epoch {}",
                    epoch
                )));
            }
            epoch_loss += batch_loss * batch.len() as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        let epoch_loss = epoch_loss / windows.len() as f64;
        loss_history.push(epoch_loss);
        debug!("Epoch {}: loss {:.6}", epoch, epoch_loss);

        if stopping.update(epoch, epoch_loss, &model) {
            info!(
                "Early stopping at epoch {} (best loss {:.6} at epoch {})",
                epoch,
                stopping.best_loss(),
                stopping.best_epoch()
            );
            stopped_early = true;
            break;
        }
    }

    let best_loss = stopping.best_loss();
    let best_epoch = stopping.best_epoch();
    let best_model = stopping
        .into_best()
        .ok_or_else(|| ForecastError::compute("Training finished without a completed epoch"))?;

    Ok((
        best_model,
        TrainingReport {
            loss_history,
            best_epoch,
            best_loss,
            stopped_early,
        },
    ))
}
