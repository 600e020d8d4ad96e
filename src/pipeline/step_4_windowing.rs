// External crates
use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor};
use ndarray::{s, Array1, Array2};
use rayon::prelude::*;

// Internal modules
use crate::error::{ForecastError, Result};

/// `sequence_length` consecutive normalized predictor rows and the
/// normalized target of the row right after them
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub rows: Array2<f64>,
    pub next_target: f64,
}

impl Window {
    /// Single-sample input tensor of shape [1, sequence_length, n_features]
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3> {
        let (sequence_length, n_features) = self.rows.dim();
        let data: Vec<f32> = self.rows.iter().map(|&v| v as f32).collect();
        Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape(Shape::new([
            1,
            sequence_length,
            n_features,
        ]))
    }
}

/// All windows sliced from one feature table
#[derive(Debug, Clone)]
pub struct WindowSet {
    windows: Vec<Window>,
    sequence_length: usize,
    n_features: usize,
}

/// Slices the normalized table into overlapping windows
///
/// Window `i` holds predictor rows `[i, i + sequence_length)` and the target of
/// row `i + sequence_length`, giving `rows - sequence_length` windows.
pub fn build_windows(
    predictors: &Array2<f64>,
    target: &Array1<f64>,
    sequence_length: usize,
) -> Result<WindowSet> {
    if sequence_length == 0 {
        return Err(ForecastError::data("Window length must be at least 1"));
    }
    if predictors.nrows() != target.len() {
        return Err(ForecastError::data(format!(
            "Predictor rows ({}) and target rows ({}) differ",
            predictors.nrows(),
            target.len()
        )));
    }

    let n_rows = predictors.nrows();
    if n_rows < sequence_length + 1 {
        return Err(ForecastError::data(format!(
            "Insufficient history: {} rows available, at least {} needed for windows of {}",
            n_rows,
            sequence_length + 1,
            sequence_length
        )));
    }

    let windows = (0..n_rows - sequence_length)
        .map(|i| Window {
            rows: predictors.slice(s![i..i + sequence_length, ..]).to_owned(),
            next_target: target[i + sequence_length],
        })
        .collect();

    Ok(WindowSet {
        windows,
        sequence_length,
        n_features: predictors.ncols(),
    })
}

impl WindowSet {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn last(&self) -> Option<&Window> {
        self.windows.last()
    }

    /// Packs the windows at `indices` into a batch
    ///
    /// Returns features of shape [batch, sequence_length, n_features] and
    /// targets of shape [batch, 1].
    pub fn to_tensors<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let batch_size = indices.len();
        let window_len = self.sequence_length * self.n_features;

        let mut features_data = vec![0f32; batch_size * window_len];
        features_data
            .par_chunks_mut(window_len)
            .zip(indices.par_iter())
            .for_each(|(chunk, &idx)| {
                for (dst, &src) in chunk.iter_mut().zip(self.windows[idx].rows.iter()) {
                    *dst = src as f32;
                }
            });

        let target_data: Vec<f32> = indices
            .iter()
            .map(|&idx| self.windows[idx].next_target as f32)
            .collect();

        let features = Tensor::<B, 1>::from_floats(features_data.as_slice(), device).reshape(
            Shape::new([batch_size, self.sequence_length, self.n_features]),
        );
        let targets = Tensor::<B, 1>::from_floats(target_data.as_slice(), device)
            .reshape(Shape::new([batch_size, 1]));

        (features, targets)
    }
}
