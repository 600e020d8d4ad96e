// External imports
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::tensor::{backend::Backend, Tensor};

// Internal imports
use super::step_5_lstm_layer::LstmLayer;

/// Two stacked LSTM layers with dropout, ending in one linear unit
#[derive(Module, Debug)]
pub struct SequenceRegressor<B: Backend> {
    second_units: usize,

    first_lstm: LstmLayer<B>,
    first_dropout: Dropout,
    second_lstm: LstmLayer<B>,
    second_dropout: Dropout,
    output_layer: Linear<B>,
}

impl<B: Backend> SequenceRegressor<B> {
    pub fn new(
        input_size: usize,
        first_units: usize,
        second_units: usize,
        dropout_rate: f64,
        device: &B::Device,
    ) -> Self {
        Self {
            second_units,
            first_lstm: LstmLayer::new(input_size, first_units, device),
            first_dropout: DropoutConfig::new(dropout_rate).init(),
            second_lstm: LstmLayer::new(first_units, second_units, device),
            second_dropout: DropoutConfig::new(dropout_rate).init(),
            output_layer: LinearConfig::new(second_units, 1).init(device),
        }
    }

    /// Forward pass through the model
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch_size, sequence_length, input_size]
    /// * `is_training` - Whether dropout is applied
    ///
    /// # Returns
    ///
    /// Returns the normalized next-step predictions of shape [batch_size, 1]
    pub fn forward(&self, x: Tensor<B, 3>, is_training: bool) -> Tensor<B, 2> {
        let [batch_size, sequence_length, _] = x.dims();

        // First layer keeps the whole sequence for the second one
        let sequence = self.first_lstm.forward(x);
        let sequence = if is_training {
            self.first_dropout.forward(sequence)
        } else {
            sequence
        };

        let last = self
            .second_lstm
            .forward(sequence)
            .narrow(1, sequence_length - 1, 1)
            .reshape([batch_size, self.second_units]);
        let last = if is_training {
            self.second_dropout.forward(last)
        } else {
            last
        };

        self.output_layer.forward(last)
    }

    pub fn predict(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        self.forward(x, false)
    }
}

/// Configuration for the SequenceRegressor
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceRegressorConfig {
    pub input_size: usize,
    pub first_units: usize,
    pub second_units: usize,
    pub dropout_rate: f64,
}

impl SequenceRegressorConfig {
    pub fn new(input_size: usize, first_units: usize, second_units: usize, dropout_rate: f64) -> Self {
        Self {
            input_size,
            first_units,
            second_units,
            dropout_rate,
        }
    }

    /// Initialize a freshly randomized model from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceRegressor<B> {
        SequenceRegressor::new(
            self.input_size,
            self.first_units,
            self.second_units,
            self.dropout_rate,
            device,
        )
    }
}
