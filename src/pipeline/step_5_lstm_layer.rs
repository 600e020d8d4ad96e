// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{activation, backend::Backend, Tensor};

/// Single LSTM layer that returns its hidden state at every time step
///
/// The four gates share one input projection and one recurrent projection of
/// width `4 * hidden_size`, split in input/forget/cell/output order.
#[derive(Module, Debug)]
pub struct LstmLayer<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    input_projection: Linear<B>,
    recurrent_projection: Linear<B>,
}

impl<B: Backend> LstmLayer<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let input_projection = LinearConfig::new(input_size, 4 * hidden_size).init(device);
        let recurrent_projection = LinearConfig::new(hidden_size, 4 * hidden_size)
            .with_bias(false)
            .init(device);

        Self {
            input_size,
            hidden_size,
            input_projection,
            recurrent_projection,
        }
    }

    /// Runs the layer over a sequence
    ///
    /// # Arguments
    ///
    /// * `x` - Input tensor of shape [batch_size, sequence_length, input_size]
    ///
    /// # Returns
    ///
    /// Returns the hidden states of shape [batch_size, sequence_length, hidden_size]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let device = x.device();
        let [batch_size, sequence_length, _] = x.dims();
        let hidden = self.hidden_size;

        let mut h = Tensor::<B, 2>::zeros([batch_size, hidden], &device);
        let mut c = Tensor::<B, 2>::zeros([batch_size, hidden], &device);
        let mut outputs = Vec::with_capacity(sequence_length);

        for t in 0..sequence_length {
            let x_t = x
                .clone()
                .narrow(1, t, 1)
                .reshape([batch_size, self.input_size]);

            let gates =
                self.input_projection.forward(x_t) + self.recurrent_projection.forward(h.clone());

            let i_t = activation::sigmoid(gates.clone().narrow(1, 0, hidden));
            let f_t = activation::sigmoid(gates.clone().narrow(1, hidden, hidden));
            let g_t = activation::tanh(gates.clone().narrow(1, 2 * hidden, hidden));
            let o_t = activation::sigmoid(gates.narrow(1, 3 * hidden, hidden));

            c = f_t * c + i_t * g_t;
            h = o_t * activation::tanh(c.clone());

            outputs.push(h.clone());
        }

        Tensor::stack(outputs, 1)
    }
}
