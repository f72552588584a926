//! Dense layer with column-normalized Gaussian ("normc") initialization.
//!
//! Weights are drawn from a unit Gaussian, then each output unit's fan-in
//! vector is rescaled so its L2 norm equals `std`. Small `std` values (0.01)
//! keep a head's initial output near zero, which for a policy head means a
//! near-uniform initial distribution; `std = 1.0` is the usual choice for
//! hidden layers.
//!
//! # Usage
//!
//! ```ignore
//! use autoreg_rl::nn::{NormcLinear, NormcLinearConfig};
//!
//! let head: NormcLinear<B> = NormcLinearConfig::new(64, 6)
//!     .with_std(0.01)
//!     .init(&device);
//! let logits = head.forward(context);
//! ```

use burn::module::{Module, Param};
use burn::prelude::*;
use burn::tensor::Distribution;

/// Configuration for a [`NormcLinear`] layer.
#[derive(Debug, Clone)]
pub struct NormcLinearConfig {
    /// Number of input features.
    pub d_input: usize,
    /// Number of output features.
    pub d_output: usize,
    /// Target L2 norm for each output unit's weight vector.
    /// Default: 1.0 (use 0.01 for logit and value heads).
    pub std: f64,
    /// Whether to include a bias term.
    pub bias: bool,
}

impl NormcLinearConfig {
    /// Create a new configuration.
    pub fn new(d_input: usize, d_output: usize) -> Self {
        Self {
            d_input,
            d_output,
            std: 1.0,
            bias: true,
        }
    }

    /// Set the initialization scale.
    pub fn with_std(mut self, std: f64) -> Self {
        self.std = std;
        self
    }

    /// Set whether to include bias.
    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Initialize the layer.
    pub fn init<B: Backend>(&self, device: &B::Device) -> NormcLinear<B> {
        let weight = normc_weights::<B>(self.d_output, self.d_input, self.std, device);

        let bias = if self.bias {
            Some(Param::from_tensor(Tensor::zeros([self.d_output], device)))
        } else {
            None
        };

        NormcLinear {
            weight: Param::from_tensor(weight),
            bias,
            d_input: self.d_input,
            d_output: self.d_output,
        }
    }
}

/// Generate a `[d_output, d_input]` weight matrix with normc initialization.
pub fn normc_weights<B: Backend>(
    d_output: usize,
    d_input: usize,
    std: f64,
    device: &B::Device,
) -> Tensor<B, 2> {
    let weight = Tensor::<B, 2>::random(
        [d_output, d_input],
        Distribution::Normal(0.0, 1.0),
        device,
    );

    // Rescale each row (one output unit's fan-in) to norm `std`.
    let norms = weight.clone().powf_scalar(2.0).sum_dim(1).sqrt();
    weight.div(norms).mul_scalar(std)
}

/// Linear layer with normc initialization.
///
/// Functionally equivalent to Burn's `Linear`, but initialized with
/// column-normalized Gaussian weights.
#[derive(Module, Debug)]
pub struct NormcLinear<B: Backend> {
    /// Weight matrix of shape [d_output, d_input].
    pub weight: Param<Tensor<B, 2>>,
    /// Optional bias of shape [d_output].
    pub bias: Option<Param<Tensor<B, 1>>>,
    /// Input dimension (for reference).
    #[module(skip)]
    d_input: usize,
    /// Output dimension (for reference).
    #[module(skip)]
    d_output: usize,
}

impl<B: Backend> NormcLinear<B> {
    /// Forward pass: y = xW^T + b.
    ///
    /// # Arguments
    /// * `input` - Tensor of shape [batch_size, d_input]
    ///
    /// # Returns
    /// Tensor of shape [batch_size, d_output]
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let output = input.matmul(self.weight.val().transpose());

        match &self.bias {
            Some(bias) => output + bias.val().unsqueeze_dim(0),
            None => output,
        }
    }

    /// Input dimension.
    pub fn d_input(&self) -> usize {
        self.d_input
    }

    /// Output dimension.
    pub fn d_output(&self) -> usize {
        self.d_output
    }
}
