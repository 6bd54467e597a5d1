//! Activation layer implementation
//!
//! Elementwise nonlinearities applied across the whole tensor: sigmoid, ReLU,
//! and a global softmax. The backward pass multiplies the upstream gradient
//! by the derivative evaluated at the stored forward input.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Activation function selected at layer construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Sigmoid,
    Relu,
    /// Softmax over the *entire tensor*: every element is exponentiated and
    /// divided by the grand sum across all channels, not per row.
    Softmax,
}

impl Activation {
    /// Case-insensitive lookup of `"sigmoid"`, `"relu"`, or `"softmax"`.
    pub fn from_name(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("sigmoid") {
            Ok(Activation::Sigmoid)
        } else if name.eq_ignore_ascii_case("relu") {
            Ok(Activation::Relu)
        } else if name.eq_ignore_ascii_case("softmax") {
            Ok(Activation::Softmax)
        } else {
            Err(Error::InvalidArgument(format!(
                "unknown activation function '{name}', expected one of: sigmoid, relu, softmax"
            )))
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Activation layer: no learnable parameters, only the stored forward input.
pub struct ActivationLayer {
    activation: Activation,
    pending_input: Option<Tensor>,
}

impl ActivationLayer {
    /// Create an activation layer by function name (case-insensitive).
    pub fn new(activation_function_name: &str) -> Result<Self> {
        Ok(Self {
            activation: Activation::from_name(activation_function_name)?,
            pending_input: None,
        })
    }

    /// Create an activation layer from the parsed variant.
    pub fn from_activation(activation: Activation) -> Self {
        Self {
            activation,
            pending_input: None,
        }
    }

    /// Which activation this layer applies.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    fn apply(&self, input: &Tensor) -> Tensor {
        match self.activation {
            Activation::Sigmoid => input.map(sigmoid),
            Activation::Relu => input.map(|x| x.max(0.0)),
            Activation::Softmax => {
                // Max subtraction keeps the exponentials finite; the result
                // is mathematically identical to exp(x) / sum(exp(x)).
                let max = input
                    .to_flat_vec()
                    .into_iter()
                    .fold(f64::NEG_INFINITY, f64::max);
                let exponentiated = input.map(|x| (x - max).exp());
                let sum: f64 = exponentiated.to_flat_vec().iter().sum();
                exponentiated.scalar_multiply(1.0 / sum)
            }
        }
    }
}

impl Layer for ActivationLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.pending_input = Some(input.clone());
        Ok(self.apply(input))
    }

    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor> {
        let input = self.pending_input.take().ok_or(Error::Unsupported(
            "activation backward called before forward",
        ))?;

        let derivative = match self.activation {
            Activation::Sigmoid => input.map(|x| {
                let s = sigmoid(x);
                s * (1.0 - s)
            }),
            Activation::Relu => input.map(|x| if x > 0.0 { 1.0 } else { 0.0 }),
            // The full softmax Jacobian-vector product was never needed: the
            // trained networks terminate in sigmoid. Kept as an explicit gap.
            Activation::Softmax => {
                return Err(Error::Unsupported(
                    "softmax backward pass is not implemented",
                ))
            }
        };

        output_gradient.element_wise_multiply(&derivative)
    }
}
