//! Layer trait definition
//!
//! The core contract every layer type implements: a forward pass producing an
//! output tensor and a backward pass consuming the upstream gradient,
//! updating internal parameters as a side effect, and returning the gradient
//! with respect to the layer input.

use crate::error::Result;
use crate::tensor::Tensor;

/// Core trait for network layers.
///
/// The five layer types (Dense, Conv, Activation, MaxPool, Flatten) implement
/// this trait; the network driver only ever dispatches `forward`/`backward`
/// over this closed set.
///
/// # State
///
/// `forward` captures transient state (typically the input) that the next
/// `backward` consumes exactly once; calling `backward` without a preceding
/// `forward` fails with `Error::Unsupported`. Layer instances are therefore
/// not reentrant and must process one example at a time.
pub trait Layer {
    /// Forward propagation: compute the layer output for `input` and stash
    /// whatever the backward pass will need.
    fn forward(&mut self, input: &Tensor) -> Result<Tensor>;

    /// Backward propagation: given the gradient of the loss with respect to
    /// this layer's output, update any learnable parameters in place
    /// (immediate SGD step) and return the gradient with respect to the
    /// layer's input.
    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor>;
}
