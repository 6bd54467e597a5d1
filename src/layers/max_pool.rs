//! Max pooling layer implementation
//!
//! Downsamples each channel by taking the maximum over a sliding window and
//! routes the upstream gradient back to the winning positions during the
//! backward pass.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Max pooling layer over square windows.
///
/// Pooling is per channel with trailing virtual zero padding, so inputs must
/// be non-negative (the elementwise kernels reject negatives). The output
/// spatial dimension for each axis is `ceil((dim - window) / stride) + 1`.
///
/// The layer has no learnable parameters; backward routes each upstream
/// gradient value to the position that won its window, accumulating where
/// windows overlap.
pub struct MaxPoolLayer {
    window: usize,
    stride: usize,
    pending_input: Option<Tensor>,
}

impl MaxPoolLayer {
    /// Create a max pooling layer with the given square window and stride.
    ///
    /// Geometry is validated per input at forward time, so construction only
    /// rejects a zero window or stride.
    pub fn new(window: usize, stride: usize) -> Result<Self> {
        if window == 0 || stride == 0 {
            return Err(Error::InvalidArgument(
                "max pool window and stride must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            window,
            stride,
            pending_input: None,
        })
    }

    /// Window side length.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Stride between window positions.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl Layer for MaxPoolLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let output = input.max_pool_forward(self.window, self.stride)?;
        self.pending_input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor> {
        let input = self.pending_input.take().ok_or(Error::Unsupported(
            "max pool backward called before forward",
        ))?;
        input.max_pool_backward(output_gradient, self.window, self.stride)
    }
}
