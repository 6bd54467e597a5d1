//! Flatten layer implementation
//!
//! Bridges the convolutional stack to the dense stack: collapses a
//! `(depth, rows, columns)` tensor into a single column vector on the way
//! forward and reshapes the upstream gradient back on the way backward.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;

/// Flatten layer for a fixed declared input shape.
///
/// Forward turns a `(depth, rows, columns)` tensor into the column vector
/// `(1, depth * rows * columns, 1)` in channel-major, row-major order.
/// Backward is the structural inverse: the upstream gradient is reshaped to
/// the declared input shape. The layer is stateless apart from its declared
/// geometry, so forward/backward ordering is not enforced here.
pub struct FlattenLayer {
    depth: usize,
    rows: usize,
    columns: usize,
}

impl FlattenLayer {
    /// Create a flatten layer for the given input shape.
    pub fn new(depth: usize, rows: usize, columns: usize) -> Result<Self> {
        if depth == 0 || rows == 0 || columns == 0 {
            return Err(Error::InvalidArgument(
                "flatten layer dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            depth,
            rows,
            columns,
        })
    }

    /// Declared input shape `(depth, rows, columns)`.
    pub fn input_shape(&self) -> (usize, usize, usize) {
        (self.depth, self.rows, self.columns)
    }

    /// Length of the flattened output vector.
    pub fn output_size(&self) -> usize {
        self.depth * self.rows * self.columns
    }
}

impl Layer for FlattenLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        if input.shape() != self.input_shape() {
            return Err(Error::InvalidArgument(format!(
                "flatten layer expects input of shape {:?}, got {:?}",
                self.input_shape(),
                input.shape()
            )));
        }
        input.flatten()
    }

    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor> {
        if output_gradient.element_count() != self.output_size() {
            return Err(Error::InvalidArgument(format!(
                "flatten layer expects a gradient of {} elements, got {}",
                self.output_size(),
                output_gradient.element_count()
            )));
        }
        output_gradient.reshape(self.depth, self.rows, self.columns)
    }
}
