//! Dense (fully connected) layer implementation
//!
//! Performs the linear transformation `y = xW + b` on a depth-1 vector tensor
//! and applies the matching hand-derived gradient update during the backward
//! pass.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::matrix::Matrix;
use crate::tensor::Tensor;
use crate::utils::rng::SimpleRng;

/// Transient forward state consumed by the next backward call.
struct PendingInput {
    /// Input in row form (1 × input_size).
    row: Matrix,
    /// Shape the input actually arrived in, for the returned gradient.
    rows: usize,
    columns: usize,
}

/// Dense layer with weights `input_size × output_size` and biases
/// `1 × output_size`.
///
/// Weights are initialized i.i.d. normal with standard deviation
/// `sqrt(1 / input_size)`; biases start at zero. The backward pass applies a
/// plain SGD update in place (no momentum, no decay) and returns the input
/// gradient.
///
/// # Input shape
///
/// The input must be a depth-1 vector of exactly `input_size` elements. Both
/// orientations are accepted: `(1, 1, n)` row form and the `(1, n, 1)`
/// column form produced by the flatten layer. The input gradient comes back
/// in whichever orientation the input arrived in. The output is always
/// `(1, 1, output_size)`.
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    learning_rate: f64,
    weights: Matrix,
    biases: Matrix,
    pending: Option<PendingInput>,
}

impl DenseLayer {
    /// Create a new dense layer.
    ///
    /// Fails with `InvalidArgument` if either size is zero.
    pub fn new(
        input_size: usize,
        output_size: usize,
        learning_rate: f64,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        let mut weights = Matrix::new(input_size, output_size)?;
        let std_dev = (1.0 / input_size as f64).sqrt();
        weights.randomize(rng, 0.0, std_dev);

        Ok(Self {
            input_size,
            output_size,
            learning_rate,
            weights,
            biases: Matrix::new(1, output_size)?,
            pending: None,
        })
    }

    /// Expected number of input features.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of output features.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Total count of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.input_size * self.output_size + self.output_size
    }

    /// Borrow the weight matrix (tests and inspection).
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Borrow the bias row (tests and inspection).
    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    fn check_vector_input(&self, input: &Tensor) -> Result<()> {
        let (depth, rows, columns) = input.shape();
        let is_vector = rows == 1 || columns == 1;
        if depth != 1 || !is_vector || rows * columns != self.input_size {
            return Err(Error::InvalidArgument(format!(
                "dense layer expects a depth-1 vector of {} elements, got ({depth}, {rows}, {columns})",
                self.input_size
            )));
        }
        Ok(())
    }
}

impl Layer for DenseLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.check_vector_input(input)?;

        let mut row = input.channel(0)?.clone();
        let (rows, columns) = (row.rows(), row.columns());
        row.reshape(1, self.input_size)?;

        let z = row.matmul(&self.weights)?.add(&self.biases)?;
        self.pending = Some(PendingInput { row, rows, columns });
        Ok(Tensor::from_matrix(z))
    }

    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor> {
        let pending = self
            .pending
            .take()
            .ok_or(Error::Unsupported("dense backward called before forward"))?;

        let (depth, rows, columns) = output_gradient.shape();
        if depth != 1 || rows != 1 || columns != self.output_size {
            return Err(Error::InvalidArgument(format!(
                "dense layer expects a (1, 1, {}) output gradient, got ({depth}, {rows}, {columns})",
                self.output_size
            )));
        }
        let gradient = output_gradient.channel(0)?;

        let weights_gradient = pending.row.transpose().matmul(gradient)?;
        let biases_gradient = gradient;
        let mut input_gradient = gradient.matmul(&self.weights.transpose())?;

        self.weights
            .sub_assign(&weights_gradient.scalar_multiply(self.learning_rate))?;
        self.biases
            .sub_assign(&biases_gradient.scalar_multiply(self.learning_rate))?;

        // Hand the gradient back in the orientation the input arrived in.
        input_gradient.reshape(pending.rows, pending.columns)?;
        Ok(Tensor::from_matrix(input_gradient))
    }
}
