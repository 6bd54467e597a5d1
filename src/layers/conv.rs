//! Convolutional layer implementation
//!
//! Correlation forward pass with `valid` padding and stride 1, and the
//! matching hand-derived backward pass: filter gradients by correlating the
//! stored input against the upstream gradient, input gradients by
//! full-padding convolution of the upstream gradient with each filter.

use crate::error::{Error, Result};
use crate::layers::Layer;
use crate::tensor::Tensor;
use crate::utils::rng::SimpleRng;
use crate::utils::shape::{conv_output_dim, Padding};

/// Convolutional layer with `output_depth` learnable filter stacks.
///
/// Each filter is a tensor of depth `input_depth`; output channel `i` is the
/// bias channel `i` plus the sum over input channels `j` of
/// `correlate(input_j, filter_i_j)`. Stride is fixed at 1 and padding at
/// `valid`, so the output shape is `(output_depth, input_rows - filter_rows
/// + 1, input_columns - filter_columns + 1)`.
///
/// Filters are He-initialized: normal with standard deviation
/// `sqrt(2 / (filter_rows * filter_columns * input_depth))`. Biases start at
/// zero.
pub struct ConvLayer {
    output_depth: usize,
    input_depth: usize,
    input_rows: usize,
    input_columns: usize,
    filter_rows: usize,
    filter_columns: usize,
    output_rows: usize,
    output_columns: usize,
    learning_rate: f64,
    filters: Vec<Tensor>,
    biases: Tensor,
    pending_input: Option<Tensor>,
}

impl ConvLayer {
    /// Create a new convolutional layer.
    ///
    /// The output spatial shape is computed through the shape utility for
    /// `valid` padding at stride 1, so construction fails with
    /// `InvalidArgument` for any geometry the forward sweep would reject
    /// (zero sizes, filter larger than input). Filters smaller than 2x2 are
    /// also rejected: the backward pass cannot spread a gradient through
    /// them.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        output_depth: usize,
        input_depth: usize,
        input_rows: usize,
        input_columns: usize,
        filter_rows: usize,
        filter_columns: usize,
        learning_rate: f64,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        if output_depth == 0 || input_depth == 0 {
            return Err(Error::InvalidArgument(
                "convolutional layer depths must be greater than 0".to_string(),
            ));
        }
        // The input-gradient path convolves with full padding, which needs a
        // filter of at least 2 along each axis.
        if filter_rows < 2 || filter_columns < 2 {
            return Err(Error::InvalidArgument(
                "convolutional filter dimensions must be at least 2".to_string(),
            ));
        }

        let output_rows = conv_output_dim(input_rows, filter_rows, 1, Padding::Valid)?;
        let output_columns = conv_output_dim(input_columns, filter_columns, 1, Padding::Valid)?;

        let std_dev =
            (2.0 / (filter_rows * filter_columns * input_depth) as f64).sqrt();
        let mut filters = Vec::with_capacity(output_depth);
        for _ in 0..output_depth {
            let mut filter = Tensor::new(input_depth, filter_rows, filter_columns)?;
            filter.randomize(rng, 0.0, std_dev);
            filters.push(filter);
        }

        Ok(Self {
            output_depth,
            input_depth,
            input_rows,
            input_columns,
            filter_rows,
            filter_columns,
            output_rows,
            output_columns,
            learning_rate,
            filters,
            biases: Tensor::new(output_depth, output_rows, output_columns)?,
            pending_input: None,
        })
    }

    /// Declared output shape `(output_depth, rows, columns)`.
    pub fn output_shape(&self) -> (usize, usize, usize) {
        (self.output_depth, self.output_rows, self.output_columns)
    }

    /// Declared input shape `(input_depth, rows, columns)`.
    pub fn input_shape(&self) -> (usize, usize, usize) {
        (self.input_depth, self.input_rows, self.input_columns)
    }

    /// Total count of filter weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.output_depth * self.input_depth * self.filter_rows * self.filter_columns
            + self.biases.element_count()
    }

    /// Borrow filter `i` (tests and inspection).
    pub fn filter(&self, index: usize) -> Result<&Tensor> {
        self.filters.get(index).ok_or(Error::OutOfBounds {
            row: index,
            column: 0,
            rows: self.filters.len(),
            columns: 1,
        })
    }

    fn check_shape(
        &self,
        actual: (usize, usize, usize),
        expected: (usize, usize, usize),
        what: &str,
    ) -> Result<()> {
        if actual != expected {
            return Err(Error::InvalidArgument(format!(
                "convolutional layer expects {what} of shape {expected:?}, got {actual:?}"
            )));
        }
        Ok(())
    }
}

impl Layer for ConvLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.check_shape(input.shape(), self.input_shape(), "input")?;

        let mut output = self.biases.clone();
        for i in 0..self.output_depth {
            for j in 0..self.input_depth {
                let contribution =
                    input
                        .channel(j)?
                        .correlate(self.filters[i].channel(j)?, 1, Padding::Valid)?;
                output.channel_mut(i)?.add_assign(&contribution)?;
            }
        }

        self.pending_input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, output_gradient: &Tensor) -> Result<Tensor> {
        let input = self.pending_input.take().ok_or(Error::Unsupported(
            "convolutional backward called before forward",
        ))?;
        self.check_shape(output_gradient.shape(), self.output_shape(), "output gradient")?;

        let mut filters_gradient = Vec::with_capacity(self.output_depth);
        for _ in 0..self.output_depth {
            filters_gradient.push(Tensor::new(
                self.input_depth,
                self.filter_rows,
                self.filter_columns,
            )?);
        }
        let mut input_gradient =
            Tensor::new(self.input_depth, self.input_rows, self.input_columns)?;

        for i in 0..self.output_depth {
            for j in 0..self.input_depth {
                // The upstream gradient acts as the filter over the stored
                // input to produce the filter gradient.
                let filter_gradient = input
                    .channel(j)?
                    .correlate(output_gradient.channel(i)?, 1, Padding::Valid)?;
                *filters_gradient[i].channel_mut(j)? = filter_gradient;

                // Full-padding convolution spreads the gradient back over the
                // whole receptive field.
                let spread = output_gradient
                    .channel(i)?
                    .convolve(self.filters[i].channel(j)?, 1, Padding::Full)?;
                input_gradient.channel_mut(j)?.add_assign(&spread)?;
            }
        }

        for i in 0..self.output_depth {
            self.filters[i]
                .sub_assign(&filters_gradient[i].scalar_multiply(self.learning_rate))?;
        }
        self.biases
            .sub_assign(&output_gradient.scalar_multiply(self.learning_rate))?;

        Ok(input_gradient)
    }
}
