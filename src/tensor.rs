//! Stacked array engine
//!
//! This module provides the `Tensor` type flowing between layers: an ordered
//! stack of equal-shaped matrices ("channels"). Every matrix operation lifts
//! channel-wise; `flatten`/`reshape` move between the stacked and the
//! column-vector representation feeding dense layers.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::utils::rng::SimpleRng;
use crate::utils::shape::Padding;

/// Ordered stack of equal-shaped matrices.
///
/// Invariant: every channel shares `(rows, columns)`. A depth-0 tensor
/// (`Tensor::empty`) is a valid growable accumulator that channels are
/// appended into; its row/column counts are 0 until the first append.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    rows: usize,
    columns: usize,
    channels: Vec<Matrix>,
}

impl Tensor {
    /// Create a zero-filled tensor of the given shape.
    ///
    /// Fails with `InvalidArgument` if any dimension is zero.
    pub fn new(depth: usize, rows: usize, columns: usize) -> Result<Self> {
        if depth == 0 {
            return Err(Error::InvalidArgument(
                "tensor depth must be greater than 0".to_string(),
            ));
        }
        let mut channels = Vec::with_capacity(depth);
        for _ in 0..depth {
            channels.push(Matrix::new(rows, columns)?);
        }
        Ok(Self {
            rows,
            columns,
            channels,
        })
    }

    /// Empty growable tensor used as an accumulator for `append`.
    pub fn empty() -> Self {
        Self {
            rows: 0,
            columns: 0,
            channels: Vec::new(),
        }
    }

    /// Depth-1 tensor wrapping a single matrix.
    pub fn from_matrix(channel: Matrix) -> Self {
        Self {
            rows: channel.rows(),
            columns: channel.columns(),
            channels: vec![channel],
        }
    }

    /// Tensor from a stack of matrices.
    ///
    /// Fails with `InvalidArgument` if the stack is empty or the shapes
    /// disagree.
    pub fn from_channels(channels: Vec<Matrix>) -> Result<Self> {
        let mut tensor = Tensor::empty();
        if channels.is_empty() {
            return Err(Error::InvalidArgument(
                "tensor channel stack cannot be empty".to_string(),
            ));
        }
        for channel in channels {
            tensor.append(channel)?;
        }
        Ok(tensor)
    }

    /// Append a channel, growing the depth by one.
    ///
    /// The first append fixes the tensor's row/column shape; later appends
    /// must match it (`InvalidArgument` otherwise).
    pub fn append(&mut self, channel: Matrix) -> Result<()> {
        if self.channels.is_empty() {
            self.rows = channel.rows();
            self.columns = channel.columns();
            self.channels.push(channel);
            return Ok(());
        }
        if channel.rows() != self.rows || channel.columns() != self.columns {
            return Err(Error::InvalidArgument(format!(
                "appended channel shape {}x{} does not match tensor shape {}x{}",
                channel.rows(),
                channel.columns(),
                self.rows,
                self.columns
            )));
        }
        self.channels.push(channel);
        Ok(())
    }

    /// Number of channels.
    pub fn depth(&self) -> usize {
        self.channels.len()
    }

    /// Rows per channel.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns per channel.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total element count across all channels.
    pub fn element_count(&self) -> usize {
        self.depth() * self.rows * self.columns
    }

    /// `(depth, rows, columns)` triple.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.depth(), self.rows, self.columns)
    }

    /// Channel at `index`, bounds-checked.
    pub fn channel(&self, index: usize) -> Result<&Matrix> {
        self.channels.get(index).ok_or(Error::OutOfBounds {
            row: index,
            column: 0,
            rows: self.channels.len(),
            columns: 1,
        })
    }

    /// Mutable channel at `index`, bounds-checked.
    pub fn channel_mut(&mut self, index: usize) -> Result<&mut Matrix> {
        let depth = self.channels.len();
        self.channels.get_mut(index).ok_or(Error::OutOfBounds {
            row: index,
            column: 0,
            rows: depth,
            columns: 1,
        })
    }

    fn check_same_depth(&self, other: &Tensor, op: &'static str) -> Result<()> {
        if self.depth() != other.depth() {
            return Err(Error::DepthMismatch {
                op,
                lhs: self.depth(),
                rhs: other.depth(),
            });
        }
        Ok(())
    }

    fn zip_channels(
        &self,
        other: &Tensor,
        op: &'static str,
        f: impl Fn(&Matrix, &Matrix) -> Result<Matrix>,
    ) -> Result<Tensor> {
        self.check_same_depth(other, op)?;
        let mut result = Tensor::empty();
        for (a, b) in self.channels.iter().zip(&other.channels) {
            result.append(f(a, b)?)?;
        }
        Ok(result)
    }

    /// Channel-wise sum; depths and channel shapes must match.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_channels(other, "tensor add", |a, b| a.add(b))
    }

    /// Channel-wise difference; depths and channel shapes must match.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_channels(other, "tensor sub", |a, b| a.sub(b))
    }

    /// In-place channel-wise sum.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_depth(other, "tensor add_assign")?;
        for (a, b) in self.channels.iter_mut().zip(&other.channels) {
            a.add_assign(b)?;
        }
        Ok(())
    }

    /// In-place channel-wise difference.
    pub fn sub_assign(&mut self, other: &Tensor) -> Result<()> {
        self.check_same_depth(other, "tensor sub_assign")?;
        for (a, b) in self.channels.iter_mut().zip(&other.channels) {
            a.sub_assign(b)?;
        }
        Ok(())
    }

    /// Channel-wise Hadamard product.
    pub fn element_wise_multiply(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_channels(other, "tensor element_wise_multiply", |a, b| {
            a.element_wise_multiply(b)
        })
    }

    /// Every element scaled by `multiplier`.
    pub fn scalar_multiply(&self, multiplier: f64) -> Tensor {
        Tensor {
            rows: self.rows,
            columns: self.columns,
            channels: self
                .channels
                .iter()
                .map(|c| c.scalar_multiply(multiplier))
                .collect(),
        }
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Tensor {
        let channels = self
            .channels
            .iter()
            .map(|c| {
                let data: Vec<f64> = c.data().iter().map(|&v| f(v)).collect();
                let mut rows_data = Vec::with_capacity(c.rows());
                for row in data.chunks(c.columns()) {
                    rows_data.push(row.to_vec());
                }
                // Shape is preserved, so from_rows cannot fail here.
                Matrix::from_rows(&rows_data).expect("map preserves channel shape")
            })
            .collect();
        Tensor {
            rows: self.rows,
            columns: self.columns,
            channels,
        }
    }

    /// Fill every channel with i.i.d. normal samples.
    pub fn randomize(&mut self, rng: &mut SimpleRng, mean: f64, std_dev: f64) {
        for channel in &mut self.channels {
            channel.randomize(rng, mean, std_dev);
        }
    }

    /// Channel-wise correlation: filter channel `j` sweeps input channel `j`.
    ///
    /// Depth of `filters` must equal the tensor depth (`DepthMismatch`).
    pub fn correlate(&self, filters: &Tensor, stride: usize, padding: Padding) -> Result<Tensor> {
        self.zip_channels(filters, "tensor correlate", |a, b| {
            a.correlate(b, stride, padding)
        })
    }

    /// Channel-wise convolution: filter channel `j` sweeps input channel `j`.
    pub fn convolve(&self, filters: &Tensor, stride: usize, padding: Padding) -> Result<Tensor> {
        self.zip_channels(filters, "tensor convolve", |a, b| {
            a.convolve(b, stride, padding)
        })
    }

    /// Channel-wise max pooling; see `Matrix::max_pool_forward`.
    pub fn max_pool_forward(&self, window: usize, stride: usize) -> Result<Tensor> {
        let mut result = Tensor::empty();
        for channel in &self.channels {
            result.append(channel.max_pool_forward(window, stride)?)?;
        }
        Ok(result)
    }

    /// Channel-wise winner-take-all gradient routing; `self` is the forward
    /// input, `output_gradient` the upstream gradient of matching depth.
    pub fn max_pool_backward(
        &self,
        output_gradient: &Tensor,
        window: usize,
        stride: usize,
    ) -> Result<Tensor> {
        self.zip_channels(output_gradient, "tensor max_pool_backward", |a, b| {
            a.max_pool_backward(b, window, stride)
        })
    }

    /// Every element in channel-major, row-major, column-minor order.
    pub fn to_flat_vec(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.element_count());
        for channel in &self.channels {
            flat.extend_from_slice(channel.data());
        }
        flat
    }

    /// Flatten into a column vector: depth 1, rows = element count, columns 1.
    ///
    /// Concatenation order is channel-major, row-major, column-minor; the
    /// structural inverse is `reshape` back to the original shape. Fails with
    /// `InvalidArgument` on a depth-0 tensor, which has no elements to form a
    /// column from.
    pub fn flatten(&self) -> Result<Tensor> {
        if self.channels.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot flatten a tensor with no channels".to_string(),
            ));
        }
        let flat = self.to_flat_vec();
        let rows_data: Vec<Vec<f64>> = flat.into_iter().map(|v| vec![v]).collect();
        Ok(Tensor::from_matrix(Matrix::from_rows(&rows_data)?))
    }

    /// Re-chunk the elements into a `(depth, rows, columns)` tensor.
    ///
    /// Fails with `InvalidArgument` unless the target element count matches
    /// the current one. The flattening order of `flatten` is used, so
    /// flattening and reshaping back to the original shape reproduces the
    /// tensor exactly.
    pub fn reshape(&self, depth: usize, rows: usize, columns: usize) -> Result<Tensor> {
        if depth == 0 || rows == 0 || columns == 0 {
            return Err(Error::InvalidArgument(
                "reshape dimensions must be greater than 0".to_string(),
            ));
        }
        if depth * rows * columns != self.element_count() {
            return Err(Error::InvalidArgument(format!(
                "cannot reshape tensor of {} elements to ({depth}, {rows}, {columns})",
                self.element_count()
            )));
        }

        let flat = self.to_flat_vec();
        let mut result = Tensor::empty();
        for channel_values in flat.chunks(rows * columns) {
            let rows_data: Vec<Vec<f64>> =
                channel_values.chunks(columns).map(|r| r.to_vec()).collect();
            result.append(Matrix::from_rows(&rows_data)?)?;
        }
        Ok(result)
    }
}
