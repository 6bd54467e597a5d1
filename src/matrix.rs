//! Dense 2-D array engine
//!
//! This module provides the `Matrix` type underlying the whole engine:
//! row-major storage with bounds-checked access, elementwise and matrix
//! arithmetic, transpose/reshape, normal-distribution fill, and the
//! sliding-window kernels (correlation, convolution, max pooling) every layer
//! is built from.
//!
//! Padding in the window sweeps is virtual: out-of-bounds taps are skipped
//! instead of materializing a padded copy of the input.

use crate::error::{Error, Result};
use crate::utils::rng::SimpleRng;
use crate::utils::shape::{conv_leading_pad, conv_output_dim, pool_output_dim, Padding};

/// Dense 2-D array of `f64` in row-major order.
///
/// The shape is fixed at construction (only `reshape` may change it, and only
/// while preserving the element count); the invariant `data.len() == rows *
/// columns` holds for the lifetime of the value. Equality is element-wise
/// with exact floating comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled matrix.
    ///
    /// Fails with `InvalidArgument` if either dimension is zero.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(Error::InvalidArgument(
                "matrix dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        })
    }

    /// Create a matrix from literal row data.
    ///
    /// Fails with `InvalidArgument` if the input is empty or ragged.
    pub fn from_rows(rows_data: &[Vec<f64>]) -> Result<Self> {
        if rows_data.is_empty() || rows_data[0].is_empty() {
            return Err(Error::InvalidArgument(
                "input rows cannot be empty".to_string(),
            ));
        }

        let columns = rows_data[0].len();
        let mut data = Vec::with_capacity(rows_data.len() * columns);
        for row in rows_data {
            if row.len() != columns {
                return Err(Error::InvalidArgument(
                    "input rows must all have equal length".to_string(),
                ));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows_data.len(),
            columns,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Read-only view of the backing buffer, row-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn check_bounds(&self, row: usize, column: usize) -> Result<()> {
        if row >= self.rows || column >= self.columns {
            return Err(Error::OutOfBounds {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(())
    }

    /// Element at `(row, column)`, bounds-checked.
    pub fn get(&self, row: usize, column: usize) -> Result<f64> {
        self.check_bounds(row, column)?;
        Ok(self.data[row * self.columns + column])
    }

    /// Write the element at `(row, column)`, bounds-checked.
    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        self.check_bounds(row, column)?;
        self.data[row * self.columns + column] = value;
        Ok(())
    }

    fn check_same_shape(&self, other: &Matrix, op: &'static str) -> Result<()> {
        if self.rows != other.rows || self.columns != other.columns {
            return Err(Error::DimensionMismatch {
                op,
                lhs_rows: self.rows,
                lhs_columns: self.columns,
                rhs_rows: other.rows,
                rhs_columns: other.columns,
            });
        }
        Ok(())
    }

    /// Elementwise sum; shapes must match.
    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "matrix add")?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Matrix {
            rows: self.rows,
            columns: self.columns,
            data,
        })
    }

    /// Elementwise difference; shapes must match.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "matrix sub")?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Matrix {
            rows: self.rows,
            columns: self.columns,
            data,
        })
    }

    /// In-place elementwise sum; shapes must match.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "matrix add_assign")?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// In-place elementwise difference; shapes must match.
    pub fn sub_assign(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape(other, "matrix sub_assign")?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a -= b;
        }
        Ok(())
    }

    /// Elementwise (Hadamard) product; shapes must match.
    pub fn element_wise_multiply(&self, other: &Matrix) -> Result<Matrix> {
        self.check_same_shape(other, "matrix element_wise_multiply")?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a * b)
            .collect();
        Ok(Matrix {
            rows: self.rows,
            columns: self.columns,
            data,
        })
    }

    /// True matrix product; requires `self.columns == other.rows`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.columns != other.rows {
            return Err(Error::DimensionMismatch {
                op: "matrix matmul",
                lhs_rows: self.rows,
                lhs_columns: self.columns,
                rhs_rows: other.rows,
                rhs_columns: other.columns,
            });
        }

        let mut result = Matrix::new(self.rows, other.columns)?;
        for i in 0..self.rows {
            for j in 0..other.columns {
                let mut sum = 0.0;
                for k in 0..self.columns {
                    sum += self.data[i * self.columns + k] * other.data[k * other.columns + j];
                }
                result.data[i * other.columns + j] = sum;
            }
        }
        Ok(result)
    }

    /// Product with a scalar.
    pub fn scalar_multiply(&self, multiplier: f64) -> Matrix {
        Matrix {
            rows: self.rows,
            columns: self.columns,
            data: self.data.iter().map(|v| v * multiplier).collect(),
        }
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.columns {
                data[j * self.rows + i] = self.data[i * self.columns + j];
            }
        }
        Matrix {
            rows: self.columns,
            columns: self.rows,
            data,
        }
    }

    /// Change shape in place, keeping the row-major buffer.
    ///
    /// Fails with `InvalidArgument` unless `rows * columns` equals the current
    /// element count.
    pub fn reshape(&mut self, rows: usize, columns: usize) -> Result<()> {
        if rows == 0 || columns == 0 || rows * columns != self.data.len() {
            return Err(Error::InvalidArgument(format!(
                "cannot reshape {}x{} matrix to {}x{}",
                self.rows, self.columns, rows, columns
            )));
        }
        self.rows = rows;
        self.columns = columns;
        Ok(())
    }

    /// Fill with i.i.d. samples from a normal distribution.
    pub fn randomize(&mut self, rng: &mut SimpleRng, mean: f64, std_dev: f64) {
        for value in &mut self.data {
            *value = rng.normal_f64(mean, std_dev);
        }
    }

    /// Copy with rows and columns both reversed (180-degree rotation).
    pub fn rotate_180(&self) -> Matrix {
        Matrix {
            rows: self.rows,
            columns: self.columns,
            data: self.data.iter().rev().copied().collect(),
        }
    }

    /// Cross-correlation of `self` with `filter`.
    ///
    /// For each output position the filter is laid over the (virtually
    /// padded) input and the inner product of the overlap accumulated,
    /// advancing by `stride` along both axes. Output size and leading padding
    /// per axis come from the shape utility; see [`Padding`] for the three
    /// regimes.
    ///
    /// Fails with `InvalidArgument` when `stride` is zero, exceeds a filter
    /// dimension, the filter is larger than the input along either axis, or
    /// the regime cannot sweep the sizes exactly.
    pub fn correlate(&self, filter: &Matrix, stride: usize, padding: Padding) -> Result<Matrix> {
        let out_rows = conv_output_dim(self.rows, filter.rows, stride, padding)?;
        let out_columns = conv_output_dim(self.columns, filter.columns, stride, padding)?;
        let pad_top = conv_leading_pad(self.rows, filter.rows, stride, padding)?;
        let pad_left = conv_leading_pad(self.columns, filter.columns, stride, padding)?;

        let mut result = Matrix::new(out_rows, out_columns)?;
        for out_r in 0..out_rows {
            for out_c in 0..out_columns {
                let mut acc = 0.0;
                for f_r in 0..filter.rows {
                    let in_r = (out_r * stride + f_r) as isize - pad_top as isize;
                    if in_r < 0 || in_r >= self.rows as isize {
                        continue;
                    }
                    for f_c in 0..filter.columns {
                        let in_c = (out_c * stride + f_c) as isize - pad_left as isize;
                        if in_c < 0 || in_c >= self.columns as isize {
                            continue;
                        }
                        acc += self.data[in_r as usize * self.columns + in_c as usize]
                            * filter.data[f_r * filter.columns + f_c];
                    }
                }
                result.data[out_r * out_columns + out_c] = acc;
            }
        }
        Ok(result)
    }

    /// True mathematical convolution: correlation with the filter rotated
    /// 180 degrees. Used by the convolutional backward pass to form the
    /// adjoint of a correlation forward pass.
    pub fn convolve(&self, filter: &Matrix, stride: usize, padding: Padding) -> Result<Matrix> {
        self.correlate(&filter.rotate_180(), stride, padding)
    }

    /// Max pooling over `window`-sized regions advancing by `stride`.
    ///
    /// The sweep pads virtually at the trailing edges with the pooling
    /// identity 0, which is only an identity for non-negative inputs; any
    /// negative element therefore fails with `Unsupported` rather than
    /// silently corrupting the result.
    pub fn max_pool_forward(&self, window: usize, stride: usize) -> Result<Matrix> {
        if self.data.iter().any(|&v| v < 0.0) {
            return Err(Error::Unsupported(
                "max pooling requires non-negative input elements",
            ));
        }

        let out_rows = pool_output_dim(self.rows, window, stride)?;
        let out_columns = pool_output_dim(self.columns, window, stride)?;

        let mut result = Matrix::new(out_rows, out_columns)?;
        for out_r in 0..out_rows {
            for out_c in 0..out_columns {
                let mut best = 0.0;
                for w_r in 0..window {
                    let in_r = out_r * stride + w_r;
                    if in_r >= self.rows {
                        continue;
                    }
                    for w_c in 0..window {
                        let in_c = out_c * stride + w_c;
                        if in_c >= self.columns {
                            continue;
                        }
                        let value = self.data[in_r * self.columns + in_c];
                        if value > best {
                            best = value;
                        }
                    }
                }
                result.data[out_r * out_columns + out_c] = best;
            }
        }
        Ok(result)
    }

    /// Winner-take-all gradient routing for max pooling.
    ///
    /// `self` is the input of the matching forward call; each element of
    /// `output_gradient` is added to the input position that produced the
    /// forward maximum of its window. Ties go to the first position in scan
    /// order. Overlapping windows accumulate.
    pub fn max_pool_backward(
        &self,
        output_gradient: &Matrix,
        window: usize,
        stride: usize,
    ) -> Result<Matrix> {
        let out_rows = pool_output_dim(self.rows, window, stride)?;
        let out_columns = pool_output_dim(self.columns, window, stride)?;
        if output_gradient.rows != out_rows || output_gradient.columns != out_columns {
            return Err(Error::DimensionMismatch {
                op: "matrix max_pool_backward",
                lhs_rows: out_rows,
                lhs_columns: out_columns,
                rhs_rows: output_gradient.rows,
                rhs_columns: output_gradient.columns,
            });
        }

        let mut result = Matrix::new(self.rows, self.columns)?;
        for out_r in 0..out_rows {
            for out_c in 0..out_columns {
                let mut best: Option<(usize, usize, f64)> = None;
                for w_r in 0..window {
                    let in_r = out_r * stride + w_r;
                    if in_r >= self.rows {
                        continue;
                    }
                    for w_c in 0..window {
                        let in_c = out_c * stride + w_c;
                        if in_c >= self.columns {
                            continue;
                        }
                        let value = self.data[in_r * self.columns + in_c];
                        match best {
                            Some((_, _, best_value)) if value <= best_value => {}
                            _ => best = Some((in_r, in_c, value)),
                        }
                    }
                }
                if let Some((in_r, in_c, _)) = best {
                    result.data[in_r * self.columns + in_c] +=
                        output_gradient.data[out_r * out_columns + out_c];
                }
            }
        }
        Ok(result)
    }
}
