//! Shared utilities for the network engine
//!
//! This module provides random number generation, shape arithmetic for
//! convolution/pooling, and the argmax helper used to read predictions.

pub mod rng;
pub mod shape;

pub use rng::SimpleRng;
pub use shape::{conv_leading_pad, conv_output_dim, pool_output_dim, Padding};

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Index of the maximum element of a row-vector tensor.
///
/// The tensor must have depth 1 and a single row (the shape produced by the
/// final dense layer); anything else fails with `InvalidArgument`. Ties go to
/// the first index in scan order.
pub fn argmax(input: &Tensor) -> Result<usize> {
    if input.depth() != 1 || input.rows() != 1 {
        return Err(Error::InvalidArgument(format!(
            "argmax expects a (1, 1, n) tensor, got ({}, {}, {})",
            input.depth(),
            input.rows(),
            input.columns()
        )));
    }

    let channel = input.channel(0)?;
    let mut best_index = 0;
    let mut best_value = channel.get(0, 0)?;
    for column in 1..channel.columns() {
        let value = channel.get(0, column)?;
        if value > best_value {
            best_value = value;
            best_index = column;
        }
    }
    Ok(best_index)
}
