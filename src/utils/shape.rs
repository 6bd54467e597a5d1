//! Shape arithmetic shared by the array engine and layer construction.
//!
//! Layers declare their output shapes at construction time and the matrix
//! engine computes them again during the actual sweep; both go through these
//! functions so the two can never diverge.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Padding regime for correlation and convolution.
///
/// - `Valid`: no padding; only fully-overlapping filter positions.
/// - `Same`: output size equals input size via centered virtual padding.
/// - `Full`: every partially-overlapping position; output grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Valid,
    Same,
    Full,
}

impl FromStr for Padding {
    type Err = Error;

    /// Case-insensitive parse of `"valid"`, `"same"`, or `"full"`.
    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("valid") {
            Ok(Padding::Valid)
        } else if s.eq_ignore_ascii_case("same") {
            Ok(Padding::Same)
        } else if s.eq_ignore_ascii_case("full") {
            Ok(Padding::Full)
        } else {
            Err(Error::InvalidArgument(format!(
                "unknown padding type '{s}', expected one of: valid, same, full"
            )))
        }
    }
}

/// Validates the preconditions shared by every padding regime.
///
/// Requires `stride >= 1`, `stride <= filter_dim`, and the filter no larger
/// than the input along this axis.
fn check_sweep_args(dim: usize, filter_dim: usize, stride: usize) -> Result<()> {
    if dim == 0 || filter_dim == 0 {
        return Err(Error::InvalidArgument(
            "correlation dimensions must be greater than 0".to_string(),
        ));
    }
    if stride == 0 {
        return Err(Error::InvalidArgument(
            "stride must be at least 1".to_string(),
        ));
    }
    if stride > filter_dim {
        return Err(Error::InvalidArgument(format!(
            "stride {stride} exceeds filter dimension {filter_dim}"
        )));
    }
    if filter_dim > dim {
        return Err(Error::InvalidArgument(format!(
            "filter dimension {filter_dim} exceeds input dimension {dim}"
        )));
    }
    Ok(())
}

/// Output size along one axis for correlation/convolution.
///
/// See [`Padding`] for the three regimes. Fails with `InvalidArgument` when
/// the combination of sizes and stride cannot produce an exact sweep.
pub fn conv_output_dim(
    dim: usize,
    filter_dim: usize,
    stride: usize,
    padding: Padding,
) -> Result<usize> {
    check_sweep_args(dim, filter_dim, stride)?;

    match padding {
        Padding::Valid => {
            // Degenerate single-position case: the window covers the whole
            // axis, so any stride smaller than the input would re-enter it.
            if dim == filter_dim && stride < dim {
                return Err(Error::InvalidArgument(
                    "valid padding not possible for given sizes".to_string(),
                ));
            }
            if (dim - filter_dim) % stride != 0 {
                return Err(Error::InvalidArgument(
                    "valid padding not possible for given sizes".to_string(),
                ));
            }
            Ok((dim - filter_dim) / stride + 1)
        }
        Padding::Same => Ok(dim),
        Padding::Full => {
            if filter_dim < 2 {
                return Err(Error::InvalidArgument(
                    "full padding requires a filter dimension of at least 2".to_string(),
                ));
            }
            if (dim + filter_dim - 2) % stride != 0 {
                return Err(Error::InvalidArgument(
                    "full padding not possible for given sizes".to_string(),
                ));
            }
            Ok((dim + filter_dim - 2) / stride + 1)
        }
    }
}

/// Leading (top/left) virtual padding along one axis.
///
/// `Same` splits the total padding around the input with the extra pixel, if
/// odd, on the leading side. Assumes the arguments already passed
/// [`conv_output_dim`].
pub fn conv_leading_pad(
    dim: usize,
    filter_dim: usize,
    stride: usize,
    padding: Padding,
) -> Result<usize> {
    match padding {
        Padding::Valid => Ok(0),
        Padding::Same => {
            let output_dim = conv_output_dim(dim, filter_dim, stride, padding)?;
            let total = (output_dim - 1) * stride + filter_dim - dim;
            Ok((total + 1) / 2)
        }
        Padding::Full => {
            conv_output_dim(dim, filter_dim, stride, padding)?;
            Ok(filter_dim - 1)
        }
    }
}

/// Output size along one axis for max pooling.
///
/// Pooling pads virtually at the trailing edge whenever the stride does not
/// divide the sweep exactly: `ceil((dim - window)/stride) + 1`.
pub fn pool_output_dim(dim: usize, window: usize, stride: usize) -> Result<usize> {
    check_sweep_args(dim, window, stride)?;
    Ok((dim - window + stride - 1) / stride + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_parse_case_insensitive() {
        assert_eq!("valid".parse::<Padding>().unwrap(), Padding::Valid);
        assert_eq!("SAME".parse::<Padding>().unwrap(), Padding::Same);
        assert_eq!("Full".parse::<Padding>().unwrap(), Padding::Full);
        assert!("reflect".parse::<Padding>().is_err());
    }

    #[test]
    fn test_valid_output_dim() {
        // 28x28 input, 3x3 filter, stride 1 -> 26
        assert_eq!(conv_output_dim(28, 3, 1, Padding::Valid).unwrap(), 26);
        // stride 2 over a 5-wide sweep with 3-wide filter -> 2
        assert_eq!(conv_output_dim(5, 3, 2, Padding::Valid).unwrap(), 2);
    }

    #[test]
    fn test_valid_rejects_uneven_stride() {
        assert!(conv_output_dim(4, 3, 2, Padding::Valid).is_err());
    }

    #[test]
    fn test_valid_degenerate_single_position() {
        // dim == filter_dim requires stride >= dim
        assert!(conv_output_dim(3, 3, 1, Padding::Valid).is_err());
        assert_eq!(conv_output_dim(3, 3, 3, Padding::Valid).unwrap(), 1);
    }

    #[test]
    fn test_same_output_dim_and_pad() {
        assert_eq!(conv_output_dim(5, 3, 1, Padding::Same).unwrap(), 5);
        // total pad = (5-1)*1 + 3 - 5 = 2, split 1/1
        assert_eq!(conv_leading_pad(5, 3, 1, Padding::Same).unwrap(), 1);
        // even filter: total pad = (3-1)*1 + 2 - 3 = 1, extra pixel leads
        assert_eq!(conv_leading_pad(3, 2, 1, Padding::Same).unwrap(), 1);
    }

    #[test]
    fn test_full_output_dim() {
        // (3 + 3 - 2)/1 + 1 = 5
        assert_eq!(conv_output_dim(3, 3, 1, Padding::Full).unwrap(), 5);
        assert_eq!(conv_leading_pad(3, 3, 1, Padding::Full).unwrap(), 2);
        // 1x1 filter has no partial overlap
        assert!(conv_output_dim(3, 1, 1, Padding::Full).is_err());
    }

    #[test]
    fn test_pool_output_dim() {
        // exact sweep: (26-2)/2 + 1 = 13
        assert_eq!(pool_output_dim(26, 2, 2).unwrap(), 13);
        // padded sweep: ceil((11-2)/2) + 1 = 6
        assert_eq!(pool_output_dim(11, 2, 2).unwrap(), 6);
    }

    #[test]
    fn test_rejects_bad_sweep_args() {
        assert!(conv_output_dim(4, 2, 0, Padding::Valid).is_err());
        assert!(conv_output_dim(4, 2, 3, Padding::Valid).is_err());
        assert!(conv_output_dim(2, 4, 1, Padding::Valid).is_err());
        assert!(pool_output_dim(2, 4, 1).is_err());
    }
}
