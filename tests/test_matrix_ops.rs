// Tests for matrix operations through the public API: arithmetic, matmul,
// transpose, and the correlation/pooling kernels the layers are built on.

use approx::assert_relative_eq;
use convnet::matrix::Matrix;
use convnet::utils::shape::Padding;

// ============================================================================
// Arithmetic and linear algebra
// ============================================================================

#[test]
fn test_add_sub_roundtrip() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![0.5, -0.5], vec![1.5, -1.5]]).unwrap();

    let sum = a.add(&b).unwrap();
    assert_eq!(sum.sub(&b).unwrap(), a);
}

#[test]
fn test_add_rejects_shape_mismatch() {
    let a = Matrix::new(2, 3).unwrap();
    let b = Matrix::new(3, 2).unwrap();
    assert!(a.add(&b).is_err());
}

#[test]
fn test_matmul_known_product() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap();

    let product = a.matmul(&b).unwrap();
    let expected = Matrix::from_rows(&[vec![19.0, 22.0], vec![43.0, 50.0]]).unwrap();
    assert_eq!(product, expected);
}

#[test]
fn test_matmul_rejects_inner_dimension_mismatch() {
    let a = Matrix::new(2, 3).unwrap();
    let b = Matrix::new(2, 3).unwrap();
    assert!(a.matmul(&b).is_err());
}

#[test]
fn test_transpose_involution() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let t = a.transpose();

    assert_eq!(t.rows(), 3);
    assert_eq!(t.columns(), 2);
    assert_eq!(t.get(0, 1).unwrap(), 4.0);
    assert_eq!(t.transpose(), a);
}

#[test]
fn test_element_wise_multiply() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![2.0, 0.0], vec![-1.0, 0.5]]).unwrap();

    let product = a.element_wise_multiply(&b).unwrap();
    let expected = Matrix::from_rows(&[vec![2.0, 0.0], vec![-3.0, 2.0]]).unwrap();
    assert_eq!(product, expected);
}

// ============================================================================
// Correlation and convolution
// ============================================================================

#[test]
fn test_correlate_valid_window_sums() {
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ])
    .unwrap();
    let ones = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();

    let output = input.correlate(&ones, 1, Padding::Valid).unwrap();
    let expected = Matrix::from_rows(&[vec![12.0, 16.0], vec![24.0, 28.0]]).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn test_correlate_same_preserves_dimensions() {
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ])
    .unwrap();
    let filter = Matrix::from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0]]).unwrap();

    let output = input.correlate(&filter, 1, Padding::Same).unwrap();
    assert_eq!(output.rows(), 3);
    assert_eq!(output.columns(), 3);
    // Identity-at-bottom-right filter reproduces the input under same padding.
    assert_eq!(output, input);
}

#[test]
fn test_correlate_rejects_indivisible_stride() {
    let input = Matrix::new(5, 5).unwrap();
    let filter = Matrix::new(2, 2).unwrap();
    // (5 - 2) is not divisible by 2 under valid padding.
    assert!(input.correlate(&filter, 2, Padding::Valid).is_err());
}

#[test]
fn test_convolve_equals_correlate_with_rotated_filter() {
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ])
    .unwrap();
    let filter = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();

    for padding in [Padding::Valid, Padding::Same, Padding::Full] {
        let convolved = input.convolve(&filter, 1, padding).unwrap();
        let correlated = input.correlate(&filter.rotate_180(), 1, padding).unwrap();
        assert_eq!(convolved, correlated);
    }
}

#[test]
fn test_convolve_equals_rotated_correlate_at_stride_two() {
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0, 4.0, 5.0],
        vec![6.0, 7.0, 8.0, 9.0, 10.0],
        vec![11.0, 12.0, 13.0, 14.0, 15.0],
        vec![16.0, 17.0, 18.0, 19.0, 20.0],
        vec![21.0, 22.0, 23.0, 24.0, 25.0],
    ])
    .unwrap();
    let filter = Matrix::from_rows(&[
        vec![1.0, 0.0, -1.0],
        vec![2.0, 0.5, -2.0],
        vec![1.0, 0.0, -1.0],
    ])
    .unwrap();

    // 5x5 input with a 3x3 filter sweeps exactly at stride 2 in all regimes:
    // valid -> 2x2, same -> 5x5, full -> 4x4.
    for padding in [Padding::Valid, Padding::Same, Padding::Full] {
        let convolved = input.convolve(&filter, 2, padding).unwrap();
        let correlated = input.correlate(&filter.rotate_180(), 2, padding).unwrap();
        assert_eq!(convolved, correlated);
    }
}

// ============================================================================
// Max pooling
// ============================================================================

#[test]
fn test_max_pool_with_trailing_padding() {
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ])
    .unwrap();

    // Window 2, stride 2 over a 3x3 input: trailing virtual zeros pad the
    // last window in each axis, ceil((3-2)/2)+1 = 2 outputs per axis.
    let output = input.max_pool_forward(2, 2).unwrap();
    let expected = Matrix::from_rows(&[vec![5.0, 6.0], vec![8.0, 9.0]]).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn test_max_pool_backward_accumulates_overlapping_windows() {
    // Window 2, stride 1: the centre element 9 wins all four windows.
    let input = Matrix::from_rows(&[
        vec![1.0, 2.0, 3.0],
        vec![4.0, 9.0, 6.0],
        vec![7.0, 8.0, 5.0],
    ])
    .unwrap();
    let gradient = Matrix::from_rows(&[vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();

    let routed = input.max_pool_backward(&gradient, 2, 1).unwrap();
    assert_relative_eq!(routed.get(1, 1).unwrap(), 4.0, epsilon = 1e-12);

    let total: f64 = routed.data().iter().sum();
    assert_relative_eq!(total, 4.0, epsilon = 1e-12);
}
