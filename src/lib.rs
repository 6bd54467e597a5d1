//! From-scratch convolutional neural network engine.
//!
//! This library provides the numerical core for training a CNN one example at
//! a time: dense 2-D matrices, stacked 3-D tensors, correlation/convolution
//! with `valid`/`same`/`full` padding, max pooling with winner-take-all
//! gradient routing, and five layer types with hand-derived gradients,
//! orchestrated by a network driver.
//!
//! # Modules
//!
//! - `matrix`: dense 2-D array engine (arithmetic, correlation, pooling)
//! - `tensor`: stacked array of equal-shaped matrices, the inter-layer type
//! - `layers`: Layer trait and implementations (Dense, Conv, Activation, ...)
//! - `network`: forward/backward orchestration (`train` / `predict`)
//! - `architecture`: JSON architecture configuration and network building
//! - `utils`: RNG, shape arithmetic, argmax
//! - `error`: crate-wide error type

pub mod architecture;
pub mod error;
pub mod layers;
pub mod matrix;
pub mod network;
pub mod tensor;
pub mod utils;

pub use error::{Error, Result};
pub use matrix::Matrix;
pub use network::Network;
pub use tensor::Tensor;
