//! Layer abstractions for the network engine
//!
//! This module provides the Layer trait and the five layer implementations
//! the network driver composes: dense, convolutional, activation, max-pool,
//! and flatten.

mod r#trait;

pub mod activation;
pub mod conv;
pub mod dense;
pub mod flatten;
pub mod max_pool;

pub use activation::{Activation, ActivationLayer};
pub use conv::ConvLayer;
pub use dense::DenseLayer;
pub use flatten::FlattenLayer;
pub use max_pool::MaxPoolLayer;
pub use r#trait::Layer;
