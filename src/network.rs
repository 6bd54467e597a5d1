//! Network driver
//!
//! Owns an ordered stack of boxed layers and drives one example at a time:
//! `predict` runs the forward pass, `train` runs forward, forms the output
//! error, and propagates it backward through the stack in reverse. Parameter
//! updates happen inside each layer's backward pass.

use crate::error::Result;
use crate::layers::Layer;
use crate::tensor::Tensor;

/// A feed-forward network as an ordered stack of layers.
///
/// Layers are trait objects, so any composition of dense, convolutional,
/// activation, max-pool, and flatten layers can be assembled; shape
/// agreement between consecutive layers is checked by the layers themselves
/// at forward time.
#[derive(Default)]
pub struct Network {
    layers: Vec<Box<dyn Layer>>,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer to the end of the stack.
    pub fn add_layer(&mut self, layer: Box<dyn Layer>) {
        self.layers.push(layer);
    }

    /// Number of layers in the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers yet.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Run the forward pass and return the network output.
    pub fn predict(&mut self, input: &Tensor) -> Result<Tensor> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    /// Train on a single example.
    ///
    /// Runs the forward pass, forms the output error `output - expected`
    /// (the squared-error gradient up to a constant factor), and propagates
    /// it backward through the layers in reverse order. Each layer applies
    /// its own SGD update as the gradient passes through; the gradient with
    /// respect to the network input is discarded.
    pub fn train(&mut self, input: &Tensor, expected: &Tensor) -> Result<()> {
        let output = self.predict(input)?;
        let mut gradient = output.sub(expected)?;
        for layer in self.layers.iter_mut().rev() {
            gradient = layer.backward(&gradient)?;
        }
        Ok(())
    }
}
