//! Architecture configuration structures
//!
//! This module provides configuration structures for defining network
//! architectures via JSON configuration files. This enables architecture
//! experimentation without code changes.

use crate::error::{Error, Result};
use crate::layers::{ActivationLayer, ConvLayer, DenseLayer, FlattenLayer, Layer, MaxPoolLayer};
use crate::network::Network;
use crate::utils::rng::SimpleRng;
use crate::utils::shape::{conv_output_dim, pool_output_dim, Padding};
use serde::Deserialize;
use std::fs;

/// Configuration for a single layer in the network.
///
/// Defines the layer type and its parameters. Different layer types require
/// different fields:
///
/// - **Dense**: `input_size`, `output_size`, `learning_rate`
/// - **Conv2D**: `output_depth`, `input_depth`, `input_rows`, `input_columns`,
///   `filter_rows`, `filter_columns`, `learning_rate`
/// - **Activation**: `function` ("sigmoid", "relu", or "softmax")
/// - **MaxPool**: `window_size` and optional `stride` (default: `window_size`)
/// - **Flatten**: `depth`, `rows`, `columns`
///
/// # Examples
///
/// ```json
/// {
///   "layer_type": "conv2d",
///   "output_depth": 16,
///   "input_depth": 1,
///   "input_rows": 28,
///   "input_columns": 28,
///   "filter_rows": 3,
///   "filter_columns": 3,
///   "learning_rate": 0.1
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerConfig {
    /// Type of layer: "dense", "conv2d", "activation", "max_pool", or "flatten"
    pub layer_type: String,

    // Dense layer parameters
    /// Input size for Dense layer
    pub input_size: Option<usize>,
    /// Output size for Dense layer
    pub output_size: Option<usize>,

    // Conv2D layer parameters
    /// Number of filters (output channels) for Conv2D layer
    pub output_depth: Option<usize>,
    /// Number of input channels for Conv2D layer
    pub input_depth: Option<usize>,
    /// Input height for Conv2D layer
    pub input_rows: Option<usize>,
    /// Input width for Conv2D layer
    pub input_columns: Option<usize>,
    /// Filter height for Conv2D layer
    pub filter_rows: Option<usize>,
    /// Filter width for Conv2D layer
    pub filter_columns: Option<usize>,

    /// Learning rate for Dense and Conv2D layers
    pub learning_rate: Option<f64>,

    // Activation layer parameters
    /// Activation function name: "sigmoid", "relu", or "softmax"
    pub function: Option<String>,

    // MaxPool layer parameters
    /// Square window side for MaxPool layer
    pub window_size: Option<usize>,
    /// Stride for MaxPool layer (default: window_size)
    pub stride: Option<usize>,

    // Flatten layer parameters
    /// Input depth for Flatten layer
    pub depth: Option<usize>,
    /// Input height for Flatten layer
    pub rows: Option<usize>,
    /// Input width for Flatten layer
    pub columns: Option<usize>,
}

/// Configuration for the entire network architecture.
///
/// Contains a sequence of layer configurations that define the network
/// structure. Layers are applied in the order they appear in the
/// configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    /// Sequence of layer configurations defining the network structure
    pub layers: Vec<LayerConfig>,
}

/// Loads an architecture configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into an
/// `ArchitectureConfig`, and validates the layer parameters and the shape
/// agreement between consecutive layers.
///
/// # Returns
///
/// `Ok(ArchitectureConfig)` on success, or an error if the file cannot be
/// read, the JSON is invalid, or validation fails.
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

fn require(value: Option<usize>, index: usize, field: &str, layer_type: &str) -> Result<usize> {
    value.ok_or_else(|| {
        Error::InvalidArgument(format!(
            "layer {index}: {layer_type} layer requires '{field}'"
        ))
    })
}

fn require_learning_rate(layer: &LayerConfig, index: usize) -> Result<f64> {
    let learning_rate = layer.learning_rate.ok_or_else(|| {
        Error::InvalidArgument(format!(
            "layer {index}: {} layer requires 'learning_rate'",
            layer.layer_type
        ))
    })?;
    if !learning_rate.is_finite() || learning_rate <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "layer {index}: learning_rate must be positive, got {learning_rate}"
        )));
    }
    Ok(learning_rate)
}

/// Validates an architecture configuration.
///
/// Checks that:
/// - The architecture has at least one layer
/// - Each layer has the required fields for its type
/// - The output shape of each layer matches the input shape of the next,
///   where both are known (activation and max-pool layers inherit the shape
///   flowing through them)
fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    if config.layers.is_empty() {
        return Err(Error::InvalidArgument(
            "architecture must have at least one layer".to_string(),
        ));
    }

    // Shape of the tensor flowing between layers, when it is known.
    let mut current: Option<(usize, usize, usize)> = None;

    for (index, layer) in config.layers.iter().enumerate() {
        let layer_type = layer.layer_type.to_lowercase();

        match layer_type.as_str() {
            "dense" => {
                let input_size = require(layer.input_size, index, "input_size", "dense")?;
                let output_size = require(layer.output_size, index, "output_size", "dense")?;
                require_learning_rate(layer, index)?;
                if input_size == 0 || output_size == 0 {
                    return Err(Error::InvalidArgument(format!(
                        "layer {index}: dense sizes must be greater than 0"
                    )));
                }

                if let Some((depth, rows, columns)) = current {
                    let is_vector = depth == 1 && (rows == 1 || columns == 1);
                    if !is_vector || rows * columns != input_size {
                        return Err(Error::InvalidArgument(format!(
                            "layer {index}: dense expects a vector of {input_size} elements, \
                             previous layer produces ({depth}, {rows}, {columns})"
                        )));
                    }
                }
                current = Some((1, 1, output_size));
            }
            "conv2d" => {
                let output_depth = require(layer.output_depth, index, "output_depth", "conv2d")?;
                let input_depth = require(layer.input_depth, index, "input_depth", "conv2d")?;
                let input_rows = require(layer.input_rows, index, "input_rows", "conv2d")?;
                let input_columns =
                    require(layer.input_columns, index, "input_columns", "conv2d")?;
                let filter_rows = require(layer.filter_rows, index, "filter_rows", "conv2d")?;
                let filter_columns =
                    require(layer.filter_columns, index, "filter_columns", "conv2d")?;
                require_learning_rate(layer, index)?;
                if output_depth == 0 || input_depth == 0 {
                    return Err(Error::InvalidArgument(format!(
                        "layer {index}: conv2d depths must be greater than 0"
                    )));
                }
                if filter_rows < 2 || filter_columns < 2 {
                    return Err(Error::InvalidArgument(format!(
                        "layer {index}: conv2d filter dimensions must be at least 2"
                    )));
                }

                let declared = (input_depth, input_rows, input_columns);
                if let Some(shape) = current {
                    if shape != declared {
                        return Err(Error::InvalidArgument(format!(
                            "layer {index}: conv2d expects input of shape {declared:?}, \
                             previous layer produces {shape:?}"
                        )));
                    }
                }
                let output_rows = conv_output_dim(input_rows, filter_rows, 1, Padding::Valid)
                    .map_err(|e| {
                        Error::InvalidArgument(format!("layer {index}: {e}"))
                    })?;
                let output_columns =
                    conv_output_dim(input_columns, filter_columns, 1, Padding::Valid).map_err(
                        |e| Error::InvalidArgument(format!("layer {index}: {e}")),
                    )?;
                current = Some((output_depth, output_rows, output_columns));
            }
            "activation" => {
                let function = layer.function.as_deref().ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "layer {index}: activation layer requires 'function'"
                    ))
                })?;
                // Rejects unknown names; the shape passes through unchanged.
                crate::layers::Activation::from_name(function)
                    .map_err(|e| Error::InvalidArgument(format!("layer {index}: {e}")))?;
            }
            "max_pool" => {
                let window = require(layer.window_size, index, "window_size", "max_pool")?;
                let stride = layer.stride.unwrap_or(window);
                if window == 0 || stride == 0 {
                    return Err(Error::InvalidArgument(format!(
                        "layer {index}: max_pool window_size and stride must be greater than 0"
                    )));
                }

                if let Some((depth, rows, columns)) = current {
                    let pooled_rows = pool_output_dim(rows, window, stride).map_err(|e| {
                        Error::InvalidArgument(format!("layer {index}: {e}"))
                    })?;
                    let pooled_columns =
                        pool_output_dim(columns, window, stride).map_err(|e| {
                            Error::InvalidArgument(format!("layer {index}: {e}"))
                        })?;
                    current = Some((depth, pooled_rows, pooled_columns));
                }
            }
            "flatten" => {
                let depth = require(layer.depth, index, "depth", "flatten")?;
                let rows = require(layer.rows, index, "rows", "flatten")?;
                let columns = require(layer.columns, index, "columns", "flatten")?;
                if depth == 0 || rows == 0 || columns == 0 {
                    return Err(Error::InvalidArgument(format!(
                        "layer {index}: flatten dimensions must be greater than 0"
                    )));
                }

                let declared = (depth, rows, columns);
                if let Some(shape) = current {
                    if shape != declared {
                        return Err(Error::InvalidArgument(format!(
                            "layer {index}: flatten expects input of shape {declared:?}, \
                             previous layer produces {shape:?}"
                        )));
                    }
                }
                current = Some((1, depth * rows * columns, 1));
            }
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "layer {index}: invalid layer type '{}'. Must be one of: \
                     dense, conv2d, activation, max_pool, flatten",
                    layer.layer_type
                )));
            }
        }
    }

    Ok(())
}

/// Builds a network from an architecture configuration.
///
/// Creates and assembles the layers in configuration order. Weight-bearing
/// layers draw their initial parameters from the provided RNG, so the same
/// seed reproduces the same network.
///
/// # Errors
///
/// Returns an error if the configuration fails validation or a layer
/// constructor rejects its parameters.
pub fn build_network(config: &ArchitectureConfig, rng: &mut SimpleRng) -> Result<Network> {
    validate_architecture(config)?;

    let mut network = Network::new();
    for (index, layer) in config.layers.iter().enumerate() {
        let layer_type = layer.layer_type.to_lowercase();

        let built: Box<dyn Layer> = match layer_type.as_str() {
            "dense" => Box::new(DenseLayer::new(
                require(layer.input_size, index, "input_size", "dense")?,
                require(layer.output_size, index, "output_size", "dense")?,
                require_learning_rate(layer, index)?,
                rng,
            )?),
            "conv2d" => Box::new(ConvLayer::new(
                require(layer.output_depth, index, "output_depth", "conv2d")?,
                require(layer.input_depth, index, "input_depth", "conv2d")?,
                require(layer.input_rows, index, "input_rows", "conv2d")?,
                require(layer.input_columns, index, "input_columns", "conv2d")?,
                require(layer.filter_rows, index, "filter_rows", "conv2d")?,
                require(layer.filter_columns, index, "filter_columns", "conv2d")?,
                require_learning_rate(layer, index)?,
                rng,
            )?),
            "activation" => {
                let function = layer.function.as_deref().ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "layer {index}: activation layer requires 'function'"
                    ))
                })?;
                Box::new(ActivationLayer::new(function)?)
            }
            "max_pool" => {
                let window = require(layer.window_size, index, "window_size", "max_pool")?;
                Box::new(MaxPoolLayer::new(window, layer.stride.unwrap_or(window))?)
            }
            "flatten" => Box::new(FlattenLayer::new(
                require(layer.depth, index, "depth", "flatten")?,
                require(layer.rows, index, "rows", "flatten")?,
                require(layer.columns, index, "columns", "flatten")?,
            )?),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "layer {index}: invalid layer type '{}'. Must be one of: \
                     dense, conv2d, activation, max_pool, flatten",
                    layer.layer_type
                )));
            }
        };
        network.add_layer(built);
    }

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(input_size: usize, output_size: usize) -> LayerConfig {
        LayerConfig {
            layer_type: "dense".to_string(),
            input_size: Some(input_size),
            output_size: Some(output_size),
            learning_rate: Some(0.1),
            ..LayerConfig::default()
        }
    }

    fn activation(function: &str) -> LayerConfig {
        LayerConfig {
            layer_type: "activation".to_string(),
            function: Some(function.to_string()),
            ..LayerConfig::default()
        }
    }

    #[test]
    fn test_validate_dense_layer() {
        let config = ArchitectureConfig {
            layers: vec![dense(784, 256), dense(256, 10)],
        };
        assert!(validate_architecture(&config).is_ok());
    }

    #[test]
    fn test_validate_dense_missing_fields() {
        let mut layer = dense(784, 256);
        layer.input_size = None;
        let config = ArchitectureConfig {
            layers: vec![layer],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_missing_learning_rate() {
        let mut layer = dense(784, 256);
        layer.learning_rate = None;
        let config = ArchitectureConfig {
            layers: vec![layer],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_empty_architecture() {
        let config = ArchitectureConfig { layers: vec![] };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_layer_type() {
        let config = ArchitectureConfig {
            layers: vec![LayerConfig {
                layer_type: "dropout".to_string(),
                ..LayerConfig::default()
            }],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_activation_function() {
        let config = ArchitectureConfig {
            layers: vec![activation("tanh")],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_layer_connection_mismatch() {
        let config = ArchitectureConfig {
            layers: vec![dense(784, 256), dense(128, 10)],
        };
        let result = validate_architecture(&config);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("vector of 128 elements"));
    }

    #[test]
    fn test_validate_conv_pool_flatten_chain() {
        let conv = LayerConfig {
            layer_type: "conv2d".to_string(),
            output_depth: Some(4),
            input_depth: Some(1),
            input_rows: Some(8),
            input_columns: Some(8),
            filter_rows: Some(3),
            filter_columns: Some(3),
            learning_rate: Some(0.1),
            ..LayerConfig::default()
        };
        let pool = LayerConfig {
            layer_type: "max_pool".to_string(),
            window_size: Some(2),
            stride: Some(2),
            ..LayerConfig::default()
        };
        // conv: (1,8,8) -> (4,6,6); pool: -> (4,3,3); flatten: -> (1,36,1)
        let flatten = LayerConfig {
            layer_type: "flatten".to_string(),
            depth: Some(4),
            rows: Some(3),
            columns: Some(3),
            ..LayerConfig::default()
        };
        let config = ArchitectureConfig {
            layers: vec![conv, pool, flatten, dense(36, 10), activation("sigmoid")],
        };
        assert!(validate_architecture(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_conv_filter() {
        let conv = LayerConfig {
            layer_type: "conv2d".to_string(),
            output_depth: Some(1),
            input_depth: Some(1),
            input_rows: Some(4),
            input_columns: Some(4),
            filter_rows: Some(1),
            filter_columns: Some(1),
            learning_rate: Some(0.1),
            ..LayerConfig::default()
        };
        let config = ArchitectureConfig { layers: vec![conv] };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_flatten_shape_mismatch() {
        let conv = LayerConfig {
            layer_type: "conv2d".to_string(),
            output_depth: Some(4),
            input_depth: Some(1),
            input_rows: Some(8),
            input_columns: Some(8),
            filter_rows: Some(3),
            filter_columns: Some(3),
            learning_rate: Some(0.1),
            ..LayerConfig::default()
        };
        let flatten = LayerConfig {
            layer_type: "flatten".to_string(),
            depth: Some(4),
            rows: Some(5),
            columns: Some(5),
            ..LayerConfig::default()
        };
        let config = ArchitectureConfig {
            layers: vec![conv, flatten],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_load_architecture() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let json_content = r#"{
  "layers": [
    {
      "layer_type": "dense",
      "input_size": 784,
      "output_size": 256,
      "learning_rate": 0.1
    },
    {
      "layer_type": "activation",
      "function": "sigmoid"
    },
    {
      "layer_type": "dense",
      "input_size": 256,
      "output_size": 10,
      "learning_rate": 0.1
    }
  ]
}"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let config = load_architecture(temp_path).unwrap();
        assert_eq!(config.layers.len(), 3);
        assert_eq!(config.layers[0].layer_type, "dense");
        assert_eq!(config.layers[0].input_size, Some(784));
        assert_eq!(config.layers[1].function.as_deref(), Some("sigmoid"));
        assert_eq!(config.layers[2].output_size, Some(10));
    }

    #[test]
    fn test_load_architecture_rejects_invalid_json() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{ not json").unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        assert!(load_architecture(temp_path).is_err());
    }

    #[test]
    fn test_load_architecture_missing_file() {
        assert!(load_architecture("config/architectures/does_not_exist.json").is_err());
    }

    #[test]
    fn test_build_network() {
        let config = ArchitectureConfig {
            layers: vec![
                dense(4, 3),
                activation("sigmoid"),
                dense(3, 2),
                activation("sigmoid"),
            ],
        };

        let mut rng = SimpleRng::new(42);
        let network = build_network(&config, &mut rng).unwrap();
        assert_eq!(network.len(), 4);
    }

    #[test]
    fn test_build_network_runs_forward() {
        use crate::matrix::Matrix;
        use crate::tensor::Tensor;

        let config = ArchitectureConfig {
            layers: vec![dense(4, 3), activation("sigmoid"), dense(3, 2)],
        };

        let mut rng = SimpleRng::new(42);
        let mut network = build_network(&config, &mut rng).unwrap();

        let input = Tensor::from_matrix(
            Matrix::from_rows(&[vec![1.0, 0.5, -0.5, 0.0]]).unwrap(),
        );
        let output = network.predict(&input).unwrap();
        assert_eq!(output.shape(), (1, 1, 2));
    }

    #[test]
    fn test_build_network_rejects_invalid_config() {
        let config = ArchitectureConfig {
            layers: vec![dense(784, 256), dense(128, 10)],
        };
        let mut rng = SimpleRng::new(42);
        assert!(build_network(&config, &mut rng).is_err());
    }

    #[test]
    fn test_example_configs() {
        let mnist = load_architecture("config/architectures/mnist_cnn.json");
        assert!(
            mnist.is_ok(),
            "Failed to load mnist_cnn.json: {:?}",
            mnist.err()
        );
        let mnist_config = mnist.unwrap();
        assert_eq!(mnist_config.layers[0].layer_type, "conv2d");
        assert_eq!(mnist_config.layers[0].output_depth, Some(16));
        assert_eq!(mnist_config.layers[0].input_rows, Some(28));

        let xor = load_architecture("config/architectures/xor_mlp.json");
        assert!(xor.is_ok(), "Failed to load xor_mlp.json: {:?}", xor.err());
        assert_eq!(xor.unwrap().layers.len(), 4);
    }
}
