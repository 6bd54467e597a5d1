// Tests for JSON architecture loading and network assembly.

use std::io::Write;

use convnet::architecture::{build_network, load_architecture};
use convnet::matrix::Matrix;
use convnet::tensor::Tensor;
use convnet::utils::rng::SimpleRng;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_and_build_mlp() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "dense", "input_size": 4, "output_size": 8, "learning_rate": 0.1 },
    { "layer_type": "activation", "function": "sigmoid" },
    { "layer_type": "dense", "input_size": 8, "output_size": 3, "learning_rate": 0.1 },
    { "layer_type": "activation", "function": "softmax" }
  ]
}"#,
    );

    let config = load_architecture(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.layers.len(), 4);

    let mut rng = SimpleRng::new(42);
    let mut network = build_network(&config, &mut rng).unwrap();

    let input = Tensor::from_matrix(
        Matrix::from_rows(&[vec![0.1, 0.2, 0.3, 0.4]]).unwrap(),
    );
    let output = network.predict(&input).unwrap();
    assert_eq!(output.shape(), (1, 1, 3));

    let sum: f64 = output.to_flat_vec().iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_load_and_build_cnn() {
    let file = write_config(
        r#"{
  "layers": [
    {
      "layer_type": "conv2d",
      "output_depth": 2,
      "input_depth": 1,
      "input_rows": 8,
      "input_columns": 8,
      "filter_rows": 3,
      "filter_columns": 3,
      "learning_rate": 0.1
    },
    { "layer_type": "activation", "function": "relu" },
    { "layer_type": "max_pool", "window_size": 2, "stride": 2 },
    { "layer_type": "flatten", "depth": 2, "rows": 3, "columns": 3 },
    { "layer_type": "dense", "input_size": 18, "output_size": 5, "learning_rate": 0.1 },
    { "layer_type": "activation", "function": "sigmoid" }
  ]
}"#,
    );

    let config = load_architecture(file.path().to_str().unwrap()).unwrap();
    let mut rng = SimpleRng::new(42);
    let mut network = build_network(&config, &mut rng).unwrap();
    assert_eq!(network.len(), 6);

    let input = Tensor::new(1, 8, 8).unwrap().map(|_| 0.5);
    let output = network.predict(&input).unwrap();
    assert_eq!(output.shape(), (1, 1, 5));
}

#[test]
fn test_rejects_shape_mismatch_between_layers() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "dense", "input_size": 4, "output_size": 8, "learning_rate": 0.1 },
    { "layer_type": "dense", "input_size": 9, "output_size": 3, "learning_rate": 0.1 }
  ]
}"#,
    );

    assert!(load_architecture(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_rejects_missing_required_field() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "dense", "input_size": 4, "learning_rate": 0.1 }
  ]
}"#,
    );

    assert!(load_architecture(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_rejects_unknown_layer_type() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "attention" }
  ]
}"#,
    );

    assert!(load_architecture(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_same_seed_builds_identical_networks() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "dense", "input_size": 3, "output_size": 2, "learning_rate": 0.1 }
  ]
}"#,
    );
    let config = load_architecture(file.path().to_str().unwrap()).unwrap();

    let mut rng1 = SimpleRng::new(99);
    let mut network1 = build_network(&config, &mut rng1).unwrap();
    let mut rng2 = SimpleRng::new(99);
    let mut network2 = build_network(&config, &mut rng2).unwrap();

    let input = Tensor::from_matrix(Matrix::from_rows(&[vec![1.0, 2.0, 3.0]]).unwrap());
    assert_eq!(
        network1.predict(&input).unwrap(),
        network2.predict(&input).unwrap()
    );
}
