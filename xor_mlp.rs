use convnet::error::Result;
use convnet::layers::{ActivationLayer, DenseLayer};
use convnet::matrix::Matrix;
use convnet::network::Network;
use convnet::tensor::Tensor;
use convnet::utils::rng::SimpleRng;

// Small MLP to learn XOR (educational example).
const NUM_INPUTS: usize = 2;
const NUM_HIDDEN: usize = 4;
const NUM_OUTPUTS: usize = 1;
// Training hyperparameters.
const LEARNING_RATE: f64 = 0.5;
const EPOCHS: usize = 10_000;

// XOR dataset (binary inputs and expected outputs).
const INPUTS: [[f64; NUM_INPUTS]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const EXPECTED: [[f64; NUM_OUTPUTS]; 4] = [[0.0], [1.0], [1.0], [0.0]];

fn row_tensor(values: &[f64]) -> Result<Tensor> {
    Ok(Tensor::from_matrix(Matrix::from_rows(&[values.to_vec()])?))
}

// Network with one hidden layer and one output layer, sigmoid throughout.
fn initialize_network(rng: &mut SimpleRng) -> Result<Network> {
    let mut network = Network::new();
    network.add_layer(Box::new(DenseLayer::new(
        NUM_INPUTS,
        NUM_HIDDEN,
        LEARNING_RATE,
        rng,
    )?));
    network.add_layer(Box::new(ActivationLayer::new("sigmoid")?));
    network.add_layer(Box::new(DenseLayer::new(
        NUM_HIDDEN,
        NUM_OUTPUTS,
        LEARNING_RATE,
        rng,
    )?));
    network.add_layer(Box::new(ActivationLayer::new("sigmoid")?));
    Ok(network)
}

fn train(network: &mut Network) -> Result<()> {
    for epoch in 0..EPOCHS {
        let mut total_error = 0.0;

        for (input, expected) in INPUTS.iter().zip(EXPECTED.iter()) {
            let input = row_tensor(input)?;
            let expected = row_tensor(expected)?;

            let output = network.predict(&input)?;
            for error in output.sub(&expected)?.to_flat_vec() {
                total_error += error * error;
            }

            network.train(&input, &expected)?;
        }

        // Average loss per epoch, printed every 1000 epochs.
        if (epoch + 1) % 1000 == 0 {
            let loss = total_error / INPUTS.len() as f64;
            println!("Epoch {}, Error: {:.6}", epoch + 1, loss);
        }
    }
    Ok(())
}

// Simple evaluation on the four XOR samples.
fn evaluate(network: &mut Network) -> Result<()> {
    println!("\nTesting the trained network:");
    for (input, expected) in INPUTS.iter().zip(EXPECTED.iter()) {
        let output = network.predict(&row_tensor(input)?)?;
        let predicted = output.channel(0)?.get(0, 0)?;
        println!(
            "Input: {:.1}, {:.1}, Expected Output: {:.1}, Predicted Output: {:.3}",
            input[0], input[1], expected[0], predicted
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Fixed initial seed for reproducibility.
    let mut rng = SimpleRng::new(42);

    let mut network = initialize_network(&mut rng)?;
    train(&mut network)?;
    evaluate(&mut network)
}
