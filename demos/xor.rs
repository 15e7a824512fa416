use brain_nn::{ActivationFunction, Brain, Cpu, LayerDefinition, TrainingExample};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> brain_nn::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut brain = Brain::<Cpu>::with_rng(
        &[
            LayerDefinition::new(2, ActivationFunction::Linear),
            LayerDefinition::new(2, ActivationFunction::Sigmoid),
            LayerDefinition::new(1, ActivationFunction::Sigmoid),
        ],
        &mut rng,
    )?;
    brain.set_learning_rate(3.0)?;
    brain.set_mini_batch_size(1)?;

    let examples: Vec<TrainingExample<Cpu>> = (0..4u8)
        .map(|i| {
            let (a, b) = (i & 1, i >> 1);
            TrainingExample::from_slices(&[a as f32, b as f32], &[(a ^ b) as f32])
        })
        .collect();

    let epochs = 5000;
    for epoch in 0..epochs {
        let loss = brain.train_epoch(&examples, &mut rng)?;
        if epoch % 500 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}");
        }
    }

    for example in &examples {
        let input = example.input.to_vec();
        println!("Input: {:?} -> Output: {:.4}", input, brain.predict(&example.input)?.get(0));
    }
    Ok(())
}
