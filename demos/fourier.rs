//! Fits a small RGB image from Fourier features of the pixel coordinates and
//! prints the reconstruction as ASCII brightness.

use std::f32::consts::TAU;
use std::sync::mpsc;
use std::thread;

use brain_nn::{train_loop, ActivationFunction, Brain, Cpu, LayerDefinition, TrainConfig, TrainingExample};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ORDER: usize = 8;
const SIDE: usize = 24;

fn fourier_series(x: f32, y: f32) -> Vec<f32> {
    let (x, y) = (x * TAU, y * TAU);
    (1..=ORDER)
        .flat_map(|k| {
            let k = k as f32;
            [(x * k).sin(), (x * k).cos(), (y * k).sin(), (y * k).cos()]
        })
        .collect()
}

/// Concentric rings, red outside and blue inside.
fn pixel(x: f32, y: f32) -> [f32; 3] {
    let r = ((x - 0.5).powi(2) + (y - 0.5).powi(2)).sqrt();
    let ring = if ((r * 8.0) as usize) % 2 == 0 { 1.0 } else { 0.0 };
    [ring * r * 2.0, 0.5 * ring, ring * (1.0 - r * 2.0).max(0.0)]
}

fn main() -> brain_nn::Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut brain = Brain::<Cpu>::with_rng(
        &[
            LayerDefinition::new(ORDER * 4, ActivationFunction::Linear),
            LayerDefinition::new(32, ActivationFunction::LeakyReLU),
            LayerDefinition::new(32, ActivationFunction::LeakyReLU),
            LayerDefinition::new(3, ActivationFunction::Sigmoid),
        ],
        &mut rng,
    )?;
    brain.set_learning_rate(0.5)?;
    brain.set_mini_batch_size(16)?;

    let coordinates: Vec<(f32, f32)> = (0..SIDE * SIDE)
        .map(|i| ((i % SIDE) as f32 / SIDE as f32, (i / SIDE) as f32 / SIDE as f32))
        .collect();
    let examples: Vec<TrainingExample<Cpu>> = coordinates
        .iter()
        .map(|&(x, y)| TrainingExample::from_slices(&fourier_series(x, y), &pixel(x, y)))
        .collect();

    let (tx, rx) = mpsc::channel::<brain_nn::EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 25 == 0 {
                println!("Epoch {}/{}: loss = {:.6}", stats.epoch, stats.total_epochs, stats.train_loss);
            }
        }
    });

    let config = TrainConfig::new(200).with_target_loss(1e-3).with_progress(tx);
    let loss = train_loop(&mut brain, &examples, &config, &mut rng)?;
    drop(config);
    let _ = printer.join();
    println!("Final loss: {loss:.6}");

    let shades = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
    for row in coordinates.chunks(SIDE) {
        let mut line = String::with_capacity(SIDE);
        for &(x, y) in row {
            let rgb = brain.predict_slice(&fourier_series(x, y))?;
            let brightness = rgb.sum() / 3.0;
            let index = ((brightness * shades.len() as f32) as usize).min(shades.len() - 1);
            line.push(shades[index]);
        }
        println!("{line}");
    }
    Ok(())
}
