//! Math Function Optimization
//!
//! This example maximizes a rippled landscape over a binary-encoded
//! coordinate space:
//!
//! ```text
//! f(x) = -(s^0.25) * (sin²(50 * s^0.1) + 1),  s = Σ(xᵢ - 10)²
//! ```
//!
//! Each coordinate is encoded with 12 bits and decoded as `value / 100`, so
//! coordinates range over `[0, 40.95]`. The global maximum of 0 sits at
//! `(10, 10, ...)`.
//!
//! Usage:
//!
//! ```text
//! cargo run --example math_function_optimizer -- [config.json]
//! RUST_LOG=debug cargo run --example math_function_optimizer
//! ```

use std::sync::Arc;

use evolve_ga::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config() -> Result<RunConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(RunConfig::from_json(&json)?)
        }
        None => Ok(RunConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    config.validate()?;
    info!(config = %config.to_json()?, "configuration");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let landscape = RippledPeak::default();
    let initial: Population<Coordinates> = Population::random(
        config.population_size,
        config.encoding_length(),
        Arc::new(landscape.clone()),
        Arc::new(config.decoder()?),
        &mut rng,
    )?;

    let recorder = StatisticsRecorder::new();
    let mut ga = config
        .builder()?
        .listener(PopulationStatisticsLogger::every(10))
        .listener(recorder.clone())
        .build()?;
    let mut stop = config.stopping_condition()?;

    let result = ga.evolve(initial, &mut stop, config.parallelism)?;

    let best = result.fittest().ok_or(EvolutionError::EmptyPopulation)?;
    let optimum = vec![landscape.target(); config.dimension];
    println!("Optimization complete!");
    println!("  Generations:  {}", ga.generations_evolved());
    println!("  Stopped:      {}", ga.termination_reason().unwrap_or("unknown"));
    println!("  Best fitness: {:.6}", best.fitness());
    println!("  Best point:   {}", best.decode());
    println!("  Chromosome:   {}", best);
    println!(
        "  Distance from optimum: {:.4}",
        best.decode().distance_to(&optimum)
    );

    let history = recorder.best_history();
    if let (Some(first), Some(last)) = (history.first(), history.last()) {
        println!("  Best fitness went from {first:.4} to {last:.4}");
    }

    Ok(())
}
