//! Headless playground run: trains a network on the XOR gate, prints the
//! learned truth table and an ASCII decision boundary.
//!
//! Usage: `nn-playground [config.json] [out-state.json]`

use std::env;
use std::process::ExitCode;

use log::{error, info};

use nn_playground::{Network, NetworkConfig, SessionConfig, TrainingSession, presets};

const TICKS: usize = 1_000;
const REPORT_EVERY: usize = 100;
const BOUNDARY_RESOLUTION: usize = 20;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> nn_playground::Result<()> {
    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => NetworkConfig::from_json_file(path)?,
        None => NetworkConfig {
            learning_rate: 0.5,
            seed: Some(0),
            ..NetworkConfig::default()
        },
    };
    let output = args.next();

    let network = config.build()?;
    info!(
        "network layers={:?} activation={} lr={}",
        network.layers(),
        network.activation(),
        network.learning_rate()
    );

    let xor = presets::xor();
    let mut session = TrainingSession::from_preset(network, &xor, SessionConfig::default())?;
    for chunk in 0..TICKS / REPORT_EVERY {
        if let Some(error) = session.run(REPORT_EVERY)? {
            info!(
                "ticks={} iterations={} error={error:.6}",
                (chunk + 1) * REPORT_EVERY,
                session.iterations()
            );
        }
    }

    let network = session.into_network();
    println!("{}", xor.name);
    for ex in &xor.examples {
        let y = network.predict_point(ex.inputs[0], ex.inputs[1])?;
        println!("  {:?} -> {y:.4} (target {})", ex.inputs, ex.target);
    }
    println!();
    print_boundary(&network)?;

    if let Some(path) = output {
        network.save_json(&path)?;
        info!("saved network state to {path}");
    }
    Ok(())
}

// Rows are y from 1 down to 0, columns are x from 0 to 1.
fn print_boundary(network: &Network) -> nn_playground::Result<()> {
    let n = BOUNDARY_RESOLUTION;
    let points = network.decision_boundary(0.0, 1.0, 0.0, 1.0, n)?;
    for j in (0..=n).rev() {
        let row: String = (0..=n)
            .map(|i| match points[i * (n + 1) + j].value {
                v if v >= 0.75 => '#',
                v if v >= 0.5 => '+',
                v if v >= 0.25 => '.',
                _ => ' ',
            })
            .collect();
        println!("|{row}|");
    }
    Ok(())
}
