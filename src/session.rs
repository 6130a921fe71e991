use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::presets::{Example, Preset};
use crate::{Error, Network, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// `train` calls per [`TrainingSession::tick`].
    pub iterations_per_tick: usize,
    /// Error history entries kept; older ones are dropped.
    pub max_history: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            iterations_per_tick: 10,
            max_history: 1000,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations_per_tick == 0 {
            return Err(Error::InvalidConfig(
                "iterations_per_tick must be > 0".to_owned(),
            ));
        }
        if self.max_history == 0 {
            return Err(Error::InvalidConfig("max_history must be > 0".to_owned()));
        }
        Ok(())
    }
}

/// Drives a network through repeated passes over a small example set.
///
/// Each [`tick`](TrainingSession::tick) is a batch of single-example `train`
/// calls; the mean error of the batch is appended to the history that a
/// progress chart would plot.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    network: Network,
    examples: Vec<Example>,
    config: SessionConfig,
    cursor: usize,
    iterations: u64,
    history: VecDeque<f64>,
}

fn check_examples(network: &Network, examples: &[Example]) -> Result<()> {
    if examples.is_empty() {
        return Err(Error::InvalidConfig(
            "training session needs at least one example".to_owned(),
        ));
    }
    if network.output_width() != 1 {
        return Err(Error::TargetSizeMismatch {
            expected: network.output_width(),
            got: 1,
        });
    }
    if let Some(bad) = examples
        .iter()
        .find(|e| e.inputs.len() != network.input_width())
    {
        return Err(Error::InputSizeMismatch {
            expected: network.input_width(),
            got: bad.inputs.len(),
        });
    }
    Ok(())
}

impl TrainingSession {
    pub fn new(network: Network, examples: Vec<Example>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        check_examples(&network, &examples)?;
        Ok(Self {
            network,
            examples,
            config,
            cursor: 0,
            iterations: 0,
            history: VecDeque::with_capacity(config.max_history.min(4096)),
        })
    }

    pub fn from_preset(network: Network, preset: &Preset, config: SessionConfig) -> Result<Self> {
        Self::new(network, preset.examples.clone(), config)
    }

    /// Runs one batch and returns its mean training error.
    pub fn tick(&mut self) -> Result<f64> {
        let mut total = 0.0;
        for _ in 0..self.config.iterations_per_tick {
            let example = &self.examples[self.cursor];
            total += self.network.train(&example.inputs, &[example.target])?;
            self.cursor = (self.cursor + 1) % self.examples.len();
        }
        self.iterations += self.config.iterations_per_tick as u64;

        let mean = total / self.config.iterations_per_tick as f64;
        if self.history.len() == self.config.max_history {
            self.history.pop_front();
        }
        self.history.push_back(mean);
        Ok(mean)
    }

    /// Runs `ticks` batches; returns the last batch error.
    pub fn run(&mut self, ticks: usize) -> Result<Option<f64>> {
        let mut last = None;
        for _ in 0..ticks {
            last = Some(self.tick()?);
        }
        if let Some(error) = last {
            debug!(
                "session ran {ticks} ticks, {} iterations total, error={error:.6}",
                self.iterations
            );
        }
        Ok(last)
    }

    /// Mean error of each tick, oldest first.
    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Total `train` calls since the last reset.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the network, e.g. for `set_learning_rate`. History is kept.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Swaps in a new network (new topology, activation or loaded state) and
    /// starts the history over.
    pub fn reset(&mut self, network: Network) -> Result<()> {
        check_examples(&network, &self.examples)?;
        self.network = network;
        self.clear_history();
        Ok(())
    }

    pub fn set_examples(&mut self, examples: Vec<Example>) -> Result<()> {
        check_examples(&self.network, &examples)?;
        self.examples = examples;
        self.cursor = 0;
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.cursor = 0;
        self.iterations = 0;
    }
}
