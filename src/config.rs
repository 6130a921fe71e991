//! Network configuration.
//!
//! A `NetworkConfig` describes how to build a fresh network: topology,
//! learning rate, activation and an optional seed. It can be read from a JSON
//! file; absent fields fall back to the defaults (`[2, 4, 3, 1]`, `0.1`,
//! sigmoid, OS-seeded init).

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::network::{DEFAULT_LEARNING_RATE, validate_learning_rate};
use crate::params::validate_topology;
use crate::{Activation, Error, Network, Result};

pub const DEFAULT_LAYERS: [usize; 4] = [2, 4, 3, 1];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub layers: Vec<usize>,
    pub learning_rate: f64,
    pub activation: Activation,
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS.to_vec(),
            learning_rate: DEFAULT_LEARNING_RATE,
            activation: Activation::default(),
            seed: None,
        }
    }
}

impl NetworkConfig {
    /// Same checks as network construction.
    pub fn validate(&self) -> Result<()> {
        validate_topology(&self.layers)?;
        validate_learning_rate(self.learning_rate)
    }

    pub fn build(&self) -> Result<Network> {
        self.validate()?;
        let mut network = match self.seed {
            Some(seed) => Network::with_seed(&self.layers, self.learning_rate, seed)?,
            None => Network::with_learning_rate(&self.layers, self.learning_rate)?,
        };
        network.set_activation(self.activation);
        Ok(network)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: NetworkConfig = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Storage(format!("failed to read {}: {e}", p.display())))?;
        let cfg = Self::from_json_str(&s)?;
        debug!("loaded config from {}: {cfg:?}", p.display());
        Ok(cfg)
    }
}
