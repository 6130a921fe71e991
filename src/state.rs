//! Serialized network state.
//!
//! This is the save/load format exchanged with the UI and the persistence layer:
//!
//! ```json
//! {
//!   "layers": [2, 3, 1],
//!   "weights": [[[0.1, -0.4], ...], ...],
//!   "biases": [[0.0, 0.0, 0.0], [0.0]],
//!   "activation": "sigmoid",
//!   "learningRate": 0.1
//! }
//! ```
//!
//! Weights are nested `[stage][dest][source]`, biases `[stage][dest]`. Every
//! load validates the full shape before any live network is touched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::network::validate_learning_rate;
use crate::params::validate_topology;
use crate::{Activation, Error, Network, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub layers: Vec<usize>,
    pub weights: Vec<Vec<Vec<f64>>>,
    pub biases: Vec<Vec<f64>>,
    pub activation: Activation,
    pub learning_rate: f64,
}

impl NetworkState {
    /// Checks topology, tensor shapes, finiteness and learning rate.
    pub fn validate(&self) -> Result<()> {
        validate_topology(&self.layers).map_err(|e| Error::InvalidState(e.to_string()))?;
        validate_learning_rate(self.learning_rate)
            .map_err(|e| Error::InvalidState(e.to_string()))?;

        let stages = self.layers.len() - 1;
        if self.weights.len() != stages {
            return Err(Error::InvalidState(format!(
                "weights has {} stages, topology needs {stages}",
                self.weights.len()
            )));
        }
        if self.biases.len() != stages {
            return Err(Error::InvalidState(format!(
                "biases has {} stages, topology needs {stages}",
                self.biases.len()
            )));
        }

        for (stage, pair) in self.layers.windows(2).enumerate() {
            let (fan_in, fan_out) = (pair[0], pair[1]);

            let rows = &self.weights[stage];
            if rows.len() != fan_out {
                return Err(Error::InvalidState(format!(
                    "weights[{stage}] has {} rows, expected {fan_out}",
                    rows.len()
                )));
            }
            for (dest, row) in rows.iter().enumerate() {
                if row.len() != fan_in {
                    return Err(Error::InvalidState(format!(
                        "weights[{stage}][{dest}] has {} entries, expected {fan_in}",
                        row.len()
                    )));
                }
            }
            if self.biases[stage].len() != fan_out {
                return Err(Error::InvalidState(format!(
                    "biases[{stage}] has {} entries, expected {fan_out}",
                    self.biases[stage].len()
                )));
            }
        }

        let all_finite = self.weights.iter().flatten().flatten().all(|v| v.is_finite())
            && self.biases.iter().flatten().all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::InvalidState(
                "weights and biases must contain only finite values".to_owned(),
            ));
        }

        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::InvalidState(format!("failed to serialize state: {e}")))
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidState(format!("failed to serialize state: {e}")))
    }

    /// Parses and validates a state. Missing fields, unknown activations and
    /// shape mismatches all surface as [`Error::InvalidState`].
    pub fn from_json_str(s: &str) -> Result<Self> {
        let state: NetworkState = serde_json::from_str(s)
            .map_err(|e| Error::InvalidState(format!("failed to parse state json: {e}")))?;
        state.validate()?;
        Ok(state)
    }
}

impl From<&Network> for NetworkState {
    fn from(network: &Network) -> Self {
        network.state()
    }
}

impl TryFrom<NetworkState> for Network {
    type Error = Error;

    fn try_from(value: NetworkState) -> std::result::Result<Self, Self::Error> {
        Network::from_state(&value)
    }
}

impl Network {
    pub fn to_json_string(&self) -> Result<String> {
        self.state().to_json_string()
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        self.state().to_json_string_pretty()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let state = NetworkState::from_json_str(s)?;
        Network::from_state(&state)
    }

    /// Replaces this network's state from JSON text; untouched on error.
    pub fn load_json_str(&mut self, s: &str) -> Result<()> {
        let state = NetworkState::from_json_str(s)?;
        self.load_state(&state)
    }

    /// Save the state to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", p.display())))
    }

    /// Load a network from a JSON state file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Storage(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}
