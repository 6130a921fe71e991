//! Built-in two-input training sets (logic gates).

use serde::{Deserialize, Serialize};

/// One supervised example with a scalar target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub inputs: Vec<f64>,
    pub target: f64,
}

impl Example {
    pub fn new(inputs: impl Into<Vec<f64>>, target: f64) -> Self {
        Self {
            inputs: inputs.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Short lookup key, e.g. `"xor"`.
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub examples: Vec<Example>,
}

fn gate(key: &'static str, name: &'static str, description: &'static str, truth: [f64; 4]) -> Preset {
    let corners = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    Preset {
        key,
        name,
        description,
        examples: corners
            .into_iter()
            .zip(truth)
            .map(|(inputs, target)| Example::new(inputs, target))
            .collect(),
    }
}

pub fn xor() -> Preset {
    gate(
        "xor",
        "XOR Gate",
        "Output 1 when the inputs differ, 0 when they are the same",
        [0.0, 1.0, 1.0, 0.0],
    )
}

pub fn and() -> Preset {
    gate(
        "and",
        "AND Gate",
        "Output 1 only when both inputs are 1",
        [0.0, 0.0, 0.0, 1.0],
    )
}

pub fn or() -> Preset {
    gate(
        "or",
        "OR Gate",
        "Output 1 when at least one input is 1",
        [0.0, 1.0, 1.0, 1.0],
    )
}

pub fn presets() -> Vec<Preset> {
    vec![xor(), and(), or()]
}

/// Looks a preset up by key or display name, ignoring ASCII case.
pub fn preset(name: &str) -> Option<Preset> {
    let name = name.trim();
    presets()
        .into_iter()
        .find(|p| p.key.eq_ignore_ascii_case(name) || p.name.eq_ignore_ascii_case(name))
}
