//! Activation functions.
//!
//! Each stage computes a pre-activation value `z = W a + b` and then applies the
//! network-wide activation element-wise. Backprop needs `f'(z)` at the same `z`,
//! so value and derivative come out of a single dispatch ([`Activation::eval`]);
//! there is no way to swap one without the other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Element-wise activation function, shared by every stage of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
    ReLU,
}

impl Activation {
    pub const ALL: [Activation; 3] = [Activation::Sigmoid, Activation::Tanh, Activation::ReLU];

    /// Value and derivative at pre-activation `z`.
    #[inline]
    pub fn eval(self, z: f64) -> (f64, f64) {
        match self {
            Activation::Sigmoid => {
                let s = sigmoid(z);
                (s, s * (1.0 - s))
            }
            Activation::Tanh => {
                let t = z.tanh();
                (t, 1.0 - t * t)
            }
            Activation::ReLU => {
                if z > 0.0 {
                    (z, 1.0)
                } else {
                    (0.0, 0.0)
                }
            }
        }
    }

    #[inline]
    pub fn apply(self, z: f64) -> f64 {
        self.eval(z).0
    }

    #[inline]
    pub fn derivative(self, z: f64) -> f64 {
        self.eval(z).1
    }

    /// Identifier used in serialized state and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::ReLU => "relu",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Activation::ALL
            .into_iter()
            .find(|act| act.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnsupportedActivation(s.to_owned()))
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
