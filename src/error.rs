use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidTopology(String),
    InvalidLearningRate(f64),
    UnsupportedActivation(String),
    InputSizeMismatch { expected: usize, got: usize },
    TargetSizeMismatch { expected: usize, got: usize },
    InvalidState(String),
    InvalidGrid(String),
    InvalidConfig(String),
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTopology(msg) => write!(f, "invalid topology: {msg}"),
            Error::InvalidLearningRate(lr) => {
                write!(f, "invalid learning rate: must be finite and > 0, got {lr}")
            }
            Error::UnsupportedActivation(name) => {
                write!(f, "unsupported activation {name:?}; expected sigmoid, tanh or relu")
            }
            Error::InputSizeMismatch { expected, got } => {
                write!(f, "input size {got} does not match network input width {expected}")
            }
            Error::TargetSizeMismatch { expected, got } => {
                write!(f, "target size {got} does not match network output width {expected}")
            }
            Error::InvalidState(msg) => write!(f, "invalid network state: {msg}"),
            Error::InvalidGrid(msg) => write!(f, "invalid sampling grid: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}
