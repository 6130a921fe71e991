//! A small neural network playground core.
//!
//! `nn-playground` is the compute engine behind an interactive MLP simulator: a dense
//! feed-forward network trained one example at a time with plain SGD, plus the read-only
//! sampling helpers a 2-D visualization needs and a JSON persistence layer.
//!
//! # Model
//!
//! - Scalars are `f64`.
//! - Topology is a list of layer widths, e.g. `[2, 4, 3, 1]`. A "stage" is the connection
//!   between layer `l` and layer `l + 1`.
//! - Weights are indexed `[stage][dest][source]` and stored flat per stage (see
//!   [`Parameters`]).
//! - One [`Activation`] applies to every non-input layer, output included.
//!
//! # Panics vs `Result`
//!
//! Everything that takes caller data ([`Network::forward`], [`Network::train`],
//! [`Network::load_state`], the sampling helpers) validates it and returns [`Result`].
//! Raw index accessors such as [`Network::weight`] panic on out-of-range indices, like
//! slice indexing.
//!
//! # Quick start
//!
//! ```rust
//! use nn_playground::{Network, presets};
//!
//! # fn main() -> nn_playground::Result<()> {
//! let mut net = Network::with_seed(&[2, 4, 1], 0.5, 0)?;
//! let xor = presets::xor();
//!
//! for _ in 0..5000 {
//!     for ex in &xor.examples {
//!         net.train(&ex.inputs, &[ex.target])?;
//!     }
//! }
//!
//! let boundary = net.decision_boundary(0.0, 1.0, 0.0, 1.0, 10)?;
//! assert_eq!(boundary.len(), 121);
//!
//! let json = net.to_json_string()?;
//! let restored = Network::from_json_str(&json)?;
//! assert_eq!(restored.forward(&[1.0, 0.0])?, net.forward(&[1.0, 0.0])?);
//! Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod error;
pub(crate) mod init;
pub mod network;
pub mod params;
pub mod points;
pub mod presets;
pub mod sampling;
pub mod session;
pub mod state;
pub mod storage;

pub use activation::Activation;
pub use config::NetworkConfig;
pub use error::{Error, Result};
pub use network::{DEFAULT_LEARNING_RATE, Network, Scratch};
pub use params::Parameters;
pub use points::{PointLog, TRAINING_POINT_CAPACITY, TrainingPoint};
pub use presets::{Example, Preset};
pub use sampling::{BoundaryPoint, GRADIENT_EPSILON, GradientPoint, Grid};
pub use session::{SessionConfig, TrainingSession};
pub use state::NetworkState;
pub use storage::{
    AppSettings, FileStore, KeyValueStore, MemoryStore, NetworkRepository, StoredNetwork, Theme,
    TrainingData,
};
