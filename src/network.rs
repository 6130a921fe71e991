use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::{Parameters, validate_topology};
use crate::points::{PointLog, TrainingPoint};
use crate::{Activation, Error, NetworkState, Result};

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// A dense feedforward network trained one example at a time with plain SGD.
#[derive(Debug, Clone)]
pub struct Network {
    params: Parameters,
    activation: Activation,
    learning_rate: f64,
    // Reused by `train`; never observable from outside.
    scratch: Scratch,
    points: PointLog,
}

/// Reusable buffers for a forward pass.
///
/// Holds every stage's pre-activations (`z`) and every layer's activations,
/// with `activations[0]` being a copy of the input. Backprop also keeps its
/// per-stage deltas here.
#[derive(Debug, Clone)]
pub struct Scratch {
    pre_activations: Vec<Vec<f64>>,
    activations: Vec<Vec<f64>>,
    deltas: Vec<Vec<f64>>,
}

pub(crate) fn validate_learning_rate(lr: f64) -> Result<()> {
    if lr.is_finite() && lr > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidLearningRate(lr))
    }
}

impl Network {
    /// Random initialization seeded from the OS, default learning rate.
    pub fn new(layers: &[usize]) -> Result<Self> {
        Self::with_learning_rate(layers, DEFAULT_LEARNING_RATE)
    }

    pub fn with_learning_rate(layers: &[usize], learning_rate: f64) -> Result<Self> {
        let mut rng = StdRng::from_os_rng();
        Self::with_rng(layers, learning_rate, &mut rng)
    }

    /// Deterministic initialization.
    pub fn with_seed(layers: &[usize], learning_rate: f64, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(layers, learning_rate, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(
        layers: &[usize],
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<Self> {
        validate_topology(layers)?;
        validate_learning_rate(learning_rate)?;

        let params = Parameters::random(layers, rng)?;
        debug!(
            "initialized network layers={layers:?} params={} lr={learning_rate}",
            params.len()
        );
        Ok(Self::from_parts(params, Activation::default(), learning_rate))
    }

    /// Builds a network from a serialized state.
    pub fn from_state(state: &NetworkState) -> Result<Self> {
        state.validate()?;
        let params = Parameters::from_nested(&state.layers, &state.weights, &state.biases)?;
        Ok(Self::from_parts(params, state.activation, state.learning_rate))
    }

    fn from_parts(params: Parameters, activation: Activation, learning_rate: f64) -> Self {
        let scratch = Scratch::for_layers(params.layers());
        Self {
            params,
            activation,
            learning_rate,
            scratch,
            points: PointLog::default(),
        }
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        self.params.layers()
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.layers()[0]
    }

    #[inline]
    pub fn output_width(&self) -> usize {
        self.layers()[self.layers().len() - 1]
    }

    #[inline]
    pub fn num_stages(&self) -> usize {
        self.params.num_stages()
    }

    #[inline]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    #[inline]
    pub fn weight(&self, stage: usize, dest: usize, source: usize) -> f64 {
        self.params.weight(stage, dest, source)
    }

    #[inline]
    pub fn bias(&self, stage: usize, dest: usize) -> f64 {
        self.params.bias(stage, dest)
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Swaps the activation (value and derivative together). Weights are kept.
    pub fn set_activation(&mut self, activation: Activation) {
        if activation != self.activation {
            debug!("activation {} -> {}", self.activation, activation);
        }
        self.activation = activation;
    }

    /// Like [`Network::set_activation`], from an identifier such as `"relu"`.
    pub fn set_activation_name(&mut self, name: &str) -> Result<()> {
        let activation = name.parse()?;
        self.set_activation(activation);
        Ok(())
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    /// Recent `(input, target)` pairs passed to [`Network::train`], oldest first.
    #[inline]
    pub fn training_points(&self) -> &PointLog {
        &self.points
    }

    pub fn clear_training_points(&mut self) {
        self.points.clear();
    }

    pub fn scratch(&self) -> Scratch {
        Scratch::for_layers(self.layers())
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_width() {
            return Err(Error::InputSizeMismatch {
                expected: self.input_width(),
                got: input.len(),
            });
        }
        Ok(())
    }

    fn check_target(&self, target: &[f64]) -> Result<()> {
        if target.len() != self.output_width() {
            return Err(Error::TargetSizeMismatch {
                expected: self.output_width(),
                got: target.len(),
            });
        }
        Ok(())
    }

    /// Forward pass. Does not touch network state.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut scratch = self.scratch();
        self.forward_with(input, &mut scratch).map(<[f64]>::to_vec)
    }

    /// Forward pass into caller-owned buffers; returns the output layer.
    ///
    /// A scratch built for a different topology is rebuilt first.
    pub fn forward_with<'a>(&self, input: &[f64], scratch: &'a mut Scratch) -> Result<&'a [f64]> {
        self.check_input(input)?;
        scratch.fit(self.layers());
        Ok(propagate(&self.params, self.activation, input, scratch))
    }

    /// One backpropagation + gradient-descent step on a single example.
    ///
    /// Returns the mean squared error `mean((output[m] - target[m])^2)` of the
    /// outputs computed before the update. Size mismatches are rejected before
    /// anything is mutated.
    pub fn train(&mut self, inputs: &[f64], targets: &[f64]) -> Result<f64> {
        self.check_input(inputs)?;
        self.check_target(targets)?;

        let Self {
            params,
            activation,
            learning_rate,
            scratch,
            points,
        } = self;
        let (activation, lr) = (*activation, *learning_rate);

        scratch.fit(params.layers());
        propagate(params, activation, inputs, scratch);

        let last = params.num_stages() - 1;

        // Output deltas: dL/dz for L = 0.5 * sum((a - t)^2).
        let mut sum_sq = 0.0;
        {
            let outputs = &scratch.activations[last + 1];
            let z = &scratch.pre_activations[last];
            let delta = &mut scratch.deltas[last];
            for m in 0..outputs.len() {
                let diff = outputs[m] - targets[m];
                sum_sq = diff.mul_add(diff, sum_sq);
                delta[m] = diff * activation.derivative(z[m]);
            }
        }

        // Hidden deltas, using the next stage's weights before they are updated.
        for stage in (0..last).rev() {
            let (lower, upper) = scratch.deltas.split_at_mut(stage + 1);
            let delta = &mut lower[stage];
            let next_delta = &upper[0];
            let next_weights = params.stage_weights(stage + 1);
            let width = delta.len();
            let z = &scratch.pre_activations[stage];

            for j in 0..width {
                let mut sum = 0.0;
                for (m, &d) in next_delta.iter().enumerate() {
                    sum = next_weights[m * width + j].mul_add(d, sum);
                }
                delta[j] = sum * activation.derivative(z[j]);
            }
        }

        for stage in 0..=last {
            params.descend(stage, &scratch.deltas[stage], &scratch.activations[stage], lr);
        }

        points.push(TrainingPoint {
            input: inputs.to_vec(),
            target: targets[0],
        });

        let error = sum_sq / targets.len() as f64;
        trace!("train input={inputs:?} target={targets:?} error={error}");
        Ok(error)
    }

    /// Deep copy of the full network state.
    pub fn state(&self) -> NetworkState {
        let (weights, biases) = self.params.to_nested();
        NetworkState {
            layers: self.layers().to_vec(),
            weights,
            biases,
            activation: self.activation,
            learning_rate: self.learning_rate,
        }
    }

    /// Replaces topology, parameters, activation and learning rate.
    ///
    /// All-or-nothing: on error the network is left exactly as it was.
    /// The training point log is cleared since it may no longer match the topology.
    pub fn load_state(&mut self, state: &NetworkState) -> Result<()> {
        let loaded = Self::from_state(state)?;
        debug!(
            "loaded state layers={:?} activation={} lr={}",
            loaded.layers(),
            loaded.activation,
            loaded.learning_rate
        );
        *self = loaded;
        Ok(())
    }
}

fn propagate<'a>(
    params: &Parameters,
    activation: Activation,
    input: &[f64],
    scratch: &'a mut Scratch,
) -> &'a [f64] {
    scratch.activations[0].copy_from_slice(input);

    for stage in 0..params.num_stages() {
        let (done, rest) = scratch.activations.split_at_mut(stage + 1);
        let inputs = &done[stage];
        let outputs = &mut rest[0];
        let z = &mut scratch.pre_activations[stage];

        let weights = params.stage_weights(stage);
        let biases = params.stage_biases(stage);
        let fan_in = inputs.len();

        for (j, row) in weights.chunks_exact(fan_in).enumerate() {
            let mut sum = biases[j];
            for (&w, &x) in row.iter().zip(inputs.iter()) {
                sum = w.mul_add(x, sum);
            }
            z[j] = sum;
            outputs[j] = activation.apply(sum);
        }
    }

    scratch.output()
}

impl Scratch {
    pub fn for_layers(layers: &[usize]) -> Self {
        let activations: Vec<Vec<f64>> = layers.iter().map(|&w| vec![0.0; w]).collect();
        let pre_activations = activations[1..].to_vec();
        Self {
            deltas: pre_activations.clone(),
            pre_activations,
            activations,
        }
    }

    fn fits(&self, layers: &[usize]) -> bool {
        self.activations.len() == layers.len()
            && self.activations.iter().zip(layers).all(|(a, &w)| a.len() == w)
    }

    fn fit(&mut self, layers: &[usize]) {
        if !self.fits(layers) {
            *self = Self::for_layers(layers);
        }
    }

    /// Output of the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        self.activations
            .last()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Post-activation values of layer `idx` (`0` is the input layer).
    #[inline]
    pub fn activations(&self, idx: usize) -> &[f64] {
        &self.activations[idx]
    }

    /// Pre-activation values of `stage` (feeding layer `stage + 1`).
    #[inline]
    pub fn pre_activations(&self, stage: usize) -> &[f64] {
        &self.pre_activations[stage]
    }
}
