//! Flat parameter storage.
//!
//! All weights of all stages live in one contiguous buffer, and all biases in
//! another. Stage `i` owns a row-major block of shape `(layers[i+1], layers[i])`
//! starting at `weight_offsets[i]`, so the logical `[stage][dest][source]`
//! index maps to `weight_offsets[stage] + dest * layers[stage] + source`.

use rand::Rng;

use crate::init::{gaussian, xavier_std};
use crate::{Error, Result};

/// Weights and biases of a dense network.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    layers: Vec<usize>,
    weights: Vec<f64>,
    biases: Vec<f64>,
    // One entry per stage plus a trailing end offset.
    weight_offsets: Vec<usize>,
    bias_offsets: Vec<usize>,
}

/// Checks the topology contract: at least input and output widths, all > 0.
pub(crate) fn validate_topology(layers: &[usize]) -> Result<()> {
    if layers.len() < 2 {
        return Err(Error::InvalidTopology(format!(
            "need at least an input and an output layer, got {} layer(s)",
            layers.len()
        )));
    }
    if let Some(idx) = layers.iter().position(|&w| w == 0) {
        return Err(Error::InvalidTopology(format!(
            "layer {idx} has width 0; all widths must be >= 1"
        )));
    }
    Ok(())
}

impl Parameters {
    /// All-zero parameters for a validated topology.
    pub(crate) fn zeros(layers: &[usize]) -> Self {
        debug_assert!(validate_topology(layers).is_ok());

        let mut weight_offsets = Vec::with_capacity(layers.len());
        let mut bias_offsets = Vec::with_capacity(layers.len());
        let mut w_end = 0;
        let mut b_end = 0;
        for pair in layers.windows(2) {
            weight_offsets.push(w_end);
            bias_offsets.push(b_end);
            w_end += pair[0] * pair[1];
            b_end += pair[1];
        }
        weight_offsets.push(w_end);
        bias_offsets.push(b_end);

        Self {
            layers: layers.to_vec(),
            weights: vec![0.0; w_end],
            biases: vec![0.0; b_end],
            weight_offsets,
            bias_offsets,
        }
    }

    /// Xavier-scaled Gaussian weights, zero biases.
    pub fn random<R: Rng + ?Sized>(layers: &[usize], rng: &mut R) -> Result<Self> {
        validate_topology(layers)?;

        let mut params = Self::zeros(layers);
        for stage in 0..params.num_stages() {
            let std_dev = xavier_std(params.fan_in(stage), params.fan_out(stage));
            for w in params.stage_weights_mut(stage) {
                *w = gaussian(rng, std_dev);
            }
        }
        Ok(params)
    }

    /// Builds parameters from the nested `[stage][dest][source]` / `[stage][dest]` form.
    ///
    /// Shape or finiteness violations are reported as [`Error::InvalidState`].
    pub fn from_nested(
        layers: &[usize],
        weights: &[Vec<Vec<f64>>],
        biases: &[Vec<f64>],
    ) -> Result<Self> {
        validate_topology(layers).map_err(|e| Error::InvalidState(e.to_string()))?;

        let stages = layers.len() - 1;
        if weights.len() != stages {
            return Err(Error::InvalidState(format!(
                "weights has {} stages, topology needs {stages}",
                weights.len()
            )));
        }
        if biases.len() != stages {
            return Err(Error::InvalidState(format!(
                "biases has {} stages, topology needs {stages}",
                biases.len()
            )));
        }

        let mut params = Self::zeros(layers);
        for stage in 0..stages {
            let (fan_in, fan_out) = (layers[stage], layers[stage + 1]);

            let rows = &weights[stage];
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
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(Error::InvalidState(format!(
                        "weights[{stage}][{dest}] contains a non-finite value"
                    )));
                }
                params.row_mut(stage, dest).copy_from_slice(row);
            }

            let stage_biases = &biases[stage];
            if stage_biases.len() != fan_out {
                return Err(Error::InvalidState(format!(
                    "biases[{stage}] has {} entries, expected {fan_out}",
                    stage_biases.len()
                )));
            }
            if stage_biases.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidState(format!(
                    "biases[{stage}] contains a non-finite value"
                )));
            }
            params.stage_biases_mut(stage).copy_from_slice(stage_biases);
        }

        Ok(params)
    }

    /// Nested copies of the weights (`[stage][dest][source]`) and biases (`[stage][dest]`).
    pub fn to_nested(&self) -> (Vec<Vec<Vec<f64>>>, Vec<Vec<f64>>) {
        let weights = (0..self.num_stages())
            .map(|stage| {
                self.stage_weights(stage)
                    .chunks_exact(self.fan_in(stage))
                    .map(<[f64]>::to_vec)
                    .collect()
            })
            .collect();
        let biases = (0..self.num_stages())
            .map(|stage| self.stage_biases(stage).to_vec())
            .collect();
        (weights, biases)
    }

    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[inline]
    pub fn num_stages(&self) -> usize {
        self.layers.len() - 1
    }

    #[inline]
    pub fn fan_in(&self, stage: usize) -> usize {
        self.layers[stage]
    }

    #[inline]
    pub fn fan_out(&self, stage: usize) -> usize {
        self.layers[stage + 1]
    }

    /// Total number of trainable scalars.
    pub fn len(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weight from `source` in layer `stage` to `dest` in layer `stage + 1`.
    ///
    /// Panics if any index is out of range.
    #[inline]
    pub fn weight(&self, stage: usize, dest: usize, source: usize) -> f64 {
        self.row(stage, dest)[source]
    }

    #[inline]
    pub fn set_weight(&mut self, stage: usize, dest: usize, source: usize, value: f64) {
        self.row_mut(stage, dest)[source] = value;
    }

    #[inline]
    pub fn bias(&self, stage: usize, dest: usize) -> f64 {
        self.stage_biases(stage)[dest]
    }

    #[inline]
    pub fn set_bias(&mut self, stage: usize, dest: usize, value: f64) {
        self.stage_biases_mut(stage)[dest] = value;
    }

    /// Incoming weights of one destination neuron.
    #[inline]
    pub fn row(&self, stage: usize, dest: usize) -> &[f64] {
        let fan_in = self.fan_in(stage);
        assert!(dest < self.fan_out(stage), "dest {dest} out of range for stage {stage}");
        let start = self.weight_offsets[stage] + dest * fan_in;
        &self.weights[start..start + fan_in]
    }

    #[inline]
    fn row_mut(&mut self, stage: usize, dest: usize) -> &mut [f64] {
        let fan_in = self.fan_in(stage);
        assert!(dest < self.fan_out(stage), "dest {dest} out of range for stage {stage}");
        let start = self.weight_offsets[stage] + dest * fan_in;
        &mut self.weights[start..start + fan_in]
    }

    /// Row-major `(fan_out, fan_in)` block of one stage.
    #[inline]
    pub fn stage_weights(&self, stage: usize) -> &[f64] {
        &self.weights[self.weight_offsets[stage]..self.weight_offsets[stage + 1]]
    }

    #[inline]
    fn stage_weights_mut(&mut self, stage: usize) -> &mut [f64] {
        &mut self.weights[self.weight_offsets[stage]..self.weight_offsets[stage + 1]]
    }

    #[inline]
    pub fn stage_biases(&self, stage: usize) -> &[f64] {
        &self.biases[self.bias_offsets[stage]..self.bias_offsets[stage + 1]]
    }

    #[inline]
    fn stage_biases_mut(&mut self, stage: usize) -> &mut [f64] {
        &mut self.biases[self.bias_offsets[stage]..self.bias_offsets[stage + 1]]
    }

    /// Gradient-descent update of one stage.
    ///
    /// `w[dest][src] -= lr * delta[dest] * inputs[src]` and `b[dest] -= lr * delta[dest]`.
    pub(crate) fn descend(&mut self, stage: usize, delta: &[f64], inputs: &[f64], lr: f64) {
        let fan_in = self.fan_in(stage);
        debug_assert_eq!(delta.len(), self.fan_out(stage));
        debug_assert_eq!(inputs.len(), fan_in);

        let (w_start, w_end) = (self.weight_offsets[stage], self.weight_offsets[stage + 1]);
        let (b_start, b_end) = (self.bias_offsets[stage], self.bias_offsets[stage + 1]);
        let weights = &mut self.weights[w_start..w_end];
        let biases = &mut self.biases[b_start..b_end];

        for ((row, bias), &d) in weights.chunks_exact_mut(fan_in).zip(biases).zip(delta) {
            let step = lr * d;
            for (w, &a) in row.iter_mut().zip(inputs) {
                *w -= step * a;
            }
            *bias -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_short_or_zero_width_topologies() {
        assert!(matches!(validate_topology(&[]), Err(Error::InvalidTopology(_))));
        assert!(matches!(validate_topology(&[3]), Err(Error::InvalidTopology(_))));
        assert!(matches!(validate_topology(&[2, 0, 1]), Err(Error::InvalidTopology(_))));
        assert!(validate_topology(&[1, 1]).is_ok());
    }

    #[test]
    fn offsets_follow_stage_shapes() {
        let p = Parameters::zeros(&[2, 4, 3, 1]);
        assert_eq!(p.num_stages(), 3);
        assert_eq!(p.weight_offsets, vec![0, 8, 20, 23]);
        assert_eq!(p.bias_offsets, vec![0, 4, 7, 8]);
        assert_eq!(p.len(), 23 + 8);
        assert_eq!(p.stage_weights(1).len(), 12);
        assert_eq!(p.row(1, 2).len(), 4);
    }

    #[test]
    fn random_init_has_zero_biases_and_nonzero_weights() {
        let mut rng = StdRng::seed_from_u64(0);
        let p = Parameters::random(&[3, 5, 2], &mut rng).unwrap();
        assert!(p.biases.iter().all(|&b| b == 0.0));
        assert!(p.weights.iter().any(|&w| w != 0.0));
        assert!(p.weights.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn nested_roundtrip_preserves_logical_indexing() {
        let mut p = Parameters::zeros(&[2, 3, 1]);
        p.set_weight(0, 2, 1, 1.5);
        p.set_weight(1, 0, 2, -0.25);
        p.set_bias(0, 1, 0.75);

        let (weights, biases) = p.to_nested();
        assert_eq!(weights[0][2][1], 1.5);
        assert_eq!(weights[1][0][2], -0.25);
        assert_eq!(biases[0][1], 0.75);

        let back = Parameters::from_nested(p.layers(), &weights, &biases).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn from_nested_rejects_shape_mismatches() {
        let layers = [2, 2, 1];
        let good_w = vec![vec![vec![0.0; 2]; 2], vec![vec![0.0; 2]; 1]];
        let good_b = vec![vec![0.0; 2], vec![0.0; 1]];
        assert!(Parameters::from_nested(&layers, &good_w, &good_b).is_ok());

        let mut short_row = good_w.clone();
        short_row[1][0].pop();
        assert!(matches!(
            Parameters::from_nested(&layers, &short_row, &good_b),
            Err(Error::InvalidState(_))
        ));

        let mut extra_stage = good_w.clone();
        extra_stage.push(vec![vec![0.0]]);
        assert!(matches!(
            Parameters::from_nested(&layers, &extra_stage, &good_b),
            Err(Error::InvalidState(_))
        ));

        let mut nan_bias = good_b.clone();
        nan_bias[0][0] = f64::NAN;
        assert!(matches!(
            Parameters::from_nested(&layers, &good_w, &nan_bias),
            Err(Error::InvalidState(_))
        ));

        assert!(matches!(
            Parameters::from_nested(&[2], &[], &[]),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn descend_applies_scaled_outer_product() {
        let mut p = Parameters::zeros(&[2, 2]);
        p.descend(0, &[1.0, -2.0], &[0.5, 3.0], 0.1);
        assert_eq!(p.row(0, 0), &[-0.05, -0.30000000000000004]);
        assert_eq!(p.row(0, 1), &[0.1, 0.6000000000000001]);
        assert_eq!(p.stage_biases(0), &[-0.1, 0.2]);
    }
}
