//! Sampling helpers for 2-D visualizations.
//!
//! All helpers are read-only views over a network with exactly two inputs.
//! Grids are sampled on `(resolution + 1) x (resolution + 1)` nodes, outer loop
//! over x, inner loop over y.

use serde::{Deserialize, Serialize};

use crate::{Error, Network, Result, Scratch};

/// Forward-difference step used by [`Network::compute_gradient`].
pub const GRADIENT_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundaryPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientPoint {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

/// Rectangular sampling region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub resolution: usize,
}

impl Grid {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, resolution: usize) -> Result<Self> {
        let grid = Self {
            x_min,
            x_max,
            y_min,
            y_max,
            resolution,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// The unit square `[0, 1] x [0, 1]`.
    pub fn unit(resolution: usize) -> Result<Self> {
        Self::new(0.0, 1.0, 0.0, 1.0, resolution)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(Error::InvalidGrid("resolution must be >= 1".to_owned()));
        }
        let bounds = [self.x_min, self.x_max, self.y_min, self.y_max];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidGrid(format!("bounds must be finite, got {bounds:?}")));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(Error::InvalidGrid(format!(
                "min bound exceeds max bound: x [{}, {}], y [{}, {}]",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    /// Number of nodes, `(resolution + 1)^2`.
    pub fn node_count(&self) -> usize {
        (self.resolution + 1) * (self.resolution + 1)
    }

    /// Node coordinates, x-major.
    pub fn nodes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let n = self.resolution;
        (0..=n).flat_map(move |i| {
            let x = lerp(self.x_min, self.x_max, i, n);
            (0..=n).map(move |j| (x, lerp(self.y_min, self.y_max, j, n)))
        })
    }
}

// The last node lands exactly on `max`.
#[inline]
fn lerp(min: f64, max: f64, step: usize, steps: usize) -> f64 {
    if step == steps {
        max
    } else {
        min + (max - min) * (step as f64 / steps as f64)
    }
}

impl Network {
    /// First output for the 2-D input `(x, y)`.
    ///
    /// Fails with [`Error::InputSizeMismatch`] unless the network has exactly two inputs.
    pub fn predict_point(&self, x: f64, y: f64) -> Result<f64> {
        let mut scratch = self.scratch();
        self.predict_point_with(x, y, &mut scratch)
    }

    fn predict_point_with(&self, x: f64, y: f64, scratch: &mut Scratch) -> Result<f64> {
        let out = self.forward_with(&[x, y], scratch)?;
        Ok(out[0])
    }

    /// Samples [`Network::predict_point`] over a regular grid.
    pub fn decision_boundary(
        &self,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        resolution: usize,
    ) -> Result<Vec<BoundaryPoint>> {
        let grid = Grid::new(x_min, x_max, y_min, y_max, resolution)?;
        self.sample_boundary(&grid)
    }

    pub fn sample_boundary(&self, grid: &Grid) -> Result<Vec<BoundaryPoint>> {
        grid.validate()?;
        let mut scratch = self.scratch();
        let mut points = Vec::with_capacity(grid.node_count());
        for (x, y) in grid.nodes() {
            let value = self.predict_point_with(x, y, &mut scratch)?;
            points.push(BoundaryPoint { x, y, value });
        }
        Ok(points)
    }

    /// Forward-difference estimate of `d predict_point / d(x, y)` with step
    /// [`GRADIENT_EPSILON`]. Deliberately numerical, not backpropagated.
    pub fn compute_gradient(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut scratch = self.scratch();
        self.compute_gradient_with(x, y, &mut scratch)
    }

    fn compute_gradient_with(&self, x: f64, y: f64, scratch: &mut Scratch) -> Result<(f64, f64)> {
        let base = self.predict_point_with(x, y, scratch)?;
        let at_dx = self.predict_point_with(x + GRADIENT_EPSILON, y, scratch)?;
        let at_dy = self.predict_point_with(x, y + GRADIENT_EPSILON, scratch)?;
        Ok((
            (at_dx - base) / GRADIENT_EPSILON,
            (at_dy - base) / GRADIENT_EPSILON,
        ))
    }

    /// Samples [`Network::compute_gradient`] over a regular grid.
    pub fn gradient_field(
        &self,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        resolution: usize,
    ) -> Result<Vec<GradientPoint>> {
        let grid = Grid::new(x_min, x_max, y_min, y_max, resolution)?;
        self.sample_gradient_field(&grid)
    }

    pub fn sample_gradient_field(&self, grid: &Grid) -> Result<Vec<GradientPoint>> {
        grid.validate()?;
        let mut scratch = self.scratch();
        let mut points = Vec::with_capacity(grid.node_count());
        for (x, y) in grid.nodes() {
            let (dx, dy) = self.compute_gradient_with(x, y, &mut scratch)?;
            points.push(GradientPoint { x, y, dx, dy });
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activation, NetworkState};
    use approx::assert_abs_diff_eq;

    // sigmoid(2x - y)
    fn linear_2_1() -> Network {
        Network::from_state(&NetworkState {
            layers: vec![2, 1],
            weights: vec![vec![vec![2.0, -1.0]]],
            biases: vec![vec![0.0]],
            activation: Activation::Sigmoid,
            learning_rate: 0.1,
        })
        .unwrap()
    }

    #[test]
    fn predict_point_uses_first_output() {
        let net = Network::from_state(&NetworkState {
            layers: vec![2, 2],
            weights: vec![vec![vec![1.0, 0.0], vec![0.0, 1.0]]],
            biases: vec![vec![0.0, 0.0]],
            activation: Activation::ReLU,
            learning_rate: 0.1,
        })
        .unwrap();
        assert_eq!(net.predict_point(3.0, 5.0).unwrap(), 3.0);
    }

    #[test]
    fn predict_point_requires_two_inputs() {
        let net = Network::with_seed(&[3, 1], 0.1, 0).unwrap();
        assert_eq!(
            net.predict_point(0.0, 0.0).unwrap_err(),
            Error::InputSizeMismatch { expected: 3, got: 2 }
        );
    }

    #[test]
    fn boundary_cardinality_and_order() {
        let net = Network::with_seed(&[2, 4, 1], 0.1, 0).unwrap();
        for resolution in [1, 2, 7, 10] {
            let points = net.decision_boundary(0.0, 1.0, 0.0, 1.0, resolution).unwrap();
            assert_eq!(points.len(), (resolution + 1) * (resolution + 1));
            assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.x)));
            assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.y)));
        }

        let points = net.decision_boundary(-1.0, 1.0, 0.0, 4.0, 2).unwrap();
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            coords,
            vec![
                (-1.0, 0.0),
                (-1.0, 2.0),
                (-1.0, 4.0),
                (0.0, 0.0),
                (0.0, 2.0),
                (0.0, 4.0),
                (1.0, 0.0),
                (1.0, 2.0),
                (1.0, 4.0),
            ]
        );
        for p in &points {
            assert_eq!(p.value, net.predict_point(p.x, p.y).unwrap());
        }
    }

    #[test]
    fn sampling_does_not_mutate() {
        let net = Network::with_seed(&[2, 3, 1], 0.1, 5).unwrap();
        let before = net.state();
        net.decision_boundary(0.0, 1.0, 0.0, 1.0, 5).unwrap();
        net.gradient_field(0.0, 1.0, 0.0, 1.0, 5).unwrap();
        assert_eq!(net.state(), before);
        assert!(net.training_points().is_empty());
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let net = linear_2_1();
        assert!(matches!(
            net.decision_boundary(0.0, 1.0, 0.0, 1.0, 0),
            Err(Error::InvalidGrid(_))
        ));
        assert!(matches!(
            net.gradient_field(1.0, 0.0, 0.0, 1.0, 4),
            Err(Error::InvalidGrid(_))
        ));
        assert!(matches!(
            net.decision_boundary(0.0, f64::INFINITY, 0.0, 1.0, 4),
            Err(Error::InvalidGrid(_))
        ));
    }

    #[test]
    fn numeric_gradient_matches_closed_form() {
        let net = linear_2_1();
        let (x, y) = (0.3, 0.2);
        let s = Activation::Sigmoid.apply(2.0 * x - y);
        let ds = s * (1.0 - s);

        let (dx, dy) = net.compute_gradient(x, y).unwrap();
        assert_abs_diff_eq!(dx, 2.0 * ds, epsilon = 1e-5);
        assert_abs_diff_eq!(dy, -ds, epsilon = 1e-5);
    }

    #[test]
    fn gradient_field_matches_pointwise_gradient() {
        let net = Network::with_seed(&[2, 3, 1], 0.1, 8).unwrap();
        let field = net.gradient_field(0.0, 1.0, 0.0, 1.0, 3).unwrap();
        assert_eq!(field.len(), 16);
        for p in &field {
            let (dx, dy) = net.compute_gradient(p.x, p.y).unwrap();
            assert_eq!((p.dx, p.dy), (dx, dy));
        }
    }

    #[test]
    fn grid_nodes_hit_bounds_exactly() {
        let grid = Grid::new(0.1, 0.7, -0.3, 0.9, 49).unwrap();
        let nodes: Vec<_> = grid.nodes().collect();
        assert_eq!(nodes.len(), grid.node_count());
        assert_eq!(nodes.first(), Some(&(0.1, -0.3)));
        assert_eq!(nodes.last(), Some(&(0.7, 0.9)));
    }
}
