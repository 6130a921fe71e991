//! Bounded log of recently trained examples.
//!
//! Visualization overlays draw the last few `(input, target)` pairs the network
//! has seen. The log is a fixed-capacity ring buffer: once full, every push
//! overwrites the oldest entry.

use serde::Serialize;

/// Default number of points kept by a network.
pub const TRAINING_POINT_CAPACITY: usize = 100;

/// One example seen by `Network::train`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPoint {
    pub input: Vec<f64>,
    /// First component of the target vector.
    pub target: f64,
}

#[derive(Debug, Clone)]
pub struct PointLog {
    buf: Vec<TrainingPoint>,
    // Index of the oldest entry once the buffer is full.
    head: usize,
    capacity: usize,
}

impl Default for PointLog {
    fn default() -> Self {
        Self::with_capacity(TRAINING_POINT_CAPACITY)
    }
}

impl PointLog {
    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn push(&mut self, point: TrainingPoint) {
        if self.buf.len() < self.capacity {
            self.buf.push(point);
        } else {
            self.buf[self.head] = point;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TrainingPoint> + '_ {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer)
    }

    pub fn oldest(&self) -> Option<&TrainingPoint> {
        self.iter().next()
    }

    pub fn latest(&self) -> Option<&TrainingPoint> {
        if self.buf.is_empty() {
            return None;
        }
        let idx = (self.head + self.buf.len() - 1) % self.buf.len();
        self.buf.get(idx)
    }

    pub fn to_vec(&self) -> Vec<TrainingPoint> {
        self.iter().cloned().collect()
    }
}
