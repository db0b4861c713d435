//! Bounded history of a particle's recent positions.
//!
//! Implemented as a fixed-capacity ring with an explicit logical length so
//! per-tick maintenance is O(1) and never reallocates. Positions iterate
//! oldest-first; the renderer fades and grows circles toward the newest.

use glam::DVec2;

/// Maximum positions a trail can hold.
pub const TRAIL_CAPACITY: usize = 20;

/// Fixed-capacity circular buffer of past positions.
#[derive(Debug, Clone)]
pub struct Trail {
    points: Vec<DVec2>,
    start: usize,
    len: usize,
}

impl Trail {
    /// Creates an empty trail holding up to `capacity` positions.
    pub fn new(capacity: usize) -> Self {
        Self {
            points: vec![DVec2::ZERO; capacity],
            start: 0,
            len: 0,
        }
    }

    /// Appends a position, overwriting the oldest when full.
    pub fn push(&mut self, point: DVec2) {
        let capacity = self.points.len();
        if capacity == 0 {
            return;
        }
        if self.len < capacity {
            self.points[(self.start + self.len) % capacity] = point;
            self.len += 1;
        } else {
            self.points[self.start] = point;
            self.start = (self.start + 1) % capacity;
        }
    }

    /// Drops oldest positions until at most `target` remain.
    pub fn truncate_to(&mut self, target: usize) {
        if self.len <= target {
            return;
        }
        let capacity = self.points.len();
        let drop = self.len - target;
        self.start = (self.start + drop) % capacity;
        self.len = target;
    }

    /// Forgets all positions. Called on edge wrap so a trail never spans
    /// the viewport.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Logical length (not capacity).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum positions this trail can hold.
    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    /// Iterates positions oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = DVec2> + '_ {
        let capacity = self.points.len();
        (0..self.len).map(move |i| self.points[(self.start + i) % capacity])
    }
}
