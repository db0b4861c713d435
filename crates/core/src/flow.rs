//! Procedural flow field: a grid of unit direction vectors from Perlin noise.
//!
//! The field divides the viewport into square cells of `cell_size` drawing
//! units and stores one unit vector per cell in row-major order. Ambient
//! particles look up the cell under their position and are pushed along its
//! direction. The field is a pure function of viewport, cell size, and seed,
//! so it is regenerated wholesale whenever the viewport changes.

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::viewport::Viewport;

/// Noise-space step between adjacent cells. Small enough that neighboring
/// directions stay coherent.
const NOISE_COORD_SCALE: f64 = 0.1;

/// Angle span as a multiple of a full turn. Two turns means neighboring
/// cells can differ by more than raw noise would give, producing visibly
/// turbulent flow.
const ANGLE_TURNS: f64 = 2.0;

/// A viewport-sized grid of unit direction vectors.
///
/// `cols = floor(width / cell_size)`, `rows = floor(height / cell_size)`.
/// A cell size of zero, or one at least as large as an extent, yields an
/// empty field; lookups on an empty field simply return `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    cols: usize,
    rows: usize,
    cell_size: f64,
    directions: Vec<DVec2>,
}

impl FlowField {
    /// Generates the field for a viewport. Deterministic: the same
    /// viewport, cell size, and seed always produce the same field.
    pub fn generate(viewport: Viewport, cell_size: f64, seed: u32) -> Self {
        let (cols, rows) = if viewport.is_degenerate() || cell_size <= 0.0 {
            (0, 0)
        } else {
            (
                (viewport.width / cell_size).floor() as usize,
                (viewport.height / cell_size).floor() as usize,
            )
        };

        let noise = Perlin::new(seed);
        let mut directions = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let n = noise.get([
                    col as f64 * NOISE_COORD_SCALE,
                    row as f64 * NOISE_COORD_SCALE,
                ]);
                // Perlin output is in [-1, 1]; the original noise source was
                // unit-interval valued, so remap before the double turn.
                let unit = n * 0.5 + 0.5;
                let angle = unit * std::f64::consts::TAU * ANGLE_TURNS;
                directions.push(DVec2::new(angle.cos(), angle.sin()));
            }
        }

        Self {
            cols,
            rows,
            cell_size,
            directions,
        }
    }

    /// Grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total cell count.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// True when the field has no cells (degenerate viewport or cell size).
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Cell edge length in drawing units.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Read-only access to the row-major direction data.
    pub fn directions(&self) -> &[DVec2] {
        &self.directions
    }

    /// The direction of the cell under `position`, or `None` when the
    /// position falls outside the grid (including negative coordinates).
    /// Out-of-bounds lookups are expected during resize races and are not
    /// an error.
    pub fn direction_at(&self, position: DVec2) -> Option<DVec2> {
        if self.is_empty() {
            return None;
        }
        let col = (position.x / self.cell_size).floor();
        let row = (position.y / self.cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(self.directions[row * self.cols + col])
    }
}
