//! The drawing capability the host surface supplies to the simulation.
//!
//! The engine draws exclusively through [`DrawSurface`]: clear, background
//! fill, blend-mode selection, and filled circles. Anything that can do
//! those four things (a GPU canvas, a CPU raster buffer, a no-op sink)
//! can host the animation.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Blend mode for subsequent draw calls.
///
/// `Additive` is the particle look: overlapping glows sum and saturate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

/// An 8-bit RGBA color. Alpha 255 is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Object-safe drawing capability.
///
/// The simulation issues all rendering through this trait; it never owns a
/// rendering context. Implementations are expected to be cheap per call:
/// the engine issues up to `particles x trail length` circles per tick.
pub trait DrawSurface {
    /// Resets the surface to fully transparent.
    fn clear(&mut self);

    /// Fills the whole surface with an opaque background color.
    fn fill_background(&mut self, color: Rgba);

    /// Selects the blend mode for subsequent circle fills.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Draws a filled circle. `diameter` is in drawing units.
    fn fill_circle(&mut self, center: DVec2, diameter: f64, color: Rgba);
}

/// A surface that discards every draw call.
///
/// Lets a host tick the simulation without rendering (warm-up, headless
/// tests, background tabs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl DrawSurface for NullSurface {
    fn clear(&mut self) {}
    fn fill_background(&mut self, _color: Rgba) {}
    fn set_blend_mode(&mut self, _mode: BlendMode) {}
    fn fill_circle(&mut self, _center: DVec2, _diameter: f64, _color: Rgba) {}
}
