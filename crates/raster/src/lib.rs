#![deny(unsafe_code)]
//! CPU raster implementation of the driftfield drawing capability.
//!
//! [`RasterSurface`] renders the engine's circle primitives into an RGBA8
//! buffer with source-over or additive (saturating) blending, and can write
//! the result as a PNG behind the default-on `png` feature. It exists for
//! headless rendering (CLI snapshots, golden tests) and as the reference
//! for what a GPU-backed host surface should produce.

use driftfield_core::{BlendMode, DrawSurface, Rgba, SimError};
use glam::DVec2;

/// An RGBA8 pixel buffer that implements [`DrawSurface`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    blend: BlendMode,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Creates a transparent surface.
    ///
    /// Returns `SimError::InvalidDimensions` if either dimension is zero or
    /// the buffer size would overflow.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SimError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            blend: BlendMode::Normal,
            pixels: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the row-major RGBA8 data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel_at(&self, x: usize, y: usize) -> Rgba {
        let i = (y * self.width + x) * 4;
        Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    /// Blends `color` into the pixel at index `i` (byte offset of R).
    fn blend_pixel(&mut self, i: usize, color: Rgba) {
        let alpha = color.a as f64 / 255.0;
        match self.blend {
            BlendMode::Normal => {
                // Source-over.
                let inv = 1.0 - alpha;
                self.pixels[i] =
                    (color.r as f64 * alpha + self.pixels[i] as f64 * inv).round() as u8;
                self.pixels[i + 1] =
                    (color.g as f64 * alpha + self.pixels[i + 1] as f64 * inv).round() as u8;
                self.pixels[i + 2] =
                    (color.b as f64 * alpha + self.pixels[i + 2] as f64 * inv).round() as u8;
                self.pixels[i + 3] =
                    (color.a as f64 + self.pixels[i + 3] as f64 * inv).round() as u8;
            }
            BlendMode::Additive => {
                // Channels sum and saturate; the particle glow look.
                self.pixels[i] =
                    self.pixels[i].saturating_add((color.r as f64 * alpha).round() as u8);
                self.pixels[i + 1] =
                    self.pixels[i + 1].saturating_add((color.g as f64 * alpha).round() as u8);
                self.pixels[i + 2] =
                    self.pixels[i + 2].saturating_add((color.b as f64 * alpha).round() as u8);
                self.pixels[i + 3] = self.pixels[i + 3].saturating_add(color.a);
            }
        }
    }
}

impl DrawSurface for RasterSurface {
    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_background(&mut self, color: Rgba) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn fill_circle(&mut self, center: DVec2, diameter: f64, color: Rgba) {
        let radius = diameter / 2.0;
        if radius <= 0.0 || color.a == 0 {
            return;
        }
        let x0 = ((center.x - radius).floor().max(0.0)) as usize;
        let y0 = ((center.y - radius).floor().max(0.0)) as usize;
        let x1 = ((center.x + radius).ceil().min(self.width as f64 - 1.0)) as usize;
        let y1 = ((center.y + radius).ceil().min(self.height as f64 - 1.0)) as usize;
        if center.x + radius < 0.0 || center.y + radius < 0.0 {
            return;
        }
        let r_sq = radius * radius;
        for py in y0..=y1 {
            for px in x0..=x1 {
                // Sample at the pixel center.
                let dx = px as f64 + 0.5 - center.x;
                let dy = py as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r_sq {
                    self.blend_pixel((py * self.width + px) * 4, color);
                }
            }
        }
    }
}

/// Writes the surface as a PNG image.
///
/// Returns `SimError::InvalidDimensions` if the dimensions overflow `u32`,
/// or `SimError::Io` on write failure.
#[cfg(feature = "png")]
pub fn write_png(surface: &RasterSurface, path: &std::path::Path) -> Result<(), SimError> {
    let w = u32::try_from(surface.width()).map_err(|_| SimError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| SimError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.pixels().to_vec())
        .ok_or_else(|| SimError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| SimError::Io(e.to_string()))
}
