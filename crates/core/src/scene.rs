//! Reproducible specification for an animation run.
//!
//! A [`Scene`] captures everything needed to replay a run exactly: formation
//! pattern, viewport dimensions, parameter overrides, PRNG seed, frame
//! count, and the frame at which the formation flag goes up.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Reproducible specification for an animation run.
///
/// Two identical `Scene` values fed to the same binary tick through
/// bit-identical frames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    /// Formation pattern name (resolved by the layout registry).
    pub pattern: String,
    pub width: usize,
    pub height: usize,
    /// Parameter overrides, merged over the config defaults.
    pub params: serde_json::Value,
    pub seed: u64,
    /// Total frames to tick.
    pub frames: u64,
    /// Frame at which the formation flag is raised, if ever.
    pub form_at: Option<u64>,
}

impl Scene {
    /// Creates a scene with default params (`{}`), zero frames, and no
    /// formation request.
    pub fn new(pattern: &str, width: usize, height: usize, seed: u64) -> Self {
        Self {
            pattern: pattern.to_string(),
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            frames: 0,
            form_at: None,
        }
    }

    /// Validates that the scene has non-zero, non-overflowing dimensions.
    ///
    /// The simulation core tolerates degenerate viewports; a scene is a
    /// render request, and rendering a zero-sized image is an input error.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(SimError::InvalidDimensions)?;
        Ok(())
    }
}
