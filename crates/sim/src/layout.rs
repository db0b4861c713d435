//! Formation layouts: ordered anchor points particles steer into.
//!
//! A layout produces at least as many anchors as requested, ordered by
//! visual significance: structural points (corners, compass points) first,
//! filler points last, so the assignment policy can put particles on the
//! skeleton of the pattern before the decoration. The concrete pattern is a
//! strategy behind the [`Formation`] trait, selected by name through
//! [`FormationKind`], so the simulation stays pattern-agnostic.

use driftfield_core::{SimError, Viewport, Xorshift64};
use glam::DVec2;
use std::f64::consts::{FRAC_PI_4, TAU};

/// All recognized pattern names.
const PATTERN_NAMES: &[&str] = &["compass-rose", "square", "collapse"];

/// Compass pattern radius as a fraction of the smaller viewport extent.
const COMPASS_RADIUS_FRACTION: f64 = 0.25;
/// Decorative ring points are capped at this many.
const COMPASS_DECORATIVE_MAX: usize = 40;
/// Number of decorative spokes.
const COMPASS_SPOKES: usize = 8;
/// Square side as a fraction of the smaller viewport extent.
const SQUARE_SIDE_FRACTION: f64 = 0.3;

/// A source of formation anchor points.
///
/// Implementations must return at least `count` points, padding the
/// deterministic pattern with uniformly-random points inside the pattern's
/// bounding region when it yields fewer.
pub trait Formation {
    /// Generates the ordered anchor points for a viewport.
    fn anchors(&self, viewport: Viewport, count: usize, rng: &mut Xorshift64) -> Vec<DVec2>;
}

/// Cardinal and intercardinal compass points around the viewport center,
/// with decorative spoke points and random padding.
pub struct CompassRose;

/// The four corners of a centered square, with random padding around it.
pub struct SquareCorners;

/// A single point at the viewport center; every particle converges on it.
pub struct CollapsePoint;

impl Formation for CompassRose {
    fn anchors(&self, viewport: Viewport, count: usize, rng: &mut Xorshift64) -> Vec<DVec2> {
        let center = viewport.center();
        let radius = viewport.min_extent() * COMPASS_RADIUS_FRACTION;
        let small_radius = radius * 0.5;
        let mut points = Vec::with_capacity(count.max(9));

        // Cardinal points, rotated an eighth turn so the rose reads as N/E/S/W.
        for i in 0..4 {
            let angle = i as f64 * TAU / 4.0 - FRAC_PI_4;
            points.push(center + DVec2::from_angle(angle) * radius);
        }
        // Intercardinal points on the inner ring.
        for i in 0..4 {
            let angle = i as f64 * TAU / 4.0;
            points.push(center + DVec2::from_angle(angle) * small_radius);
        }
        points.push(center);

        // Decorative spoke points between the rings and the rim.
        let decorative = count.saturating_sub(points.len()).min(COMPASS_DECORATIVE_MAX);
        let rings = decorative as f64 / COMPASS_SPOKES as f64;
        for i in 0..COMPASS_SPOKES {
            let angle = i as f64 * TAU / COMPASS_SPOKES as f64;
            let mut j = 1.0;
            while j <= rings {
                let r = (j / rings) * radius * 1.2;
                points.push(center + DVec2::from_angle(angle) * r);
                j += 1.0;
            }
        }

        while points.len() < count {
            let r = rng.next_f64() * radius * 1.3;
            points.push(center + DVec2::from_angle(rng.next_angle()) * r);
        }
        points
    }
}

impl Formation for SquareCorners {
    fn anchors(&self, viewport: Viewport, count: usize, rng: &mut Xorshift64) -> Vec<DVec2> {
        let center = viewport.center();
        let half = viewport.min_extent() * SQUARE_SIDE_FRACTION / 2.0;
        let mut points = vec![
            center + DVec2::new(-half, -half),
            center + DVec2::new(half, -half),
            center + DVec2::new(half, half),
            center + DVec2::new(-half, half),
        ];

        while points.len() < count {
            let r = rng.next_f64() * half * 3.0;
            points.push(center + DVec2::from_angle(rng.next_angle()) * r);
        }
        points
    }
}

impl Formation for CollapsePoint {
    fn anchors(&self, viewport: Viewport, count: usize, _rng: &mut Xorshift64) -> Vec<DVec2> {
        // The bounding region is the point itself, so padding repeats it.
        // Particles that arrive hit the zero-distance steering guard.
        vec![viewport.center(); count.max(1)]
    }
}

/// Registry of the available formation patterns.
///
/// Use [`FormationKind::from_name`] for string-based construction (CLI,
/// scene files).
pub enum FormationKind {
    CompassRose(CompassRose),
    Square(SquareCorners),
    Collapse(CollapsePoint),
}

impl FormationKind {
    /// Constructs a pattern by name.
    ///
    /// Returns `SimError::UnknownFormation` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        match name {
            "compass-rose" => Ok(FormationKind::CompassRose(CompassRose)),
            "square" => Ok(FormationKind::Square(SquareCorners)),
            "collapse" => Ok(FormationKind::Collapse(CollapsePoint)),
            _ => Err(SimError::UnknownFormation(name.to_string())),
        }
    }

    /// Returns a slice of all recognized pattern names.
    pub fn list_patterns() -> &'static [&'static str] {
        PATTERN_NAMES
    }

    /// The registry name of this pattern.
    pub fn name(&self) -> &'static str {
        match self {
            FormationKind::CompassRose(_) => "compass-rose",
            FormationKind::Square(_) => "square",
            FormationKind::Collapse(_) => "collapse",
        }
    }
}

impl Formation for FormationKind {
    fn anchors(&self, viewport: Viewport, count: usize, rng: &mut Xorshift64) -> Vec<DVec2> {
        match self {
            FormationKind::CompassRose(f) => f.anchors(viewport, count, rng),
            FormationKind::Square(f) => f.anchors(viewport, count, rng),
            FormationKind::Collapse(f) => f.anchors(viewport, count, rng),
        }
    }
}
