//! Simulation tunables with JSON extraction and introspection.
//!
//! Every tunable has a `DEFAULT_*` constant; [`SimConfig::from_json`] never
//! fails, missing or mistyped keys fall back to defaults. Colors are plain
//! config fields set in code; policy constants (particle density, cap,
//! trail capacity) are fixed.

use driftfield_core::params::{param_f64, param_u64};
use driftfield_core::{Rgba, SimError};
use serde_json::{json, Value};

/// Base particle diameter; per-particle size jitters around this.
const DEFAULT_PARTICLE_SIZE: f64 = 3.0;
/// Flow-field cell edge length in drawing units.
const DEFAULT_CELL_SIZE: f64 = 20.0;
/// Scale applied to the flow-field direction when used as a force.
const DEFAULT_FIELD_STRENGTH: f64 = 0.1;
/// Formation transition length in frames (2 s at 60 fps).
const DEFAULT_TRANSITION_DURATION: u64 = 120;
/// Slowest per-particle speed limit; also bounds spawn velocities.
const DEFAULT_MIN_VELOCITY: f64 = 0.1;
/// Fastest per-particle speed limit.
const DEFAULT_MAX_VELOCITY: f64 = 1.5;
/// Steering multiplier reached at the end of a transition.
const DEFAULT_WARP_INTENSITY: f64 = 2.0;
/// Fractional speed-limit boost reached at the end of a transition.
const DEFAULT_WARP_SPEED_BOOST: f64 = 0.5;
/// Distance a formed particle may drift before being pulled back.
const DEFAULT_FORMATION_SLACK: f64 = 10.0;
/// Per-tick probability of a random impulse while formed.
const DEFAULT_PERTURB_CHANCE: f64 = 0.02;
/// Per-axis magnitude bound of the formed-state impulse.
const DEFAULT_PERTURB_IMPULSE: f64 = 0.05;

const DEFAULT_PARTICLE_COLOR: Rgba = Rgba::new(255, 255, 255, 200);
const DEFAULT_GLOW_COLOR: Rgba = Rgba::new(100, 150, 255, 50);
const DEFAULT_BACKGROUND: Rgba = Rgba::new(10, 15, 30, 255);

/// All recognized assignment policy names.
const ASSIGNMENT_NAMES: &[&str] = &["nearest-first", "by-index"];

/// How particles are matched to formation anchors at transition entry.
///
/// Either policy produces a permutation fixed for the duration of one
/// transition, so an anchor never changes under a particle mid-flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Assignment {
    /// Particles sorted by distance to the anchor centroid; the closest
    /// take the most significant anchors.
    #[default]
    NearestFirst,
    /// Particle i takes anchor i.
    ByIndex,
}

impl Assignment {
    /// Constructs a policy by name.
    ///
    /// Returns `SimError::UnknownAssignment` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        match name {
            "nearest-first" => Ok(Assignment::NearestFirst),
            "by-index" => Ok(Assignment::ByIndex),
            _ => Err(SimError::UnknownAssignment(name.to_string())),
        }
    }

    /// Returns a slice of all recognized policy names.
    pub fn list_policies() -> &'static [&'static str] {
        ASSIGNMENT_NAMES
    }

    /// The registry name of this policy.
    pub fn name(&self) -> &'static str {
        match self {
            Assignment::NearestFirst => "nearest-first",
            Assignment::ByIndex => "by-index",
        }
    }
}

/// Simulation tunables.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub particle_size: f64,
    pub cell_size: f64,
    pub field_strength: f64,
    pub transition_duration: u64,
    pub min_velocity: f64,
    pub max_velocity: f64,
    pub warp_intensity: f64,
    pub warp_speed_boost: f64,
    pub formation_slack: f64,
    pub perturb_chance: f64,
    pub perturb_impulse: f64,
    pub assignment: Assignment,
    pub particle_color: Rgba,
    pub glow_color: Rgba,
    pub background: Rgba,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_size: DEFAULT_PARTICLE_SIZE,
            cell_size: DEFAULT_CELL_SIZE,
            field_strength: DEFAULT_FIELD_STRENGTH,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            min_velocity: DEFAULT_MIN_VELOCITY,
            max_velocity: DEFAULT_MAX_VELOCITY,
            warp_intensity: DEFAULT_WARP_INTENSITY,
            warp_speed_boost: DEFAULT_WARP_SPEED_BOOST,
            formation_slack: DEFAULT_FORMATION_SLACK,
            perturb_chance: DEFAULT_PERTURB_CHANCE,
            perturb_impulse: DEFAULT_PERTURB_IMPULSE,
            assignment: Assignment::default(),
            particle_color: DEFAULT_PARTICLE_COLOR,
            glow_color: DEFAULT_GLOW_COLOR,
            background: DEFAULT_BACKGROUND,
        }
    }
}

impl SimConfig {
    /// Extracts scalar tunables from a JSON object, falling back to
    /// defaults. Colors and the assignment policy are not JSON tunables;
    /// set them on the returned value.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            particle_size: param_f64(params, "particle_size", d.particle_size),
            cell_size: param_f64(params, "cell_size", d.cell_size),
            field_strength: param_f64(params, "field_strength", d.field_strength),
            transition_duration: param_u64(params, "transition_duration", d.transition_duration),
            min_velocity: param_f64(params, "min_velocity", d.min_velocity),
            max_velocity: param_f64(params, "max_velocity", d.max_velocity),
            warp_intensity: param_f64(params, "warp_intensity", d.warp_intensity),
            warp_speed_boost: param_f64(params, "warp_speed_boost", d.warp_speed_boost),
            formation_slack: param_f64(params, "formation_slack", d.formation_slack),
            perturb_chance: param_f64(params, "perturb_chance", d.perturb_chance),
            perturb_impulse: param_f64(params, "perturb_impulse", d.perturb_impulse),
            ..d
        }
    }

    /// Current scalar tunables as a JSON object.
    pub fn params(&self) -> Value {
        json!({
            "particle_size": self.particle_size,
            "cell_size": self.cell_size,
            "field_strength": self.field_strength,
            "transition_duration": self.transition_duration,
            "min_velocity": self.min_velocity,
            "max_velocity": self.max_velocity,
            "warp_intensity": self.warp_intensity,
            "warp_speed_boost": self.warp_speed_boost,
            "formation_slack": self.formation_slack,
            "perturb_chance": self.perturb_chance,
            "perturb_impulse": self.perturb_impulse,
        })
    }

    /// Schema describing the scalar tunables, their types, ranges, and
    /// defaults.
    pub fn param_schema() -> Value {
        json!({
            "particle_size": {
                "type": "number",
                "default": DEFAULT_PARTICLE_SIZE,
                "min": 0.5,
                "max": 20.0,
                "description": "Base particle diameter in drawing units"
            },
            "cell_size": {
                "type": "number",
                "default": DEFAULT_CELL_SIZE,
                "min": 1.0,
                "max": 200.0,
                "description": "Flow-field cell edge length in drawing units"
            },
            "field_strength": {
                "type": "number",
                "default": DEFAULT_FIELD_STRENGTH,
                "min": 0.0,
                "max": 1.0,
                "description": "Force scale applied to flow-field directions"
            },
            "transition_duration": {
                "type": "integer",
                "default": DEFAULT_TRANSITION_DURATION,
                "min": 1,
                "max": 3600,
                "description": "Formation transition length in frames"
            },
            "min_velocity": {
                "type": "number",
                "default": DEFAULT_MIN_VELOCITY,
                "min": 0.0,
                "max": 10.0,
                "description": "Slowest per-particle speed limit"
            },
            "max_velocity": {
                "type": "number",
                "default": DEFAULT_MAX_VELOCITY,
                "min": 0.0,
                "max": 10.0,
                "description": "Fastest per-particle speed limit"
            },
            "warp_intensity": {
                "type": "number",
                "default": DEFAULT_WARP_INTENSITY,
                "min": 1.0,
                "max": 10.0,
                "description": "Steering multiplier reached at transition end"
            },
            "warp_speed_boost": {
                "type": "number",
                "default": DEFAULT_WARP_SPEED_BOOST,
                "min": 0.0,
                "max": 2.0,
                "description": "Fractional speed-limit boost at transition end"
            },
            "formation_slack": {
                "type": "number",
                "default": DEFAULT_FORMATION_SLACK,
                "min": 0.0,
                "max": 100.0,
                "description": "Drift allowed before a formed particle is pulled back"
            },
            "perturb_chance": {
                "type": "number",
                "default": DEFAULT_PERTURB_CHANCE,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-tick probability of a formed-state impulse"
            },
            "perturb_impulse": {
                "type": "number",
                "default": DEFAULT_PERTURB_IMPULSE,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-axis magnitude bound of the formed-state impulse"
            }
        })
    }
}
