#![deny(unsafe_code)]
//! The driftfield particle animation engine.
//!
//! A [`Simulation`] owns a contiguous arena of [`Particle`]s, the current
//! [`FlowField`], and a set of formation anchors. Each tick it advances the
//! group state machine (dispersed wandering, a timed transition into
//! formation, and a holding state), then integrates, wraps, derives visual
//! state, and renders every particle against the host-supplied
//! [`DrawSurface`].
//!
//! The host drives the engine with three calls: [`Simulation::initialize`]
//! once, [`Simulation::tick`] every frame with the formation flag, and
//! [`Simulation::on_resize`] on viewport changes. One `on_ready` callback
//! fires after initial state exists.

pub mod config;
pub mod layout;
pub mod particle;
pub mod trail;

pub use config::{Assignment, SimConfig};
pub use layout::{Formation, FormationKind};
pub use particle::Particle;
pub use trail::{Trail, TRAIL_CAPACITY};

use driftfield_core::{DrawSurface, FlowField, Viewport, Xorshift64};
use glam::DVec2;

/// One particle per this many square units of viewport area.
pub const PARTICLE_DENSITY_DIVISOR: f64 = 10_000.0;

/// Hard cap on the particle count, regardless of viewport area.
pub const MAX_PARTICLES: usize = 300;

/// Particle density policy: `min(floor(area / 10_000), 300)`.
pub fn particle_count_for(viewport: Viewport) -> usize {
    ((viewport.area() / PARTICLE_DENSITY_DIVISOR).floor() as usize).min(MAX_PARTICLES)
}

/// Group state of the swarm. One value per simulation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ambient wandering under the flow field.
    Dispersed,
    /// Steering into formation; `started` is the frame the flag flipped.
    Transitioning { started: u64 },
    /// Holding at the anchors. `released` records when the flag dropped;
    /// the formation breaks after a full transition duration of release.
    Formed { released: Option<u64> },
}

/// The particle animation engine.
pub struct Simulation {
    config: SimConfig,
    formation: FormationKind,
    viewport: Viewport,
    particles: Vec<Particle>,
    field: FlowField,
    anchors: Vec<DVec2>,
    /// Particle index -> anchor index, fixed for one transition.
    assignment: Vec<usize>,
    mode: Mode,
    frame: u64,
    rng: Xorshift64,
    seed: u64,
    on_ready: Option<Box<dyn FnOnce()>>,
}

impl Simulation {
    /// Creates an engine with no particles. Call
    /// [`initialize`](Simulation::initialize) with the host viewport to
    /// build initial state.
    pub fn new(config: SimConfig, formation: FormationKind, seed: u64) -> Self {
        let viewport = Viewport::new(0.0, 0.0);
        let field = FlowField::generate(viewport, config.cell_size, seed as u32);
        Self {
            config,
            formation,
            viewport,
            particles: Vec::new(),
            field,
            anchors: Vec::new(),
            assignment: Vec::new(),
            mode: Mode::Dispersed,
            frame: 0,
            rng: Xorshift64::new(seed),
            seed,
            on_ready: None,
        }
    }

    /// Registers the callback fired once when `initialize` completes.
    pub fn set_on_ready(&mut self, callback: impl FnOnce() + 'static) {
        self.on_ready = Some(Box::new(callback));
    }

    /// Builds initial state for the given viewport: particles at random
    /// positions (count from the density policy), the flow field, and the
    /// formation anchors. Completes without error for a degenerate
    /// viewport; it just produces zero particles and an empty field.
    ///
    /// Fires the `on_ready` callback, if registered, exactly once.
    pub fn initialize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let count = particle_count_for(viewport);
        let particles: Vec<Particle> = (0..count)
            .map(|_| {
                let position = DVec2::new(
                    self.rng.next_f64() * viewport.width,
                    self.rng.next_f64() * viewport.height,
                );
                Particle::spawn(position, &self.config, &mut self.rng)
            })
            .collect();
        self.particles = particles;
        self.field = FlowField::generate(viewport, self.config.cell_size, self.seed as u32);
        self.anchors = self.formation.anchors(viewport, count, &mut self.rng);

        if let Some(callback) = self.on_ready.take() {
            callback();
        }
    }

    /// Regenerates the flow field and anchors for a new viewport. Existing
    /// particles are kept (positions now out of bounds are corrected by
    /// the next wrap) and new ones are appended if the density policy
    /// demands more. Particles are never removed.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let desired = particle_count_for(viewport);
        while self.particles.len() < desired {
            let position = DVec2::new(
                self.rng.next_f64() * viewport.width,
                self.rng.next_f64() * viewport.height,
            );
            let particle = Particle::spawn(position, &self.config, &mut self.rng);
            self.particles.push(particle);
        }
        self.field = FlowField::generate(viewport, self.config.cell_size, self.seed as u32);
        self.anchors = self
            .formation
            .anchors(viewport, self.particles.len(), &mut self.rng);
        if !matches!(self.mode, Mode::Dispersed) {
            self.assignment = self.compute_assignment();
        }
    }

    /// Advances the simulation one frame and renders it.
    ///
    /// Synchronous and non-blocking; cost is bounded by particle count
    /// times trail length. The host guarantees ticks are never concurrent
    /// and never interleaved with `on_resize`.
    pub fn tick(&mut self, formation_requested: bool, surface: &mut dyn DrawSurface) {
        surface.clear();
        surface.fill_background(self.config.background);
        self.frame += 1;
        self.advance_mode(formation_requested);

        let half_width = self.viewport.width * 0.5;
        let progress = self.transition_progress();

        match self.mode {
            Mode::Dispersed => {
                let strength = self.config.field_strength;
                for particle in self.particles.iter_mut() {
                    particle.follow_field(&self.field, strength);
                }
            }
            Mode::Transitioning { .. } => {
                let warp = 1.0 + progress.unwrap_or(0.0) * (self.config.warp_intensity - 1.0);
                for (i, particle) in self.particles.iter_mut().enumerate() {
                    let anchor = self
                        .assignment
                        .get(i)
                        .and_then(|&a| self.anchors.get(a))
                        .copied();
                    particle.set_target(anchor);
                    particle.steer_toward(half_width, warp);
                }
            }
            Mode::Formed { .. } => {
                let slack = self.config.formation_slack;
                let chance = self.config.perturb_chance;
                let impulse = self.config.perturb_impulse;
                for (i, particle) in self.particles.iter_mut().enumerate() {
                    let anchor = self
                        .assignment
                        .get(i)
                        .and_then(|&a| self.anchors.get(a))
                        .copied();
                    particle.set_target(anchor);
                    if let Some(anchor) = anchor {
                        if (anchor - particle.position()).length() > slack {
                            particle.steer_toward(half_width, 1.0);
                        }
                    }
                    if self.rng.next_f64() < chance {
                        let kick = DVec2::new(
                            self.rng.next_signed(impulse),
                            self.rng.next_signed(impulse),
                        );
                        particle.apply_force(kick);
                    }
                }
            }
        }

        let speed_scale = match progress {
            Some(p) => 1.0 + p * self.config.warp_speed_boost,
            None => 1.0,
        };
        let dispersed = matches!(self.mode, Mode::Dispersed);
        for particle in self.particles.iter_mut() {
            particle.integrate(speed_scale);
            if dispersed {
                particle.wrap_edges(self.viewport);
            }
            particle.record_trail_and_derive(self.frame, progress);
            particle.render(surface, &self.config);
        }
    }

    /// Evaluates the group transition table. Runs once per tick before the
    /// per-particle dispatch.
    fn advance_mode(&mut self, requested: bool) {
        let duration = self.config.transition_duration;
        match self.mode {
            Mode::Dispersed => {
                if requested {
                    self.assignment = self.compute_assignment();
                    // The clock starts at the flag flip, the instant before
                    // this tick's work.
                    self.mode = Mode::Transitioning {
                        started: self.frame.saturating_sub(1),
                    };
                }
            }
            Mode::Transitioning { started } => {
                // Never reversed mid-flight; the flag is re-read only once
                // the transition has run its course.
                if self.frame.saturating_sub(started) >= duration {
                    if requested {
                        self.mode = Mode::Formed { released: None };
                    } else {
                        self.release_formation();
                    }
                }
            }
            Mode::Formed { released } => match (requested, released) {
                (true, Some(_)) => self.mode = Mode::Formed { released: None },
                (true, None) => {}
                (false, None) => {
                    self.mode = Mode::Formed {
                        released: Some(self.frame.saturating_sub(1)),
                    };
                }
                (false, Some(flipped)) => {
                    if self.frame.saturating_sub(flipped) >= duration {
                        self.release_formation();
                    }
                }
            },
        }
    }

    /// Progress of the running transition in [0, 1], or `None` outside one.
    fn transition_progress(&self) -> Option<f64> {
        match self.mode {
            Mode::Transitioning { started } => {
                let duration = self.config.transition_duration.max(1) as f64;
                Some(((self.frame.saturating_sub(started)) as f64 / duration).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }

    /// Breaks the formation: targets cleared, velocities re-randomized,
    /// back to ambient wandering.
    fn release_formation(&mut self) {
        let limit = self.config.min_velocity;
        for particle in self.particles.iter_mut() {
            particle.set_target(None);
            particle.reset_velocity(&mut self.rng, limit);
        }
        self.assignment.clear();
        self.mode = Mode::Dispersed;
    }

    /// Computes the particle-to-anchor permutation for one transition.
    ///
    /// `nearest-first` sorts particle indices by distance to the anchor
    /// centroid so the closest particles take the most significant anchors;
    /// an O(n log n) pass over the arena, never a collection reshuffle.
    fn compute_assignment(&self) -> Vec<usize> {
        let n = self.particles.len();
        match self.config.assignment {
            Assignment::ByIndex => (0..n).collect(),
            Assignment::NearestFirst => {
                if n == 0 || self.anchors.is_empty() {
                    return (0..n).collect();
                }
                let centroid = self
                    .anchors
                    .iter()
                    .fold(DVec2::ZERO, |acc, a| acc + *a)
                    / self.anchors.len() as f64;
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by(|&a, &b| {
                    let da = (self.particles[a].position() - centroid).length_squared();
                    let db = (self.particles[b].position() - centroid).length_squared();
                    da.total_cmp(&db)
                });
                let mut assignment = vec![0; n];
                for (rank, &particle_index) in order.iter().enumerate() {
                    assignment[particle_index] = rank;
                }
                assignment
            }
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Monotonic frame counter; never reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn anchors(&self) -> &[DVec2] {
        &self.anchors
    }

    /// The current particle-to-anchor permutation (empty outside a
    /// transition or formation).
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }
}
