//! A single simulated point-mass.
//!
//! Particles own their kinematic state (position, velocity, accumulated
//! acceleration), a bounded trail of past positions, and visual state
//! derived each frame from motion (size pulse, speed-mapped brightness).
//! Forces accumulate via [`Particle::apply_force`] and take effect at the
//! next [`Particle::integrate`], an explicit Euler step with a per-particle
//! speed limit.

use driftfield_core::{DrawSurface, FlowField, Viewport, Xorshift64};
use glam::DVec2;

use crate::config::SimConfig;
use crate::trail::{Trail, TRAIL_CAPACITY};

/// Distance to target below which the proximity size pulse kicks in.
const PULSE_DISTANCE: f64 = 5.0;
/// Steering force bounds; remaining distance maps into this range.
const STEER_MIN: f64 = 0.01;
const STEER_MAX: f64 = 0.2;
/// Trail never shrinks below this many positions.
const TRAIL_MIN: usize = 3;
/// Speed-fraction multiplier for the ambient trail length policy.
const TRAIL_SPEED_GAIN: f64 = 8.0;
/// Brightness range for the per-frame speed mapping.
const BRIGHTNESS_MIN: f64 = 180.0;
const BRIGHTNESS_MAX: f64 = 255.0;
/// Brightness range a particle spawns with (before the first derive).
const SPAWN_BRIGHTNESS_MIN: f64 = 150.0;
/// Spawn-time size jitter around the configured particle size.
const SIZE_JITTER_MIN: f64 = 0.7;
const SIZE_JITTER_MAX: f64 = 1.3;

/// Linear remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`,
/// clamped to the output range. A degenerate input range maps to `out_min`.
fn remap_clamped(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span.abs() < f64::EPSILON {
        return out_min;
    }
    let t = ((value - in_min) / span).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

/// One autonomous point-mass.
#[derive(Debug, Clone)]
pub struct Particle {
    position: DVec2,
    velocity: DVec2,
    acceleration: DVec2,
    target: Option<DVec2>,
    max_speed: f64,
    base_size: f64,
    size: f64,
    brightness: f64,
    trail: Trail,
    pulse_marked: bool,
}

impl Particle {
    /// Spawns a particle at `position` with randomized speed limit, size,
    /// and initial velocity.
    pub fn spawn(position: DVec2, config: &SimConfig, rng: &mut Xorshift64) -> Self {
        let base_size = rng.next_range(
            config.particle_size * SIZE_JITTER_MIN,
            config.particle_size * SIZE_JITTER_MAX,
        );
        Self {
            position,
            velocity: DVec2::new(
                rng.next_signed(config.min_velocity),
                rng.next_signed(config.min_velocity),
            ),
            acceleration: DVec2::ZERO,
            target: None,
            max_speed: rng.next_range(config.min_velocity, config.max_velocity),
            base_size,
            size: base_size,
            brightness: rng.next_range(SPAWN_BRIGHTNESS_MIN, BRIGHTNESS_MAX),
            trail: Trail::new(TRAIL_CAPACITY),
            pulse_marked: false,
        }
    }

    /// Accumulates a force. Takes effect at the next [`integrate`].
    ///
    /// [`integrate`]: Particle::integrate
    pub fn apply_force(&mut self, force: DVec2) {
        self.acceleration += force;
    }

    /// Applies the flow-field direction under this particle as a force
    /// scaled by `strength`. Outside the grid (resize races, viewport
    /// edges) no force is applied.
    pub fn follow_field(&mut self, field: &FlowField, strength: f64) {
        if let Some(dir) = field.direction_at(self.position) {
            self.apply_force(dir * strength);
        }
    }

    /// Steers toward the assigned target, if any.
    ///
    /// The force points at the target with magnitude proportional to the
    /// remaining distance, remapped from `[0, half_width]` to
    /// `[0.01, 0.2]` and scaled by `multiplier` (the warp ramp). A
    /// zero-distance target is a no-op. Within 5 units the particle marks
    /// the proximity pulse picked up by the next
    /// [`record_trail_and_derive`](Particle::record_trail_and_derive).
    pub fn steer_toward(&mut self, half_width: f64, multiplier: f64) {
        let Some(target) = self.target else {
            return;
        };
        let offset = target - self.position;
        let distance = offset.length();
        if distance <= f64::EPSILON {
            return;
        }
        let strength =
            remap_clamped(distance, 0.0, half_width, STEER_MIN, STEER_MAX) * multiplier;
        self.apply_force(offset / distance * strength);

        if distance < PULSE_DISTANCE {
            self.pulse_marked = true;
        }
    }

    /// Explicit Euler step: velocity absorbs the accumulated acceleration,
    /// is clamped to `max_speed * speed_scale`, and advances the position.
    /// `speed_scale` is 1.0 outside formation transitions.
    pub fn integrate(&mut self, speed_scale: f64) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.clamp_length_max(self.max_speed * speed_scale);
        self.position += self.velocity;
        self.acceleration = DVec2::ZERO;
    }

    /// Toroidal wrap, each axis independent. Any wrap clears the trail so
    /// no segment is drawn across the viewport.
    pub fn wrap_edges(&mut self, viewport: Viewport) {
        if viewport.is_degenerate() {
            return;
        }
        let mut wrapped = false;
        if self.position.x > viewport.width {
            self.position.x = 0.0;
            wrapped = true;
        } else if self.position.x < 0.0 {
            self.position.x = viewport.width;
            wrapped = true;
        }
        if self.position.y > viewport.height {
            self.position.y = 0.0;
            wrapped = true;
        } else if self.position.y < 0.0 {
            self.position.y = viewport.height;
            wrapped = true;
        }
        if wrapped {
            self.trail.clear();
        }
    }

    /// Records the current position into the trail, applies the trail
    /// length policy, and derives this frame's size and brightness.
    ///
    /// During a transition (`transition_progress = Some(p)`) the trail
    /// target length stretches from 3 to capacity as `p` goes 0 to 1.
    /// Otherwise it follows speed: `max(3, floor(speed_fraction * 8))`.
    pub fn record_trail_and_derive(&mut self, frame: u64, transition_progress: Option<f64>) {
        self.trail.push(self.position);

        let capacity = self.trail.capacity();
        let target_len = match transition_progress {
            Some(p) => {
                let p = p.clamp(0.0, 1.0);
                TRAIL_MIN + ((capacity - TRAIL_MIN) as f64 * p).floor() as usize
            }
            None => {
                let fraction = if self.max_speed > 0.0 {
                    (self.velocity.length() / self.max_speed).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                TRAIL_MIN.max((fraction * TRAIL_SPEED_GAIN).floor() as usize)
            }
        };
        self.trail.truncate_to(target_len.min(capacity));

        let f = frame as f64;
        self.size = if self.pulse_marked {
            self.base_size * (1.0 + (f * 0.1).sin() * 0.2)
        } else {
            self.base_size * (1.0 + (f * 0.05 + self.base_size).sin() * 0.1)
        };
        self.pulse_marked = false;

        self.brightness = remap_clamped(
            self.velocity.length(),
            0.0,
            self.max_speed,
            BRIGHTNESS_MIN,
            BRIGHTNESS_MAX,
        );
    }

    /// Draws the trail (fading and growing toward the newest point), a glow
    /// halo at 3x size, and the core circle with brightness as alpha.
    pub fn render(&self, surface: &mut dyn DrawSurface, config: &SimConfig) {
        let len = self.trail.len();
        if len > 1 {
            for (i, point) in self.trail.iter().enumerate().take(len - 1) {
                let alpha = remap_clamped(i as f64, 0.0, (len - 1) as f64, 10.0, 150.0) * 0.5;
                let diameter = remap_clamped(
                    i as f64,
                    0.0,
                    (len - 1) as f64,
                    self.size * 0.5,
                    self.size * 1.5,
                );
                surface.fill_circle(point, diameter, config.glow_color.with_alpha(alpha as u8));
            }
        }

        surface.fill_circle(self.position, self.size * 3.0, config.glow_color);
        surface.fill_circle(
            self.position,
            self.size,
            config.particle_color.with_alpha(self.brightness as u8),
        );
    }

    /// Replaces the velocity with a small random one in `[-limit, limit)`
    /// per axis. Used when a formation releases.
    pub fn reset_velocity(&mut self, rng: &mut Xorshift64, limit: f64) {
        self.velocity = DVec2::new(rng.next_signed(limit), rng.next_signed(limit));
    }

    /// Assigns (or clears) the steering target for this tick.
    pub fn set_target(&mut self, target: Option<DVec2>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<DVec2> {
        self.target
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Current speed in units per tick.
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn base_size(&self) -> f64 {
        self.base_size
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftfield_core::{BlendMode, Rgba};

    fn config() -> SimConfig {
        SimConfig::default()
    }

    fn spawn_at(x: f64, y: f64) -> Particle {
        let mut rng = Xorshift64::new(42);
        Particle::spawn(DVec2::new(x, y), &config(), &mut rng)
    }

    /// Counts circle draw calls; enough to verify render output shape.
    #[derive(Default)]
    struct CountingSurface {
        circles: Vec<(DVec2, f64, Rgba)>,
    }

    impl DrawSurface for CountingSurface {
        fn clear(&mut self) {}
        fn fill_background(&mut self, _color: Rgba) {}
        fn set_blend_mode(&mut self, _mode: BlendMode) {}
        fn fill_circle(&mut self, center: DVec2, diameter: f64, color: Rgba) {
            self.circles.push((center, diameter, color));
        }
    }

    // -- Spawn --

    #[test]
    fn spawn_randomizes_within_configured_ranges() {
        let cfg = config();
        let mut rng = Xorshift64::new(1);
        for _ in 0..100 {
            let p = Particle::spawn(DVec2::ZERO, &cfg, &mut rng);
            assert!(p.max_speed() >= cfg.min_velocity && p.max_speed() < cfg.max_velocity);
            assert!(
                p.base_size() >= cfg.particle_size * 0.7
                    && p.base_size() < cfg.particle_size * 1.3
            );
            assert!(p.brightness() >= 150.0 && p.brightness() < 255.0);
            assert!(p.velocity().x.abs() <= cfg.min_velocity);
            assert!(p.velocity().y.abs() <= cfg.min_velocity);
            assert!(p.trail().is_empty());
            assert!(p.target().is_none());
        }
    }

    // -- Forces and integration --

    #[test]
    fn apply_force_accumulates_until_integrate() {
        let mut p = spawn_at(100.0, 100.0);
        let before = p.position();
        p.apply_force(DVec2::new(0.5, 0.0));
        p.apply_force(DVec2::new(0.25, 0.0));
        assert_eq!(p.position(), before, "forces must not move the particle");
        p.integrate(1.0);
        assert!(p.velocity().x > 0.0);
        assert_ne!(p.position(), before);
    }

    #[test]
    fn integrate_clears_accumulated_acceleration() {
        let mut p = spawn_at(100.0, 100.0);
        p.apply_force(DVec2::new(10.0, 0.0));
        p.integrate(1.0);
        let v_after_first = p.velocity();
        p.integrate(1.0);
        assert_eq!(
            p.velocity(),
            v_after_first,
            "second integrate must not re-apply the force"
        );
    }

    #[test]
    fn integrate_clamps_speed_to_max_speed() {
        let mut p = spawn_at(0.0, 0.0);
        p.apply_force(DVec2::new(1000.0, -500.0));
        p.integrate(1.0);
        assert!(
            p.speed() <= p.max_speed() + 1e-9,
            "speed {} exceeds limit {}",
            p.speed(),
            p.max_speed()
        );
    }

    #[test]
    fn integrate_speed_scale_raises_the_limit() {
        let mut p = spawn_at(0.0, 0.0);
        p.apply_force(DVec2::new(1000.0, 0.0));
        p.integrate(1.5);
        assert!(p.speed() > p.max_speed());
        assert!(p.speed() <= p.max_speed() * 1.5 + 1e-9);
    }

    #[test]
    fn speed_limit_holds_for_any_force_history() {
        let mut p = spawn_at(400.0, 300.0);
        let mut rng = Xorshift64::new(77);
        for _ in 0..500 {
            p.apply_force(DVec2::new(rng.next_signed(50.0), rng.next_signed(50.0)));
            p.integrate(1.0);
            assert!(p.speed() <= p.max_speed() + 1e-9);
        }
    }

    // -- Flow field --

    #[test]
    fn follow_field_applies_force_inside_the_grid() {
        let field = FlowField::generate(Viewport::new(800.0, 600.0), 20.0, 42);
        let mut p = spawn_at(400.0, 300.0);
        p.follow_field(&field, 0.1);
        p.integrate(1.0);
        assert!(p.speed() > 0.0);
    }

    #[test]
    fn follow_field_outside_the_grid_is_silent() {
        let field = FlowField::generate(Viewport::new(800.0, 600.0), 20.0, 42);
        let mut p = spawn_at(-50.0, 300.0);
        // Below any possible max_speed, so the clamp cannot alter it.
        p.velocity = DVec2::new(0.05, 0.0);
        p.follow_field(&field, 0.1);
        p.integrate(1.0);
        assert_eq!(
            p.velocity(),
            DVec2::new(0.05, 0.0),
            "out-of-bounds lookup must add no force"
        );
    }

    // -- Steering --

    #[test]
    fn steer_toward_accelerates_toward_target() {
        let mut p = spawn_at(100.0, 100.0);
        p.velocity = DVec2::ZERO;
        p.set_target(Some(DVec2::new(300.0, 100.0)));
        p.steer_toward(400.0, 1.0);
        p.integrate(1.0);
        assert!(p.velocity().x > 0.0);
        assert!(p.velocity().y.abs() < 1e-12);
    }

    #[test]
    fn steer_without_target_is_a_no_op() {
        let mut p = spawn_at(100.0, 100.0);
        p.velocity = DVec2::ZERO;
        p.steer_toward(400.0, 1.0);
        p.integrate(1.0);
        assert_eq!(p.speed(), 0.0);
    }

    #[test]
    fn steer_at_zero_distance_is_a_guarded_no_op() {
        let mut p = spawn_at(100.0, 100.0);
        p.velocity = DVec2::ZERO;
        p.set_target(Some(DVec2::new(100.0, 100.0)));
        p.steer_toward(400.0, 1.0);
        p.integrate(1.0);
        assert_eq!(p.speed(), 0.0, "coincident target must produce no force");
    }

    #[test]
    fn steering_strength_is_clamped_at_the_far_end() {
        let mut p = spawn_at(0.0, 0.0);
        p.velocity = DVec2::ZERO;
        // Far beyond half_width: force magnitude must clamp to 0.2.
        p.set_target(Some(DVec2::new(10_000.0, 0.0)));
        p.steer_toward(400.0, 1.0);
        assert!((p.acceleration.length() - STEER_MAX).abs() < 1e-9);
    }

    #[test]
    fn steering_strength_is_floored_at_the_near_end() {
        let mut p = spawn_at(0.0, 0.0);
        p.velocity = DVec2::ZERO;
        p.set_target(Some(DVec2::new(0.5, 0.0)));
        p.steer_toward(400.0, 1.0);
        assert!(p.acceleration.length() >= STEER_MIN - 1e-12);
    }

    #[test]
    fn steering_multiplier_scales_the_force() {
        let mut a = spawn_at(0.0, 0.0);
        let mut b = a.clone();
        a.set_target(Some(DVec2::new(100.0, 0.0)));
        b.set_target(Some(DVec2::new(100.0, 0.0)));
        a.steer_toward(400.0, 1.0);
        b.steer_toward(400.0, 3.0);
        let ratio = b.acceleration.length() / a.acceleration.length();
        assert!((ratio - 3.0).abs() < 1e-9, "expected 3x force, got {ratio}x");
    }

    // -- Edge wrapping --

    #[test]
    fn wrap_past_right_edge_returns_to_zero_and_clears_trail() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut p = spawn_at(799.0, 300.0);
        p.max_speed = 10.0;
        p.velocity = DVec2::new(5.0, 0.0);
        p.record_trail_and_derive(1, None);
        assert!(!p.trail().is_empty());

        p.integrate(1.0);
        assert!(p.position().x > 800.0);
        p.wrap_edges(viewport);
        assert_eq!(p.position().x, 0.0);
        assert_eq!(p.trail().len(), 0, "wrap must clear the trail");
    }

    #[test]
    fn wrap_past_left_edge_reappears_at_width() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut p = spawn_at(1.0, 300.0);
        p.max_speed = 10.0;
        p.velocity = DVec2::new(-5.0, 0.0);
        p.integrate(1.0);
        p.wrap_edges(viewport);
        assert_eq!(p.position().x, 800.0);
    }

    #[test]
    fn wrap_handles_each_axis_independently() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut p = spawn_at(799.0, 599.0);
        p.max_speed = 10.0;
        p.velocity = DVec2::new(5.0, 5.0);
        p.integrate(1.0);
        p.wrap_edges(viewport);
        assert_eq!(p.position(), DVec2::new(0.0, 0.0));
    }

    #[test]
    fn in_bounds_position_is_untouched_and_trail_kept() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut p = spawn_at(400.0, 300.0);
        p.record_trail_and_derive(1, None);
        p.wrap_edges(viewport);
        assert_eq!(p.position(), DVec2::new(400.0, 300.0));
        assert!(!p.trail().is_empty());
    }

    #[test]
    fn positions_always_in_bounds_after_wrap() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut p = spawn_at(400.0, 300.0);
        let mut rng = Xorshift64::new(5);
        for _ in 0..1000 {
            p.apply_force(DVec2::new(rng.next_signed(2.0), rng.next_signed(2.0)));
            p.integrate(1.0);
            p.wrap_edges(viewport);
            let pos = p.position();
            assert!((0.0..=800.0).contains(&pos.x), "x out of bounds: {}", pos.x);
            assert!((0.0..=600.0).contains(&pos.y), "y out of bounds: {}", pos.y);
        }
    }

    // -- Trail policy and visual derivation --

    #[test]
    fn trail_length_follows_speed_when_dispersed() {
        let mut p = spawn_at(400.0, 300.0);
        p.velocity = DVec2::ZERO;
        for frame in 0..30 {
            p.record_trail_and_derive(frame, None);
        }
        assert_eq!(p.trail().len(), TRAIL_MIN, "at rest the trail stays minimal");
    }

    #[test]
    fn trail_length_interpolates_during_transition() {
        let mut p = spawn_at(400.0, 300.0);
        for frame in 0..30 {
            p.record_trail_and_derive(frame, Some(0.0));
        }
        assert_eq!(p.trail().len(), TRAIL_MIN);

        for frame in 30..80 {
            p.record_trail_and_derive(frame, Some(1.0));
        }
        assert_eq!(p.trail().len(), TRAIL_CAPACITY);
    }

    #[test]
    fn trail_length_midway_through_transition() {
        let mut p = spawn_at(400.0, 300.0);
        for frame in 0..40 {
            p.record_trail_and_derive(frame, Some(0.5));
        }
        // 3 + floor(17 * 0.5) = 11
        assert_eq!(p.trail().len(), 11);
    }

    #[test]
    fn ambient_size_pulse_uses_base_size_phase_offset() {
        let mut p = spawn_at(400.0, 300.0);
        let frame = 37;
        p.record_trail_and_derive(frame, None);
        let expected =
            p.base_size() * (1.0 + ((frame as f64) * 0.05 + p.base_size()).sin() * 0.1);
        assert!((p.size() - expected).abs() < 1e-12);
    }

    #[test]
    fn proximity_pulse_overrides_ambient_size_for_the_frame() {
        let mut p = spawn_at(100.0, 100.0);
        p.set_target(Some(DVec2::new(102.0, 100.0)));
        p.steer_toward(400.0, 1.0);
        let frame = 12;
        p.record_trail_and_derive(frame, None);
        let expected = p.base_size() * (1.0 + ((frame as f64) * 0.1).sin() * 0.2);
        assert!((p.size() - expected).abs() < 1e-12);

        // The mark is consumed; the next frame reverts to the ambient pulse.
        p.record_trail_and_derive(frame + 1, None);
        let ambient =
            p.base_size() * (1.0 + ((frame + 1) as f64 * 0.05 + p.base_size()).sin() * 0.1);
        assert!((p.size() - ambient).abs() < 1e-12);
    }

    #[test]
    fn brightness_maps_speed_onto_its_range() {
        let mut p = spawn_at(400.0, 300.0);
        p.velocity = DVec2::ZERO;
        p.record_trail_and_derive(1, None);
        assert!((p.brightness() - 180.0).abs() < 1e-12);

        p.velocity = DVec2::new(p.max_speed(), 0.0);
        p.record_trail_and_derive(2, None);
        assert!((p.brightness() - 255.0).abs() < 1e-12);
    }

    // -- Rendering --

    #[test]
    fn render_draws_trail_then_glow_then_core() {
        let mut p = spawn_at(400.0, 300.0);
        p.velocity = DVec2::new(1.0, 0.0);
        // Build a trail of 5 entries at full stretch.
        for frame in 0..5 {
            p.position += p.velocity;
            p.record_trail_and_derive(frame, Some(1.0));
        }
        let mut surface = CountingSurface::default();
        p.render(&mut surface, &config());
        // 4 trail circles (newest excluded) + glow + core.
        assert_eq!(surface.circles.len(), 6);

        let (glow_center, glow_dia, _) = surface.circles[4];
        assert_eq!(glow_center, p.position());
        assert!((glow_dia - p.size() * 3.0).abs() < 1e-12);

        let (core_center, core_dia, core_color) = surface.circles[5];
        assert_eq!(core_center, p.position());
        assert!((core_dia - p.size()).abs() < 1e-12);
        assert_eq!(core_color.a, p.brightness() as u8);
    }

    #[test]
    fn render_with_short_trail_skips_trail_circles() {
        let p = spawn_at(400.0, 300.0);
        let mut surface = CountingSurface::default();
        p.render(&mut surface, &config());
        assert_eq!(surface.circles.len(), 2, "empty trail draws only glow + core");
    }

    #[test]
    fn trail_circles_grow_and_brighten_toward_the_newest() {
        let mut p = spawn_at(400.0, 300.0);
        p.velocity = DVec2::new(1.5, 0.0);
        for frame in 0..10 {
            p.position += p.velocity;
            p.record_trail_and_derive(frame, Some(1.0));
        }
        let mut surface = CountingSurface::default();
        p.render(&mut surface, &config());
        let trail_circles = &surface.circles[..surface.circles.len() - 2];
        for pair in trail_circles.windows(2) {
            let (_, dia_a, col_a) = pair[0];
            let (_, dia_b, col_b) = pair[1];
            assert!(dia_b >= dia_a, "trail diameter must not shrink toward newest");
            assert!(col_b.a >= col_a.a, "trail alpha must not fade toward newest");
        }
    }

    // -- remap --

    #[test]
    fn remap_clamps_outside_the_input_range() {
        assert!((remap_clamped(-10.0, 0.0, 100.0, 0.0, 1.0) - 0.0).abs() < 1e-12);
        assert!((remap_clamped(500.0, 0.0, 100.0, 0.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn remap_degenerate_input_range_yields_out_min() {
        assert_eq!(remap_clamped(5.0, 2.0, 2.0, 0.3, 0.9), 0.3);
    }
}
