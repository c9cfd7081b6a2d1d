/*!
Powered flight and gliding.

Flight is layered on the airborne integrator: the body stays in an airborne mode
(`Flying`), and every tick before physics this module
- measures how far the aim is pitched against the body's heading (inclination)
- turns that into a lift fraction through the two lift curves
- pushes glide input along the aim heading and lift force against gravity
- while powered, steers the velocity toward the glide direction and the aim pitch
- banks, pitches and yaws the body to follow its own velocity

Entering and leaving swaps the body's movement tuning with the flight tuning.
*/

use crate::body::{Body, LocomotionMode};
use crate::collision::{Quat, Vec3};
use crate::config::{FlightConfig, LocomotionConfig};
use crate::constants::MAX_FLIGHT_PITCH_DEG;
use crate::context::SimContext;
use crate::curve::Curve;
use crate::math::{
    self, Orientation, finterp_to, forward_axis, horizontal, interp_angle_to, map_range_clamped,
    normalize_angle, safe_normal, up_axis, vinterp_to,
};

/// Per-body flight values that persist between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightState {
    pub flying: bool,
    /// Lift was strong enough this tick to steer the velocity.
    pub can_fly: bool,
    /// Forward input is held; animation only.
    pub flapping: bool,
    pub glide_speed: f32,
    pub lift: f32,
    pub inclination: f32,
    /// Degrees of the velocity above the body's horizontal plane; animation only.
    pub velocity_angle: f32,
    pub flying_speed: f32,
}

impl FlightState {
    /// Back to defaults, keeping the input-driven flapping flag.
    fn reset(&mut self) {
        *self = Self {
            flapping: self.flapping,
            ..Self::default()
        };
    }
}

/// Fly toggle: starts flight while airborne, stops it while flying. Ignored on the ground.
///
/// Returns whether the body is flying afterwards.
pub fn toggle(state: &mut FlightState, body: &mut Body, cfg: &LocomotionConfig) -> bool {
    if !body.is_falling() {
        return state.flying;
    }
    if state.flying {
        stop_flying(state, body, cfg);
    } else {
        start_flying(state, body, cfg);
    }
    state.flying
}

pub fn start_flying(state: &mut FlightState, body: &mut Body, cfg: &LocomotionConfig) {
    state.reset();
    state.flying = true;
    body.tuning = cfg.flight.tuning;
    body.set_mode(LocomotionMode::Flying);
    log::debug!("flight started at {:?}", body.position);
}

/// Leave flight: restore the default tuning, stand upright and damp the velocity.
pub fn stop_flying(state: &mut FlightState, body: &mut Body, cfg: &LocomotionConfig) {
    state.reset();
    body.tuning = body.default_tuning;
    if body.is_flying() {
        body.set_mode(LocomotionMode::Falling);
    }
    body.rotation = math::yaw_only(&body.rotation);
    body.velocity /= cfg.flight.landing_damping;
    log::debug!("flight stopped at {:?}", body.position);
}

/// Exit flight once the body is no longer airborne. Returns true if flight ended.
pub fn check_landing(state: &mut FlightState, body: &mut Body, cfg: &LocomotionConfig) -> bool {
    if state.flying && !body.is_falling() {
        stop_flying(state, body, cfg);
        return true;
    }
    false
}

/// `up(aim) . forward(yaw of body)`: 0 for a level aim, negative when aiming up.
pub fn compute_inclination(aim: &Quat, body_rotation: &Quat) -> f32 {
    let heading = forward_axis(&math::yaw_only(body_rotation));
    up_axis(aim).dot(&heading)
}

/// Aim angle in degrees (positive when aiming up) derived from an inclination.
#[inline]
pub fn inclination_angle(inclination: f32) -> f32 {
    inclination.clamp(-1.0, 1.0).acos().to_degrees() - 90.0
}

/// Lift fraction from the aim and the current descent speed.
pub fn compute_lift(
    inclination: f32,
    vertical_velocity: f32,
    angle_curve: &dyn Curve,
    descent_curve: &dyn Curve,
    descent_floor: f32,
) -> f32 {
    let descent = vertical_velocity.clamp(descent_floor, 0.0).abs();
    angle_curve.sample(inclination_angle(inclination)) * descent_curve.sample(descent)
}

/// Lift rounds to a nonzero whole number.
#[inline]
pub fn is_powered(lift: f32) -> bool {
    lift.round() != 0.0
}

/// Steer horizontal velocity toward `glide_direction` at the current horizontal speed and
/// vertical velocity toward the aim, clamped to the configured range.
pub fn apply_flight_velocity(
    body: &mut Body,
    inclination: f32,
    glide_direction: Vec3,
    gravity_y: f32,
    cfg: &FlightConfig,
    dt: f32,
) {
    let planar = horizontal(body.velocity);
    let target_planar = glide_direction * planar.norm();
    let planar = vinterp_to(planar, target_planar, dt, cfg.glide_turn_rate);

    let target_vertical = inclination * gravity_y * inclination.abs() * cfg.vertical_target_scale;
    let vertical = finterp_to(body.velocity.y, target_vertical, dt, cfg.vertical_interp_rate)
        .clamp(cfg.min_vertical_velocity, cfg.max_vertical_velocity);

    body.velocity = Vec3::new(planar.x, vertical, planar.z);
}

/// Pitch follows the velocity, yaw faces the horizontal travel direction and roll banks
/// by how far the heading lags behind it.
pub fn flight_rotation(body: &mut Body, cfg: &FlightConfig, dt: f32) {
    let current = Orientation::from_quat(&body.rotation);
    let planar = horizontal(body.velocity);

    let max_pitch = MAX_FLIGHT_PITCH_DEG.to_radians();
    let target_pitch = body.velocity.y.atan2(planar.norm()).clamp(-max_pitch, max_pitch);
    let target_yaw = math::yaw_from_xz(planar.x, planar.z).unwrap_or(current.yaw);
    let deviation = normalize_angle(target_yaw - current.yaw);
    let max_bank = cfg.max_bank_deg.to_radians();
    let target_roll = (-deviation * cfg.bank_scale).clamp(-max_bank, max_bank);

    let rate = cfg.rotation_interp_rate;
    body.rotation = Orientation::new(
        interp_angle_to(current.yaw, target_yaw, dt, rate),
        interp_angle_to(current.pitch, target_pitch, dt, rate),
        interp_angle_to(current.roll, target_roll, dt, rate),
    )
    .to_quat();
}

/// Flight work done before the airborne physics step. `aim` is the controller rotation.
pub fn pre_physics(
    state: &mut FlightState,
    body: &mut Body,
    aim: &Quat,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    let flight = &cfg.flight;
    let dt = ctx.dt;

    state.inclination = compute_inclination(aim, &body.rotation);
    state.lift = compute_lift(
        state.inclination,
        body.velocity.y,
        &flight.angle_lift_curve,
        &flight.descent_lift_curve,
        flight.lift_descent_floor,
    );
    state.can_fly = is_powered(state.lift);

    // Faster when diving, slower when climbing.
    let glide_target = map_range_clamped(
        body.velocity.y,
        flight.glide_full_descent,
        0.0,
        flight.glide_max_scale,
        0.0,
    );
    let glide_rate = state.inclination.abs() + flight.glide_rate_bias;
    state.glide_speed = finterp_to(state.glide_speed, glide_target, dt, glide_rate);
    let glide_direction = forward_axis(&math::yaw_only(aim));
    body.add_movement_input(glide_direction, state.glide_speed);

    body.add_force(Vec3::y() * body.mass * ctx.gravity.y.abs() * state.lift);

    if state.can_fly {
        apply_flight_velocity(
            body,
            state.inclination,
            glide_direction,
            ctx.gravity.y,
            flight,
            dt,
        );
    }

    let direction = safe_normal(body.velocity);
    state.velocity_angle = if direction == Vec3::zeros() {
        0.0
    } else {
        inclination_angle(direction.dot(&-body.up()))
    };
    state.flying_speed = body.velocity.norm();

    flight_rotation(body, flight, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::settings::FLOOR_HOVER_HEIGHT;
    use crate::collision::{ColliderShapeDef, StaticWorld, WorldStaticDef};
    use crate::movement::phys_falling;
    use nalgebra::Vector3;

    fn flat() -> StaticWorld {
        StaticWorld::build(vec![WorldStaticDef::new(
            1,
            Vector3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )])
    }

    fn airborne(cfg: &LocomotionConfig, height: f32) -> Body {
        let mut body = Body::new(Vec3::new(0.0, height, 0.0), Quat::identity(), cfg);
        body.set_mode(LocomotionMode::Falling);
        body
    }

    fn aim(pitch_deg: f32) -> Quat {
        Orientation::new(0.0, pitch_deg.to_radians(), 0.0).to_quat()
    }

    #[test]
    fn lift_is_quantized_at_one_half() {
        let one = |_: f32| 1.0_f32;
        let low = |_: f32| 0.49999_f32;
        let high = |_: f32| 0.50001_f32;
        assert!(!is_powered(compute_lift(0.0, -100.0, &low, &one, -4000.0)));
        assert!(is_powered(compute_lift(0.0, -100.0, &high, &one, -4000.0)));
        assert!(!is_powered(0.0));
    }

    #[test]
    fn aiming_up_is_a_positive_lift_angle() {
        let inclination = compute_inclination(&aim(30.0), &Quat::identity());
        assert!((inclination - -0.5).abs() < 1e-5);

        let angle = |a: f32| a;
        let descent = |d: f32| d;
        // Descent speed is clamped to the floor before sampling.
        let lift = compute_lift(inclination, -5000.0, &angle, &descent, -4000.0);
        assert!((lift - 30.0 * 4000.0).abs() < 1.0);
        let lift = compute_lift(inclination, 300.0, &angle, &descent, -4000.0);
        assert_eq!(lift, 0.0);
    }

    #[test]
    fn inclination_ignores_body_pitch() {
        let pitched = Orientation::new(0.3, 0.7, 0.2).to_quat();
        let level = math::yaw_rotation(0.3);
        let aim = Orientation::new(0.3, 0.4, 0.0).to_quat();
        let a = compute_inclination(&aim, &pitched);
        let b = compute_inclination(&aim, &level);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn powered_vertical_velocity_stays_in_range() {
        let cfg = LocomotionConfig::default();
        let flight = &cfg.flight;
        for gravity in [-980.0, -4000.0, 980.0] {
            for step in 0..=20 {
                let inclination = -1.0 + step as f32 * 0.1;
                for start in [-9000.0, 0.0, 9000.0] {
                    let mut body = airborne(&cfg, 1000.0);
                    body.velocity = Vec3::new(100.0, start, 0.0);
                    apply_flight_velocity(&mut body, inclination, -Vec3::z(), gravity, flight, 1.0);
                    assert!(body.velocity.y >= flight.min_vertical_velocity);
                    assert!(body.velocity.y <= flight.max_vertical_velocity);
                }
            }
        }
    }

    #[test]
    fn glide_turns_velocity_and_keeps_speed() {
        let cfg = LocomotionConfig::default();
        let mut body = airborne(&cfg, 1000.0);
        body.velocity = Vec3::new(400.0, -50.0, 0.0);
        for _ in 0..120 {
            apply_flight_velocity(&mut body, 0.0, -Vec3::z(), -980.0, &cfg.flight, 1.0 / 60.0);
        }
        let planar = horizontal(body.velocity);
        assert!(planar.normalize().dot(&-Vec3::z()) > 0.95);
        assert!(planar.norm() > 150.0);
        // Level aim targets zero vertical speed.
        assert!(body.velocity.y.abs() < 1.0);
    }

    #[test]
    fn toggle_swaps_tuning_only_while_airborne() {
        let cfg = LocomotionConfig::default();
        let mut state = FlightState::default();
        let mut grounded = Body::new(Vec3::zeros(), Quat::identity(), &cfg);
        assert!(!toggle(&mut state, &mut grounded, &cfg));
        assert!(grounded.is_grounded());

        let mut body = airborne(&cfg, 1000.0);
        assert!(toggle(&mut state, &mut body, &cfg));
        assert!(body.is_flying());
        assert_eq!(body.tuning, cfg.flight.tuning);

        body.velocity = Vec3::new(0.0, -300.0, 0.0);
        assert!(!toggle(&mut state, &mut body, &cfg));
        assert_eq!(body.mode(), LocomotionMode::Falling);
        assert_eq!(body.tuning, cfg.ground.tuning);
        assert!((body.velocity.y - -100.0).abs() < 1e-3);
    }

    #[test]
    fn banks_into_a_turn_and_faces_travel() {
        let cfg = LocomotionConfig::default();
        let mut body = airborne(&cfg, 1000.0);
        // Travelling to the right of the heading.
        body.velocity = Vec3::new(500.0, 0.0, 0.0);
        flight_rotation(&mut body, &cfg.flight, 1.0 / 60.0);
        assert!(Orientation::from_quat(&body.rotation).roll > 0.0);

        for _ in 0..600 {
            flight_rotation(&mut body, &cfg.flight, 1.0 / 60.0);
        }
        let orientation = Orientation::from_quat(&body.rotation);
        assert!((orientation.yaw - -std::f32::consts::FRAC_PI_2).abs() < 1e-2);
        assert!(orientation.pitch.abs() < 1e-2);
        assert!(orientation.roll.abs() < 1e-2);
    }

    #[test]
    fn pre_physics_pushes_glide_and_lift() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);
        let mut state = FlightState::default();
        let mut body = airborne(&cfg, 1000.0);
        start_flying(&mut state, &mut body, &cfg);
        body.velocity = Vec3::new(0.0, -500.0, -200.0);

        pre_physics(&mut state, &mut body, &aim(0.0), &cfg, &mut ctx);
        assert!(state.inclination.abs() < 1e-6);
        // Level aim samples 0.6 from the angle curve and 1.1 from the descent curve.
        assert!((state.lift - 0.66).abs() < 1e-3);
        assert!(state.can_fly);
        assert!(state.glide_speed > 0.0);
        assert!(body.pending_input().z < 0.0);
        let force = body.consume_force();
        assert!((force.y - body.mass * 980.0 * state.lift).abs() < 1e-1);
        // Powered flight eases vertical speed toward the level target.
        assert!(body.velocity.y > -500.0);
    }

    #[test]
    fn landing_ends_flight_with_damped_velocity() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);
        let standing = cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT;
        let mut state = FlightState::default();
        let mut body = airborne(&cfg, standing + 1.0);
        assert!(toggle(&mut state, &mut body, &cfg));
        body.rotation = Orientation::new(0.5, 0.3, 0.2).to_quat();
        body.velocity = Vec3::new(300.0, -100.0, 0.0);

        phys_falling(&mut body, &cfg, &mut ctx);
        assert!(!body.is_falling());
        let before = body.velocity;
        assert!(check_landing(&mut state, &mut body, &cfg));

        assert!(!state.flying);
        assert!((body.velocity - before / 3.0).norm() < 1e-3);
        let orientation = Orientation::from_quat(&body.rotation);
        assert!((orientation.yaw - 0.5).abs() < 1e-4);
        assert!(orientation.pitch.abs() < 1e-5);
        assert!(orientation.roll.abs() < 1e-5);
        assert!(body.is_grounded());
        assert_eq!(body.tuning, body.default_tuning);
    }
}
