/*!
Per-mode physics.

Each tick consumes the pending input into an acceleration, runs exactly one of the mode
steps and then turns the body toward its movement when orientation follows movement.

- integrator: velocity integration with friction and braking deceleration
- walking:    grounded sweep-and-slide with step-up and floor snap
- falling:    airborne integration and landing, shared by flight
*/

pub mod falling;
pub mod integrator;
pub mod walking;

pub use falling::phys_falling;
pub use integrator::{VelocityParams, apply_velocity_braking, calc_velocity, input_acceleration};
pub use walking::{move_with_optional_step, phys_walking};

use crate::body::{Body, LocomotionMode};
use crate::climb::{self, ClimbState};
use crate::config::LocomotionConfig;
use crate::constants::MIN_TICK_TIME;
use crate::context::SimContext;
use crate::math::{self, horizontal};

/// Speed cap for the body's current mode.
pub fn max_speed(body: &Body, cfg: &LocomotionConfig) -> f32 {
    match body.mode() {
        LocomotionMode::Climbing => cfg.climb.max_speed,
        _ => body.tuning.max_walk_speed,
    }
}

pub fn max_acceleration(body: &Body, cfg: &LocomotionConfig) -> f32 {
    match body.mode() {
        LocomotionMode::Climbing => cfg.climb.max_acceleration,
        _ => body.tuning.max_acceleration,
    }
}

/// Run one physics step for the body's current mode.
pub fn perform_movement(
    body: &mut Body,
    climb: &mut ClimbState,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    if ctx.dt < MIN_TICK_TIME {
        return;
    }

    let input = body.consume_input();
    // Only climbing moves along the vertical axis on input.
    let input = if body.is_climbing() {
        input
    } else {
        horizontal(input)
    };
    body.acceleration = input_acceleration(input, max_acceleration(body, cfg));

    match body.mode() {
        LocomotionMode::Grounded => phys_walking(body, cfg, ctx),
        LocomotionMode::Falling | LocomotionMode::Flying => phys_falling(body, cfg, ctx),
        LocomotionMode::Climbing => climb::phys_climbing(body, climb, cfg, ctx),
    }

    physics_rotation(body, ctx.dt);
}

/// Yaw toward the acceleration direction, limited by the tuning's yaw rate (deg/s).
///
/// Climbing and flight own the rotation themselves.
pub fn physics_rotation(body: &mut Body, dt: f32) {
    if !body.orient_to_movement || body.is_climbing() || body.is_flying() {
        return;
    }
    let Some(target) = math::yaw_from_xz(body.acceleration.x, body.acceleration.z) else {
        return;
    };
    let current = math::Orientation::from_quat(&body.rotation).yaw;
    let max_delta = body.tuning.rotation_rate.yaw.to_radians() * dt;
    let yaw = math::fixed_turn(current, target, max_delta);
    body.rotation = math::yaw_rotation(yaw);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderShapeDef, Quat, StaticWorld, Vec3, WorldStaticDef};
    use crate::collision::settings::FLOOR_HOVER_HEIGHT;
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

    fn standing(cfg: &LocomotionConfig) -> Body {
        let height = cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT;
        Body::new(Vec3::new(0.0, height, 0.0), Quat::identity(), cfg)
    }

    #[test]
    fn walking_input_drops_vertical_intent() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut body = standing(&cfg);
        let mut climb = ClimbState::default();
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);
        body.add_movement_input(Vec3::new(0.0, 1.0, -1.0), 1.0);
        perform_movement(&mut body, &mut climb, &cfg, &mut ctx);
        assert_eq!(body.acceleration.y, 0.0);
        assert!((body.acceleration.z - -cfg.ground.tuning.max_acceleration).abs() < 1e-2);
        assert!(body.is_grounded());
    }

    #[test]
    fn degenerate_tick_leaves_body_alone() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut body = standing(&cfg);
        let mut climb = ClimbState::default();
        let before = body.position;
        body.add_movement_input(Vec3::x(), 1.0);
        let mut ctx = SimContext::new(0.0, cfg.world.gravity(), &world);
        perform_movement(&mut body, &mut climb, &cfg, &mut ctx);
        assert_eq!(body.position, before);
        assert_eq!(body.pending_input(), Vec3::x());
    }

    #[test]
    fn orient_to_movement_turns_at_the_yaw_rate() {
        let cfg = LocomotionConfig::default();
        let mut body = standing(&cfg);
        body.acceleration = Vec3::new(1.0, 0.0, 0.0);
        physics_rotation(&mut body, 0.1);
        let yaw = math::Orientation::from_quat(&body.rotation).yaw;
        let expected = -(cfg.ground.tuning.rotation_rate.yaw * 0.1).to_radians();
        assert!((yaw - expected).abs() < 1e-4);

        body.orient_to_movement = false;
        let before = body.rotation;
        physics_rotation(&mut body, 0.1);
        assert_eq!(body.rotation, before);
    }
}
