use crate::body::{Body, LocomotionMode};
use crate::collision::{
    MoveRequest, Vec3, move_capsule, probe_floor,
    settings::{FLOOR_HOVER_HEIGHT, FLOOR_PROBE_DISTANCE},
};
use crate::config::LocomotionConfig;
use crate::context::SimContext;
use crate::math::horizontal;

use super::integrator::{VelocityParams, calc_velocity};

/// One airborne step, used for both Falling and Flying.
///
/// - Lateral velocity follows input scaled by air control.
/// - Gravity and pending forces (divided by mass) act on the full velocity.
/// - Downward speed is clamped to the terminal speed.
/// - Landing on a walkable surface while descending switches to Grounded.
pub fn phys_falling(body: &mut Body, cfg: &LocomotionConfig, ctx: &mut SimContext) {
    let dt = ctx.dt;
    let ground = &cfg.ground;
    let walkable_cos = ground.walkable_floor_cos();

    let lateral_accel = horizontal(body.acceleration) * body.tuning.air_control;
    let old_velocity = body.velocity;

    let lateral = calc_velocity(
        horizontal(body.velocity),
        VelocityParams {
            dt,
            acceleration: lateral_accel,
            friction: ground.falling_lateral_friction,
            fluid: false,
            braking_deceleration: ground.braking_deceleration_falling,
            braking_friction: body.tuning.braking_friction,
            max_speed: super::max_speed(body, cfg),
        },
    );

    let force_accel = body.consume_force() / body.mass;
    let mut velocity = Vec3::new(lateral.x, body.velocity.y, lateral.z);
    velocity += (ctx.gravity + force_accel) * dt;
    velocity.y = velocity.y.max(-ground.terminal_speed);
    body.velocity = velocity;

    let start = body.position;
    let delta = (old_velocity + body.velocity) * 0.5 * dt;
    let moved = move_capsule(
        ctx.world,
        MoveRequest::with_defaults(start, delta, body.capsule),
    );
    body.position = moved.end_pos;

    let descending = body.velocity.y <= 0.0;
    let landed_on_hit = moved
        .last_hit
        .is_some_and(|hit| descending && hit.normal.y >= walkable_cos);

    if landed_on_hit || descending {
        let floor = probe_floor(
            ctx.world,
            body.capsule,
            body.position,
            FLOOR_PROBE_DISTANCE + FLOOR_HOVER_HEIGHT,
            walkable_cos,
        );
        if let Some(floor) = floor.filter(|f| f.walkable) {
            body.position = body.position - Vec3::y() * floor.distance
                + floor.hit.normal * FLOOR_HOVER_HEIGHT;
            body.velocity.y = 0.0;
            body.floor = Some(floor);
            body.set_mode(LocomotionMode::Grounded);
            return;
        }
    }

    if moved.last_hit.is_some() {
        // Reflect the slide in the reported velocity.
        body.velocity = (body.position - start) / dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderShapeDef, Quat, StaticWorld, WorldStaticDef};
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

    #[test]
    fn gravity_accelerates_a_falling_body() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut body = Body::new(Vec3::new(0.0, 1000.0, 0.0), Quat::identity(), &cfg);
        body.set_mode(LocomotionMode::Falling);
        let mut ctx = SimContext::new(0.1, cfg.world.gravity(), &world);
        phys_falling(&mut body, &cfg, &mut ctx);
        assert!((body.velocity.y - -98.0).abs() < 1e-3);
        // Average of old and new velocity.
        assert!((body.position.y - (1000.0 - 4.9)).abs() < 1e-3);
        assert!(body.is_falling());
    }

    #[test]
    fn upward_force_cancels_gravity() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut body = Body::new(Vec3::new(0.0, 1000.0, 0.0), Quat::identity(), &cfg);
        body.set_mode(LocomotionMode::Falling);
        body.add_force(Vec3::y() * body.mass * 980.0);
        let mut ctx = SimContext::new(0.1, cfg.world.gravity(), &world);
        phys_falling(&mut body, &cfg, &mut ctx);
        assert!(body.velocity.y.abs() < 1e-3);
    }

    #[test]
    fn lands_on_the_ground() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let start_y = cfg.body.capsule.total_half_height() + 30.0;
        let mut body = Body::new(Vec3::new(0.0, start_y, 0.0), Quat::identity(), &cfg);
        body.set_mode(LocomotionMode::Falling);
        body.velocity = Vec3::new(200.0, -300.0, 0.0);
        let mut ctx = SimContext::new(1.0 / 30.0, cfg.world.gravity(), &world);
        for _ in 0..30 {
            phys_falling(&mut body, &cfg, &mut ctx);
            if body.is_grounded() {
                break;
            }
        }
        assert!(body.is_grounded());
        assert_eq!(body.velocity.y, 0.0);
        let expected_y = cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT;
        assert!((body.position.y - expected_y).abs() < 0.5);
        assert!(body.floor.is_some());
    }

    #[test]
    fn terminal_speed_caps_descent() {
        let cfg = LocomotionConfig::default();
        let world = flat();
        let mut body = Body::new(Vec3::new(0.0, 1.0e6, 0.0), Quat::identity(), &cfg);
        body.set_mode(LocomotionMode::Falling);
        body.velocity = Vec3::new(0.0, -3990.0, 0.0);
        let mut ctx = SimContext::new(0.1, cfg.world.gravity(), &world);
        phys_falling(&mut body, &cfg, &mut ctx);
        assert!((body.velocity.y - -cfg.ground.terminal_speed).abs() < 1e-3);
    }
}
