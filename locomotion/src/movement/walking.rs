use crate::body::{Body, LocomotionMode};
use crate::collision::{
    CapsuleSpec, CollisionWorld, MoveRequest, Vec3, move_capsule,
    settings::{DIST_EPS, FLOOR_HOVER_HEIGHT, FLOOR_PROBE_DISTANCE},
    snap_to_floor,
};
use crate::config::LocomotionConfig;
use crate::context::SimContext;
use crate::math::horizontal;

use super::integrator::{VelocityParams, calc_velocity};

/// One grounded step.
///
/// Behavior
/// - Integrates horizontal velocity with ground friction and walking braking.
/// - Sweep-and-slide along the ground, stepping up small ledges when blocked.
/// - Probes for floor and snaps to a small hover height.
/// - Losing walkable floor switches to Falling.
/// - Velocity is recomputed from the actual horizontal displacement.
pub fn phys_walking(body: &mut Body, cfg: &LocomotionConfig, ctx: &mut SimContext) {
    let dt = ctx.dt;
    let ground = &cfg.ground;
    let walkable_cos = ground.walkable_floor_cos();

    body.velocity = calc_velocity(
        horizontal(body.velocity),
        VelocityParams {
            dt,
            acceleration: horizontal(body.acceleration),
            friction: ground.ground_friction,
            fluid: false,
            braking_deceleration: ground.braking_deceleration_walking,
            braking_friction: body.tuning.braking_friction,
            max_speed: super::max_speed(body, cfg),
        },
    );
    // Ground movement ignores external forces.
    let _ = body.consume_force();

    let start = body.position;
    let desired = body.velocity * dt;
    let (after, used_step) = move_with_optional_step(
        ctx.world,
        body.capsule,
        start,
        desired,
        ground.max_step_height,
    );

    // Strict slope enforcement: no upward gain from horizontal movement without a step or
    // walkable support under the start position.
    let mut after = after;
    if after.y > start.y + DIST_EPS {
        let walkable = body.floor.map(|f| f.walkable).unwrap_or(false);
        if !used_step && !walkable {
            after.y = start.y;
        }
    }

    let (snapped, floor) = snap_to_floor(
        ctx.world,
        body.capsule,
        after,
        FLOOR_PROBE_DISTANCE + FLOOR_HOVER_HEIGHT,
        FLOOR_HOVER_HEIGHT,
        walkable_cos,
    );

    match floor.filter(|f| f.walkable) {
        Some(f) => {
            body.position = snapped;
            body.floor = Some(f);
        }
        None => {
            body.position = after;
            body.floor = None;
            body.set_mode(LocomotionMode::Falling);
        }
    }

    body.velocity = horizontal(body.position - start) / dt;
}

/// Move horizontally with sweep-and-slide; if significantly blocked, attempt a step-up:
/// - Up by `step_height`
/// - Forward by `desired`
/// - Down by `step_height` plus the floor probe distance
///
/// Returns (new_pos, used_step).
pub fn move_with_optional_step(
    world: &dyn CollisionWorld,
    capsule: CapsuleSpec,
    start: Vec3,
    desired: Vec3,
    step_height: f32,
) -> (Vec3, bool) {
    if desired.norm_squared() <= DIST_EPS * DIST_EPS {
        return (start, false);
    }

    let moved = move_capsule(world, MoveRequest::with_defaults(start, desired, capsule));
    let after = moved.end_pos;

    // If we got most of the desired move, don't bother stepping.
    let desired_len = horizontal(desired).norm();
    let achieved_len = horizontal(after - start).norm();
    if desired_len <= DIST_EPS || achieved_len >= desired_len * 0.9 || step_height <= 0.0 {
        return (after, false);
    }

    let up = move_capsule(
        world,
        MoveRequest::with_defaults(start, Vec3::new(0.0, step_height, 0.0), capsule),
    )
    .end_pos;
    let fwd = move_capsule(world, MoveRequest::with_defaults(up, desired, capsule)).end_pos;
    let down = move_capsule(
        world,
        MoveRequest::with_defaults(
            fwd,
            Vec3::new(0.0, -(step_height + FLOOR_PROBE_DISTANCE), 0.0),
            capsule,
        ),
    )
    .end_pos;

    // Accept the step only if it made more horizontal progress.
    if horizontal(down - start).norm() > achieved_len + 1.0e-3 {
        return (down, true);
    }
    (after, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderShapeDef, Quat, StaticWorld, WorldStaticDef};
    use nalgebra::Vector3;

    fn ground_with_step(step_top: f32) -> StaticWorld {
        StaticWorld::build(vec![
            WorldStaticDef::new(
                1,
                Vector3::zeros(),
                ColliderShapeDef::Plane {
                    offset_along_normal: 0.0,
                },
            ),
            // Raised slab starting at z = -100.
            WorldStaticDef::new(
                2,
                Vector3::new(0.0, step_top / 2.0, -600.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vector3::new(1000.0, step_top / 2.0, 500.0),
                },
            ),
        ])
    }

    fn standing_body(cfg: &LocomotionConfig) -> Body {
        let height = cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT;
        Body::new(Vec3::new(0.0, height, 0.0), Quat::identity(), cfg)
    }

    #[test]
    fn walking_accelerates_and_stays_grounded() {
        let cfg = LocomotionConfig::default();
        let world = ground_with_step(20.0);
        let mut body = standing_body(&cfg);
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);

        body.acceleration = Vec3::new(cfg.ground.tuning.max_acceleration, 0.0, 0.0);
        for _ in 0..30 {
            phys_walking(&mut body, &cfg, &mut ctx);
        }
        assert!(body.is_grounded());
        assert!(body.velocity.x > 400.0);
        assert!(body.velocity.x <= cfg.ground.tuning.max_walk_speed + 1.0);
        let expected_y = cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT;
        assert!((body.position.y - expected_y).abs() < 0.5);
    }

    #[test]
    fn steps_up_low_ledges() {
        let cfg = LocomotionConfig::default();
        let world = ground_with_step(20.0);
        let start = Vec3::new(0.0, cfg.body.capsule.total_half_height() + 1.0, -50.0);
        let (end, used_step) = move_with_optional_step(
            &world,
            cfg.body.capsule,
            start,
            Vec3::new(0.0, 0.0, -30.0),
            45.0,
        );
        assert!(used_step);
        assert!(end.z < start.z - 20.0);
        assert!(end.y > start.y + 10.0);
    }

    #[test]
    fn tall_ledges_block() {
        let cfg = LocomotionConfig::default();
        let world = ground_with_step(120.0);
        let start = Vec3::new(0.0, cfg.body.capsule.total_half_height() + 1.0, -50.0);
        let (end, used_step) = move_with_optional_step(
            &world,
            cfg.body.capsule,
            start,
            Vec3::new(0.0, 0.0, -30.0),
            45.0,
        );
        assert!(!used_step);
        assert!(end.z > -59.0);
    }

    #[test]
    fn walking_off_an_edge_starts_falling() {
        let cfg = LocomotionConfig::default();
        // Only a floating slab; nothing under the body once it leaves the slab.
        let world = StaticWorld::build(vec![WorldStaticDef::new(
            1,
            Vector3::new(0.0, -10.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(100.0, 10.0, 100.0),
            },
        )]);
        let mut body = standing_body(&cfg);
        body.position.x = 50.0;
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);
        body.acceleration = Vec3::new(cfg.ground.tuning.max_acceleration, 0.0, 0.0);
        body.velocity = Vec3::new(400.0, 0.0, 0.0);
        for _ in 0..30 {
            if !body.is_grounded() {
                break;
            }
            phys_walking(&mut body, &cfg, &mut ctx);
        }
        assert_eq!(body.mode(), LocomotionMode::Falling);
        assert!(body.floor.is_none());
    }
}
