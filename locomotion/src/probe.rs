//! Geometry probe: the forward wall sweep and eye-height line traces.
//!
//! Every query is a pure read of the static world; the only side effect is optional
//! debug drawing.

use crate::body::Body;
use crate::collision::{CapsuleSpec, CollisionWorld, ContactSet, ProbeShape, Quat, RayHit, Vec3};
use crate::config::LocomotionConfig;
use crate::context::SimContext;
use crate::math::safe_normal;

/// Sweep `capsule` from `origin + forward * offset` one unit further along `forward`.
///
/// The extra unit keeps the sweep from being zero-length, which would miss flat terrain.
/// Returns every touched surface, nearest first.
pub fn sweep_forward(
    world: &dyn CollisionWorld,
    origin: Vec3,
    forward: Vec3,
    offset: f32,
    capsule: CapsuleSpec,
) -> ContactSet {
    let forward = safe_normal(forward);
    if forward == Vec3::zeros() {
        return ContactSet::new();
    }
    let start = origin + forward * offset;
    let end = start + forward;
    world.sweep_multi(ProbeShape::Capsule(capsule), Quat::identity(), start, end)
}

/// Forward wall sweep for `body`, using the configured probe capsule and offset.
pub fn sweep_body_forward(body: &Body, cfg: &LocomotionConfig, ctx: &mut SimContext) -> ContactSet {
    let probe = &cfg.probe;
    let contacts = sweep_forward(
        ctx.world,
        body.position,
        body.forward(),
        probe.forward_offset,
        probe.wall_capsule,
    );
    if cfg.debug_draw
        && let Some(debug) = ctx.debug()
    {
        let center = body.position + body.forward() * probe.forward_offset;
        debug.capsule(center, Quat::identity(), probe.wall_capsule, !contacts.is_empty());
        for contact in &contacts {
            debug.point(contact.point);
        }
    }
    contacts
}

/// Line trace from `origin` along `direction` for `distance` units.
pub fn ray_trace(
    world: &dyn CollisionWorld,
    origin: Vec3,
    direction: Vec3,
    distance: f32,
) -> Option<RayHit> {
    let direction = safe_normal(direction);
    if direction == Vec3::zeros() || distance <= 0.0 {
        return None;
    }
    world.ray_cast(origin, origin + direction * distance)
}

/// Eye height used by the climb traces; raised while climbing so the trace clears the
/// shrunk capsule and reaches the ledge above.
pub fn eye_height_offset(body: &Body, cfg: &LocomotionConfig) -> f32 {
    if body.is_climbing() {
        cfg.climb.collision_shrink_amount * cfg.climb.climbing_eye_shrink_multiplier
    } else {
        0.0
    }
}

/// Trace forward from the eyes; `true` if anything was hit within `distance`.
pub fn eye_height_trace(
    body: &Body,
    cfg: &LocomotionConfig,
    distance: f32,
    ctx: &mut SimContext,
) -> bool {
    let start = body.eye_location(eye_height_offset(body, cfg));
    let hit = ray_trace(ctx.world, start, body.forward(), distance);
    if cfg.debug_draw
        && let Some(debug) = ctx.debug()
    {
        debug.line(start, start + body.forward() * distance, hit.is_some());
    }
    hit.is_some()
}
