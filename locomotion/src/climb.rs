/*!
Wall climbing.

`NotClimbing -> Climbing -> NotClimbing`, driven by:
- `try_climbing` / `cancel_climbing`: only flip the `wants_to_climb` request
- `on_movement_updated`: promotes a pending request into the Climbing mode once per tick
- `phys_climbing`: the per-tick step; leaves through `end_climbing` when the surface is
  lost, the request was cancelled or the surface turned into a floor/ceiling, then pushes
  the full-size capsule out of anything it overlaps

A ledge mantle is a one-shot animation started from inside the climbing step. It never
changes the mode itself.
*/

use crate::body::{Body, LocomotionMode};
use crate::collision::{
    Contact, ContactSet, MoveRequest, Quat, Vec3, depenetrate, move_capsule, sweep_move,
};
use crate::config::LocomotionConfig;
use crate::constants::MIN_TICK_TIME;
use crate::context::SimContext;
use crate::math::{self, horizontal, is_parallel, project_onto, safe_normal, world_up};
use crate::movement::{VelocityParams, calc_velocity, phys_falling};
use crate::probe;
use crate::surface::{self, SurfaceEstimate};

/// Steepness below which a contact counts as a ceiling.
const CEILING_STEEPNESS_EPS: f32 = 1.0e-4;

/// One slide after the first blocking hit.
const CLIMB_MOVE_ITERATIONS: u32 = 2;

/// Per-body climbing state.
#[derive(Clone, Debug, Default)]
pub struct ClimbState {
    pub wants_to_climb: bool,
    /// Estimate from the last climbing step.
    pub surface: SurfaceEstimate,
    /// Result of the last forward wall sweep.
    pub contacts: ContactSet,
    pre_climb_half_height: Option<f32>,
}

/// Replace the stored contacts with a fresh forward wall sweep.
pub fn refresh_contacts(
    state: &mut ClimbState,
    body: &Body,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    state.contacts = probe::sweep_body_forward(body, cfg, ctx);
}

/// Whether any contact is a wall the body faces closely enough to start climbing.
pub fn can_start_climbing(
    body: &Body,
    contacts: &[Contact],
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) -> bool {
    let forward = body.forward();
    for contact in contacts {
        let horizontal_normal = safe_normal(horizontal(contact.normal));
        // 1 for a vertical wall, 0 for a ceiling or floor.
        let steepness = contact.normal.dot(&horizontal_normal);
        if steepness.abs() < CEILING_STEEPNESS_EPS {
            continue;
        }
        let facing = forward.dot(&-horizontal_normal).clamp(-1.0, 1.0);
        let degrees = facing.acos().to_degrees();
        if degrees <= cfg.climb.min_horizontal_degrees_to_start
            && is_facing_surface(body, steepness, cfg, ctx)
        {
            return true;
        }
    }
    false
}

/// Eye-height confirmation trace, longer for shallower surfaces.
pub fn is_facing_surface(
    body: &Body,
    steepness: f32,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) -> bool {
    let probe = &cfg.probe;
    let length =
        probe.facing_base_length * (1.0 + (1.0 - steepness) * probe.facing_steepness_factor);
    probe::eye_height_trace(body, cfg, length, ctx)
}

/// Request climbing if the current contacts allow it.
pub fn try_climbing(
    state: &mut ClimbState,
    body: &Body,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) -> bool {
    if can_start_climbing(body, &state.contacts, cfg, ctx) {
        state.wants_to_climb = true;
    }
    state.wants_to_climb
}

pub fn cancel_climbing(state: &mut ClimbState) {
    state.wants_to_climb = false;
}

/// Movement-updated hook: a pending request becomes the Climbing mode here.
pub fn on_movement_updated(state: &mut ClimbState, body: &mut Body, cfg: &LocomotionConfig) {
    if state.wants_to_climb && !body.is_climbing() {
        begin_climbing(state, body, cfg);
    }
}

/// Enter Climbing: stop orienting to movement and shrink the capsule.
pub fn begin_climbing(state: &mut ClimbState, body: &mut Body, cfg: &LocomotionConfig) {
    body.set_mode(LocomotionMode::Climbing);
    body.orient_to_movement = false;
    body.floor = None;

    let half_height = body.capsule.half_height;
    state.pre_climb_half_height = Some(half_height);
    body.capsule.half_height = (half_height - cfg.climb.collision_shrink_amount).max(0.0);
    log::debug!("climbing started at {:?}", body.position);
}

/// Leave Climbing for Falling and undo everything `begin_climbing` changed.
pub fn end_climbing(state: &mut ClimbState, body: &mut Body, cfg: &LocomotionConfig) {
    state.wants_to_climb = false;
    body.set_mode(LocomotionMode::Falling);
    body.orient_to_movement = true;
    body.rotation = math::yaw_only(&body.rotation);

    body.capsule.half_height = match state.pre_climb_half_height.take() {
        Some(half_height) => half_height,
        None => body.capsule.half_height + cfg.climb.collision_shrink_amount,
    };
    body.stop_movement_immediately();
    log::debug!("climbing stopped at {:?}", body.position);
}

/// Climbing physics for one tick.
pub fn phys_climbing(
    body: &mut Body,
    state: &mut ClimbState,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    let dt = ctx.dt;
    if dt < MIN_TICK_TIME {
        return;
    }

    let world = ctx.world;
    let debug = if cfg.debug_draw { ctx.debug() } else { None };
    state.surface = surface::estimate(world, &state.contacts, body.position, &cfg.probe, debug);

    if should_stop_climbing(state, cfg) {
        end_climbing(state, body, cfg);
        // The restored capsule can reach into the surface it just left.
        body.position = depenetrate(ctx.world, body.capsule, body.rotation, body.position);
        phys_falling(body, cfg, ctx);
        return;
    }

    compute_climbing_velocity(body, cfg, dt);

    let old_position = body.position;
    move_along_climbing_surface(body, state, cfg, ctx);
    try_climb_up_ledge(body, cfg, ctx);

    body.velocity = (body.position - old_position) / dt;

    snap_to_climbing_surface(body, state, cfg, ctx);
}

pub fn should_stop_climbing(state: &ClimbState, cfg: &LocomotionConfig) -> bool {
    let normal = state.surface.normal;
    let on_floor_or_ceiling = is_parallel(normal, world_up(), cfg.climb.ceiling_parallel_threshold);
    !state.wants_to_climb || !state.surface.is_valid() || on_floor_or_ceiling
}

/// Integrate toward the climb-plane input with no friction and climbing braking.
pub fn compute_climbing_velocity(body: &mut Body, cfg: &LocomotionConfig, dt: f32) {
    body.velocity = calc_velocity(
        body.velocity,
        VelocityParams {
            dt,
            acceleration: body.acceleration,
            friction: 0.0,
            fluid: false,
            braking_deceleration: cfg.climb.braking_deceleration,
            braking_friction: None,
            max_speed: cfg.climb.max_speed,
        },
    );
}

/// Move by `velocity * dt` while turning toward the surface, sliding once on a hit.
pub fn move_along_climbing_surface(
    body: &mut Body,
    state: &ClimbState,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    let rotation = climbing_rotation(body, state, cfg, ctx.dt);
    let request = MoveRequest::with_defaults(body.position, body.velocity * ctx.dt, body.capsule)
        .rotated(rotation)
        .iterations(CLIMB_MOVE_ITERATIONS);
    let moved = move_capsule(ctx.world, request);
    body.position = moved.end_pos;
    body.rotation = rotation;
}

/// Rotation blended toward facing into the surface.
pub fn climbing_rotation(
    body: &Body,
    state: &ClimbState,
    cfg: &LocomotionConfig,
    dt: f32,
) -> Quat {
    match math::look_rotation(-state.surface.normal, world_up()) {
        Some(target) => math::qinterp_to(body.rotation, target, dt, cfg.climb.rotation_speed),
        None => body.rotation,
    }
}

/// Nudge the body toward its stand-off distance from the surface.
pub fn snap_to_climbing_surface(
    body: &mut Body,
    state: &ClimbState,
    cfg: &LocomotionConfig,
    ctx: &mut SimContext,
) {
    let forward = body.forward();
    let to_surface = project_onto(state.surface.position - body.position, forward);
    let offset = -state.surface.normal * (to_surface.norm() - cfg.climb.distance_from_surface);
    let delta = offset * cfg.climb.snap_speed * ctx.dt;
    let moved = sweep_move(ctx.world, body.position, delta, body.capsule, body.rotation);
    body.position = moved.end_pos;
}

/// Start the mantle animation when climbing up past an open edge.
pub fn try_climb_up_ledge(body: &mut Body, cfg: &LocomotionConfig, ctx: &mut SimContext) -> bool {
    let Some(montage) = cfg.animation.ledge_mantle else {
        return false;
    };
    match ctx.animation() {
        Some(animation) if !animation.is_montage_playing(montage) => {}
        _ => return false,
    }

    let up_speed = body.velocity.dot(&body.up());
    if up_speed < cfg.climb.max_speed * cfg.climb.mantle_min_up_speed_ratio {
        return false;
    }
    if !has_reached_edge(body, cfg, ctx)
        || !ctx.ledge.can_move_to_ledge(body)
        || !ctx.ledge.is_location_walkable(ledge_landing(body, cfg))
    {
        return false;
    }

    body.rotation = math::yaw_only(&body.rotation);
    let played = ctx
        .animation()
        .is_some_and(|animation| animation.play_montage(montage));
    if played {
        log::debug!("ledge mantle at {:?}", body.position);
    }
    played
}

/// Open space at eye height just in front of the body.
pub fn has_reached_edge(body: &Body, cfg: &LocomotionConfig, ctx: &mut SimContext) -> bool {
    !probe::eye_height_trace(body, cfg, mantle_reach(body, cfg), ctx)
}

/// End of the edge trace: where a mantle puts the body down.
pub fn ledge_landing(body: &Body, cfg: &LocomotionConfig) -> Vec3 {
    let eyes = body.eye_location(probe::eye_height_offset(body, cfg));
    eyes + body.forward() * mantle_reach(body, cfg)
}

fn mantle_reach(body: &Body, cfg: &LocomotionConfig) -> f32 {
    body.capsule.radius * cfg.climb.mantle_trace_radius_multiplier
}

/// Input axes in the surface tangent frame: forward climbs up the surface, right moves
/// toward the body's right. Zero while no surface is known.
pub fn climb_input_axes(body: &Body, state: &ClimbState) -> (Vec3, Vec3) {
    let normal = state.surface.normal;
    let forward = safe_normal(normal.cross(&body.right()));
    let right = safe_normal(body.up().cross(&normal));
    (forward, right)
}
