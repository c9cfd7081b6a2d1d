use super::{
    CollisionWorld,
    settings::{
        DEFAULT_MAX_ITERATIONS, DEFAULT_SKIN, DEPENETRATION_ITERATIONS, MAX_DEPENETRATION_STEP,
        MIN_MOVE_SQ, NORMAL_EPS_SQ,
    },
    types::{CapsuleSpec, MoveResult, ProbeShape, Quat, SweepHit, Vec3},
};

/// Parameters for a single kinematic movement attempt.
///
/// - Movement is expressed as a desired translation for this tick.
/// - Collision is handled by sweeping the capsule through the `CollisionWorld`,
///   stopping at contact minus `skin`, and sliding along the contact normal.
/// - The slide step iterates up to `max_iterations` to handle corners.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    /// Starting world position of the capsule's center.
    pub start_pos: Vec3,
    /// Desired world-space translation for this step.
    pub desired_translation: Vec3,
    /// Capsule shape for the body.
    pub capsule: CapsuleSpec,
    /// Capsule orientation during the move.
    pub rotation: Quat,
    /// Separation to keep from surfaces to avoid jitter.
    pub skin: f32,
    /// Max iterations of slide resolution (for corners).
    pub max_iterations: u32,
}

impl MoveRequest {
    /// Upright capsule, default skin and iteration count.
    #[inline]
    pub fn with_defaults(start_pos: Vec3, desired_translation: Vec3, capsule: CapsuleSpec) -> Self {
        Self {
            start_pos,
            desired_translation,
            capsule,
            rotation: Quat::identity(),
            skin: DEFAULT_SKIN,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[inline]
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Kinematic sweep-and-slide for a capsule.
///
/// Algorithm:
/// - Sweep the capsule along the desired translation.
/// - On hit, move to just before the contact (minus `skin`) and slide along the contact normal.
/// - Iterate to handle corners until `max_iterations` or the remaining motion is negligible.
pub fn move_capsule(world: &dyn CollisionWorld, req: MoveRequest) -> MoveResult {
    let mut pos = req.start_pos;
    let mut remaining = req.desired_translation;
    let mut last_hit: Option<SweepHit> = None;
    let shape = ProbeShape::Capsule(req.capsule);

    for _ in 0..req.max_iterations {
        // Early out if remaining motion is too small to matter.
        if remaining.norm_squared() <= MIN_MOVE_SQ {
            break;
        }

        let len = remaining.norm();
        let dir = remaining / len;

        match world.sweep(shape, req.rotation, pos, pos + remaining) {
            None => {
                pos += remaining;
                remaining = Vec3::zeros();
                break;
            }
            Some(hit) => {
                // Travel up to the contact point (minus skin).
                let travel = (len * hit.fraction).max(0.0);
                pos += dir * (travel - req.skin).max(0.0);

                // Slide along the hit plane: remove the normal component from the leftover.
                let n = if hit.normal.norm_squared() > NORMAL_EPS_SQ {
                    hit.normal.normalize()
                } else {
                    Vec3::zeros()
                };
                let leftover = dir * (len - travel);
                let slide = leftover - n * leftover.dot(&n);

                remaining = slide;
                last_hit = Some(hit);

                if slide.norm_squared() <= MIN_MOVE_SQ {
                    break;
                }
            }
        }
    }

    MoveResult {
        end_pos: pos,
        last_hit,
        remaining,
    }
}

/// Single blocking move: stop at the first contact (minus skin) without sliding.
pub fn sweep_move(
    world: &dyn CollisionWorld,
    start_pos: Vec3,
    translation: Vec3,
    capsule: CapsuleSpec,
    rotation: Quat,
) -> MoveResult {
    move_capsule(
        world,
        MoveRequest::with_defaults(start_pos, translation, capsule)
            .rotated(rotation)
            .iterations(1),
    )
}

/// Push a capsule out of any static it sinks into, deepest overlap first.
///
/// Each pass moves along the deepest overlap's separating normal by its depth plus the
/// skin. Returns `position` untouched when nothing overlaps.
pub fn depenetrate(
    world: &dyn CollisionWorld,
    capsule: CapsuleSpec,
    rotation: Quat,
    position: Vec3,
) -> Vec3 {
    let shape = ProbeShape::Capsule(capsule);
    let mut pos = position;
    for _ in 0..DEPENETRATION_ITERATIONS {
        let deepest = world
            .overlaps(shape, rotation, pos)
            .into_iter()
            .max_by(|a, b| a.depth.total_cmp(&b.depth));
        let Some(deepest) = deepest else {
            break;
        };
        let push = (deepest.depth + DEFAULT_SKIN).min(MAX_DEPENETRATION_STEP);
        pos += deepest.normal.normalize() * push;
    }
    if pos != position {
        log::debug!("pushed out of overlap: {position:?} -> {pos:?}");
    }
    pos
}
