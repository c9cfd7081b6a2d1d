/*!
Kinematic sweep settings and tolerances.

These constants centralize the parameters used by sweep-and-slide, floor probing
and the collision queries behind `StaticWorld`.

Notes
- Distances are in world units (centimetres with the default tuning), time in seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
- Per-character tuning lives in `LocomotionConfig`; these are the fixed tolerances under it.
*/

/// Separation kept from surfaces when a sweep stops at a contact.
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN: f32 = 0.5;

/// Maximum number of slide iterations per kinematic step.
/// Higher values help with tight corners at the cost of more queries.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

/// Minimum squared movement threshold to consider a step meaningful.
pub const MIN_MOVE_SQ: f32 = 1.0e-6;

/// Practical small distance for comparisons in world space.
pub const DIST_EPS: f32 = 1.0e-4;

/// Squared length under which a normal or direction is treated as zero.
pub const NORMAL_EPS_SQ: f32 = 1.0e-8;

/// Hover height kept above a walkable floor along its normal.
pub const FLOOR_HOVER_HEIGHT: f32 = 2.0;

/// Extra distance below the hover height searched for floor support while walking
/// or when deciding whether a falling body has touched down.
pub const FLOOR_PROBE_DISTANCE: f32 = 4.0;

/// Extra margin added to swept AABBs before the broad-phase query.
pub const BROAD_PHASE_MARGIN: f32 = 1.0;

/// Push-out passes spent freeing a capsule that starts inside static geometry.
pub const DEPENETRATION_ITERATIONS: u32 = 4;

/// Largest single push-out step. Deeper overlaps take several passes.
pub const MAX_DEPENETRATION_STEP: f32 = 60.0;
