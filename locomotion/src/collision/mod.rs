/*!
Collision root module.

The locomotion controllers only ever talk to the world through [`CollisionWorld`]:
shape sweeps, multi-hit sweeps and line traces against static geometry. The
submodules provide one implementation of that seam on top of rapier3d/parry plus the
kinematic helpers every locomotion mode shares:

- types:        shared data types (CapsuleSpec, ProbeShape, Contact, SweepHit, etc.)
- settings:     sweep and tolerance constants
- broad:        broad-phase helpers (swept AABBs, BVH candidate queries)
- narrow_phase: thin wrappers over parry queries (shape casts, contacts, rays)
- world:        `StaticWorld`, the rapier-backed `CollisionWorld`
- kinematic:    sweep-and-slide, single blocking moves and overlap push-out
- ground:       downward floor probe and hover snap
*/

pub mod broad;
pub mod ground;
pub mod kinematic;
pub mod narrow_phase;
pub mod settings;
pub mod types;
pub mod world;

pub use ground::{FloorHit, probe_floor, snap_to_floor};
pub use kinematic::{MoveRequest, depenetrate, move_capsule, sweep_move};
pub use types::{
    CapsuleSpec, Contact, ContactSet, Iso, MoveResult, Penetration, ProbeShape, Quat, RayHit,
    SweepHit, Vec3,
};
pub use world::{ColliderShapeDef, StaticWorld, WorldStaticDef};

/// Static geometry queries consumed by the locomotion controllers.
///
/// Queries never see the querying body itself; implementations only hold world statics.
pub trait CollisionWorld {
    /// First blocking hit of `shape` swept from `start` to `end`.
    fn sweep(&self, shape: ProbeShape, rotation: Quat, start: Vec3, end: Vec3) -> Option<SweepHit>;

    /// Every surface touched by `shape` swept from `start` to `end`, including initial
    /// overlaps, ordered by time of impact.
    fn sweep_multi(&self, shape: ProbeShape, rotation: Quat, start: Vec3, end: Vec3) -> ContactSet;

    /// First hit of the segment `start..end`.
    fn ray_cast(&self, start: Vec3, end: Vec3) -> Option<RayHit>;

    /// Every static `shape` currently sinks into when posed at `position`. Touching
    /// surfaces are not reported.
    fn overlaps(&self, shape: ProbeShape, rotation: Quat, position: Vec3) -> Vec<Penetration>;
}
