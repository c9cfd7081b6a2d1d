//! Static query world built from immutable collider definitions.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: only the queries the locomotion controllers need (sweeps, multi-sweeps,
//!   line traces). There are no rigid bodies and no simulation step.
//! - Immutable world: statics do not move after construction.

use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use super::{
    CollisionWorld,
    broad::{self, WorldAccel},
    narrow_phase::{self, ProbeGeometry},
    settings::BROAD_PHASE_MARGIN,
    types::{ContactSet, Penetration, ProbeShape, Quat, RayHit, SweepHit, Vec3, iso_at},
};

/// Canonical definition of an immutable world collider.
///
/// Conventions
/// - Units are world units (centimetres with the default tuning).
/// - Rotation is a unit quaternion.
/// - For planes the normal is derived from the pose as `rotation * +Y`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    /// Axis-aligned definition at `translation`.
    pub fn new(id: u32, translation: Vector<f32>, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) through the pose translation, shifted by an offset along
    /// its normal. Everything below the plane is solid.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vector<f32> },
}

/// Immutable collision scene answering the locomotion queries.
pub struct StaticWorld {
    colliders: ColliderSet,
    accel: WorldAccel,
}

impl StaticWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// The input is sorted by `id` before insertion. NaN/invalid values should be
    /// filtered by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut colliders = ColliderSet::new();
        let mut order = Vec::with_capacity(defs.len());
        for def in &defs {
            order.push(colliders.insert(collider_from_def(def)));
        }
        let accel = broad::build_world_accel(&colliders, &order);
        log::debug!(
            "static world built: {} finite colliders, {} planes",
            accel.len(),
            accel.planes.len()
        );

        Self { colliders, accel }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn hits_along(
        &self,
        geometry: &ProbeGeometry,
        rotation: Quat,
        start: Vec3,
        end: Vec3,
    ) -> Vec<SweepHit> {
        let shape = geometry.as_shape();
        let start_iso = iso_at(start, rotation);
        let end_iso = iso_at(end, rotation);
        let translation = end - start;
        let swept = broad::swept_shape_aabb(shape, &start_iso, &end_iso, BROAD_PHASE_MARGIN);

        broad::candidates_with_planes(&self.accel, &swept)
            .into_iter()
            .filter_map(|handle| self.colliders.get(handle))
            .filter_map(|collider| {
                narrow_phase::cast_against(collider, shape, &start_iso, &translation)
            })
            .collect()
    }
}

impl CollisionWorld for StaticWorld {
    fn sweep(&self, shape: ProbeShape, rotation: Quat, start: Vec3, end: Vec3) -> Option<SweepHit> {
        let geometry = ProbeGeometry::new(shape);
        self.hits_along(&geometry, rotation, start, end)
            .into_iter()
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }

    fn sweep_multi(&self, shape: ProbeShape, rotation: Quat, start: Vec3, end: Vec3) -> ContactSet {
        let geometry = ProbeGeometry::new(shape);
        let mut hits = self.hits_along(&geometry, rotation, start, end);
        hits.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
        hits.iter().map(SweepHit::contact).collect()
    }

    fn ray_cast(&self, start: Vec3, end: Vec3) -> Option<RayHit> {
        let aabb = broad::segment_aabb(start, end, BROAD_PHASE_MARGIN);
        broad::candidates_with_planes(&self.accel, &aabb)
            .into_iter()
            .filter_map(|handle| self.colliders.get(handle))
            .filter_map(|collider| narrow_phase::ray_against(collider, start, end))
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }

    fn overlaps(&self, shape: ProbeShape, rotation: Quat, position: Vec3) -> Vec<Penetration> {
        let geometry = ProbeGeometry::new(shape);
        let shape = geometry.as_shape();
        let pose = iso_at(position, rotation);
        let aabb = broad::swept_shape_aabb(shape, &pose, &pose, BROAD_PHASE_MARGIN);
        broad::candidates_with_planes(&self.accel, &aabb)
            .into_iter()
            .filter_map(|handle| self.colliders.get(handle))
            .filter_map(|collider| narrow_phase::penetration_with(collider, shape, &pose))
            .collect()
    }
}

/// Build a positioned collider from a `WorldStaticDef`.
pub fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let mut translation = def.translation;
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Local +Y is the outward normal; the pose rotation orients it.
            let n = def.rotation * Vector::y();
            translation += n * *offset_along_normal;
            ColliderBuilder::halfspace(Vector::y_axis())
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
    };

    let mut collider = builder.build();
    collider.set_position(Isometry::from_parts(
        Translation3::from(translation),
        def.rotation,
    ));
    collider
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CapsuleSpec;

    fn ground_and_box() -> StaticWorld {
        StaticWorld::build(vec![
            WorldStaticDef::new(
                2,
                Vector::new(0.0, 100.0, -300.0),
                ColliderShapeDef::Cuboid {
                    half_extents: Vector::new(100.0, 100.0, 100.0),
                },
            ),
            WorldStaticDef::new(
                1,
                Vector::zeros(),
                ColliderShapeDef::Plane {
                    offset_along_normal: 0.0,
                },
            ),
        ])
    }

    #[test]
    fn ray_hits_ground_plane() {
        let world = ground_and_box();
        let hit = world
            .ray_cast(Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.0, -50.0, 0.0))
            .expect("ground below");
        assert!((hit.fraction - 0.5).abs() < 1e-4);
        assert!(hit.point.y.abs() < 1e-3);
        assert!((hit.normal.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ray_reports_nearest_surface() {
        let world = ground_and_box();
        let hit = world
            .ray_cast(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, 100.0, -500.0))
            .expect("box ahead");
        assert!((hit.point.z - -200.0).abs() < 1e-3);
        assert!((hit.normal.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_sweep_stops_at_box_face() {
        let world = ground_and_box();
        let hit = world
            .sweep(
                ProbeShape::Sphere { radius: 10.0 },
                Quat::identity(),
                Vec3::new(0.0, 100.0, 0.0),
                Vec3::new(0.0, 100.0, -400.0),
            )
            .expect("box ahead");
        // Sphere surface reaches z = -200 after travelling 190 of 400.
        assert!((hit.fraction - 190.0 / 400.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::z()).norm() < 1e-3);
        assert!((hit.point.z - -200.0).abs() < 1e-2);
    }

    #[test]
    fn sweep_multi_reports_overlaps_in_order() {
        let world = ground_and_box();
        // Capsule touching the box face and resting in the ground plane.
        let capsule = CapsuleSpec::new(50.0, 30.0);
        let start = Vec3::new(0.0, 70.0, -160.0);
        let contacts = world.sweep_multi(
            ProbeShape::Capsule(capsule),
            Quat::identity(),
            start,
            start - Vec3::z(),
        );
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().any(|c| (c.normal - Vec3::z()).norm() < 1e-3));
        assert!(contacts.iter().any(|c| (c.normal - Vec3::y()).norm() < 1e-3));
    }

    #[test]
    fn sweep_moving_away_from_overlap_is_free() {
        let world = ground_and_box();
        let capsule = CapsuleSpec::new(50.0, 30.0);
        let start = Vec3::new(0.0, 200.0, -160.0);
        let hit = world.sweep(
            ProbeShape::Capsule(capsule),
            Quat::identity(),
            start,
            start + Vec3::new(0.0, 0.0, 50.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn overlaps_report_penetration_depth() {
        let world = ground_and_box();
        let capsule = ProbeShape::Capsule(CapsuleSpec::new(50.0, 30.0));
        // 10 into the box face and 10 into the ground.
        let sunk = world.overlaps(capsule, Quat::identity(), Vec3::new(0.0, 70.0, -160.0));
        assert_eq!(sunk.len(), 2);
        assert!(sunk.iter().all(|p| (p.depth - 10.0).abs() < 1e-2));
        assert!(sunk.iter().any(|p| (p.normal - Vec3::z()).norm() < 1e-3));
        assert!(sunk.iter().any(|p| (p.normal - Vec3::y()).norm() < 1e-3));

        let clear = world.overlaps(capsule, Quat::identity(), Vec3::new(0.0, 81.0, 0.0));
        assert!(clear.is_empty());
    }

    #[test]
    fn build_counts_every_collider() {
        let a = ground_and_box();
        assert_eq!(a.len(), 2);
        assert!(!a.is_empty());
    }
}
