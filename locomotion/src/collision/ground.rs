use super::{
    CollisionWorld,
    types::{CapsuleSpec, ProbeShape, Quat, SweepHit, Vec3},
};

/// Result of a downward floor probe.
#[derive(Clone, Copy, Debug)]
pub struct FloorHit {
    pub hit: SweepHit,
    /// Distance travelled by the capsule before touching the floor.
    pub distance: f32,
    /// Whether the surface is flat enough to stand on.
    pub walkable: bool,
}

/// Sweep an upright capsule straight down from `pos` by up to `max_distance`.
///
/// `walkable_floor_cos` is the minimum `normal.y` of a surface that can be stood on.
pub fn probe_floor(
    world: &dyn CollisionWorld,
    capsule: CapsuleSpec,
    pos: Vec3,
    max_distance: f32,
    walkable_floor_cos: f32,
) -> Option<FloorHit> {
    if max_distance <= 0.0 {
        return None;
    }
    let end = pos - Vec3::y() * max_distance;
    let hit = world.sweep(ProbeShape::Capsule(capsule), Quat::identity(), pos, end)?;
    Some(FloorHit {
        hit,
        distance: max_distance * hit.fraction,
        walkable: hit.normal.y >= walkable_floor_cos,
    })
}

/// Keep a capsule hovering above the nearest walkable floor within `max_snap_distance`.
///
/// If a walkable hit is found, the capsule center is moved to the impact position,
/// offset by `hover_height` along the surface normal. Otherwise `pos` is returned unchanged
/// together with whatever was hit (if anything).
pub fn snap_to_floor(
    world: &dyn CollisionWorld,
    capsule: CapsuleSpec,
    pos: Vec3,
    max_snap_distance: f32,
    hover_height: f32,
    walkable_floor_cos: f32,
) -> (Vec3, Option<FloorHit>) {
    if hover_height < 0.0 {
        return (pos, None);
    }
    let Some(floor) = probe_floor(world, capsule, pos, max_snap_distance, walkable_floor_cos)
    else {
        return (pos, None);
    };
    if !floor.walkable {
        return (pos, Some(floor));
    }

    let impact_center = pos - Vec3::y() * floor.distance;
    (impact_center + floor.hit.normal * hover_height, Some(floor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderShapeDef, StaticWorld, WorldStaticDef};
    use nalgebra::{UnitQuaternion, Vector3};

    const CAPSULE: CapsuleSpec = CapsuleSpec::new(40.0, 50.0);
    const WALKABLE_COS: f32 = 0.71;

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
    fn snaps_to_hover_height() {
        let world = flat();
        let (pos, floor) = snap_to_floor(
            &world,
            CAPSULE,
            Vec3::new(0.0, 95.0, 0.0),
            10.0,
            2.0,
            WALKABLE_COS,
        );
        let floor = floor.expect("floor in range");
        assert!(floor.walkable);
        assert!((floor.distance - 5.0).abs() < 1e-2);
        assert!((pos.y - 92.0).abs() < 1e-2);
    }

    #[test]
    fn out_of_range_floor_is_ignored() {
        let world = flat();
        let start = Vec3::new(0.0, 300.0, 0.0);
        let (pos, floor) = snap_to_floor(&world, CAPSULE, start, 10.0, 2.0, WALKABLE_COS);
        assert!(floor.is_none());
        assert_eq!(pos, start);
    }

    #[test]
    fn steep_slope_is_not_walkable() {
        let slope = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 60f32.to_radians());
        let world = StaticWorld::build(vec![
            WorldStaticDef::new(
                1,
                Vector3::zeros(),
                ColliderShapeDef::Plane {
                    offset_along_normal: 0.0,
                },
            )
            .with_rotation(slope),
        ]);
        let start = Vec3::new(0.0, 200.0, 0.0);
        let floor = probe_floor(&world, CAPSULE, start, 500.0, WALKABLE_COS).expect("slope below");
        assert!(!floor.walkable);
        let (pos, _) = snap_to_floor(&world, CAPSULE, start, 500.0, 2.0, WALKABLE_COS);
        assert_eq!(pos, start);
    }
}
