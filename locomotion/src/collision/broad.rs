use nalgebra as na;
use rapier3d::parry::{
    bounding_volume::Aabb,
    partitioning::{Bvh, BvhBuildStrategy},
    shape::{Shape, ShapeType},
};
use rapier3d::prelude::{ColliderHandle, ColliderSet};

use super::types::{Iso, Vec3};

/// Acceleration structure for broad-phase queries over immutable world statics.
///
/// Notes:
/// - Finite colliders are stored as world-space AABBs in a BVH.
/// - Half-spaces are infinite, so they are kept out of the BVH and always tested.
/// - `finite` maps each BVH leaf index back to its collider handle.
pub struct WorldAccel {
    /// BVH over finite static colliders (AABBs).
    pub bvh: Bvh,
    /// Collider handles for the BVH leaves above, in leaf order.
    pub finite: Vec<ColliderHandle>,
    /// Collider handles of every half-space.
    pub planes: Vec<ColliderHandle>,
}

impl WorldAccel {
    /// Return true if this accelerator has no finite entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.finite.is_empty()
    }

    /// Number of finite entries (AABBs) in this accelerator.
    #[inline]
    pub fn len(&self) -> usize {
        self.finite.len()
    }
}

/// Build the broad-phase accelerator over colliders inserted in deterministic order.
pub fn build_world_accel(colliders: &ColliderSet, order: &[ColliderHandle]) -> WorldAccel {
    let mut aabbs: Vec<Aabb> = Vec::new();
    let mut finite = Vec::new();
    let mut planes = Vec::new();

    for &handle in order {
        let Some(collider) = colliders.get(handle) else {
            continue;
        };
        if collider.shape().shape_type() == ShapeType::HalfSpace {
            planes.push(handle);
        } else {
            aabbs.push(collider.compute_aabb());
            finite.push(handle);
        }
    }

    WorldAccel {
        bvh: Bvh::from_leaves(BvhBuildStrategy::Binned, &aabbs),
        finite,
        planes,
    }
}

/// AABB covering `shape` at both ends of a straight sweep, inflated by `margin`.
pub fn swept_shape_aabb(shape: &dyn Shape, start: &Iso, end: &Iso, margin: f32) -> Aabb {
    let swept = aabb_union(&shape.compute_aabb(start), &shape.compute_aabb(end));
    aabb_inflate(&swept, margin)
}

/// AABB covering a line segment, inflated by `margin`.
pub fn segment_aabb(start: Vec3, end: Vec3, margin: f32) -> Aabb {
    let mins = na::Point3::new(start.x.min(end.x), start.y.min(end.y), start.z.min(end.z));
    let maxs = na::Point3::new(start.x.max(end.x), start.y.max(end.y), start.z.max(end.z));
    aabb_inflate(&Aabb::new(mins, maxs), margin)
}

/// Query finite collider handles whose AABB intersects `swept`.
pub fn query_candidates(accel: &WorldAccel, swept: &Aabb) -> Vec<ColliderHandle> {
    accel
        .bvh
        .intersect_aabb(swept)
        .map(|leaf_idx| accel.finite[leaf_idx as usize])
        .collect()
}

/// Half-spaces first, then finite candidates overlapping `swept`.
pub fn candidates_with_planes(accel: &WorldAccel, swept: &Aabb) -> Vec<ColliderHandle> {
    let mut out = accel.planes.clone();
    out.extend(query_candidates(accel, swept));
    out
}

/// Compute the union of two AABBs.
fn aabb_union(a: &Aabb, b: &Aabb) -> Aabb {
    let min = na::Point3::new(
        a.mins.x.min(b.mins.x),
        a.mins.y.min(b.mins.y),
        a.mins.z.min(b.mins.z),
    );
    let max = na::Point3::new(
        a.maxs.x.max(b.maxs.x),
        a.maxs.y.max(b.maxs.y),
        a.maxs.z.max(b.maxs.z),
    );
    Aabb {
        mins: min,
        maxs: max,
    }
}

/// Inflate an AABB by `margin` on all sides.
fn aabb_inflate(a: &Aabb, margin: f32) -> Aabb {
    if margin <= 0.0 {
        return *a;
    }
    let delta = na::Vector3::new(margin, margin, margin);
    Aabb {
        mins: a.mins - delta,
        maxs: a.maxs + delta,
    }
}
