use nalgebra as na;
use rapier3d::parry::{
    query::{self, Ray, ShapeCastOptions},
    shape::{Ball, Capsule, Shape},
};
use rapier3d::prelude::Collider;

use super::{
    settings::NORMAL_EPS_SQ,
    types::{Contact, Iso, Penetration, ProbeShape, RayHit, SweepHit, Vec3},
};

/// Parry geometry for a `ProbeShape`, kept on the stack.
pub enum ProbeGeometry {
    Capsule(Capsule),
    Ball(Ball),
}

impl ProbeGeometry {
    pub fn new(shape: ProbeShape) -> Self {
        match shape {
            ProbeShape::Capsule(c) => Self::Capsule(Capsule::new_y(c.half_height, c.radius)),
            ProbeShape::Sphere { radius } => Self::Ball(Ball::new(radius)),
        }
    }

    #[inline]
    pub fn as_shape(&self) -> &dyn Shape {
        match self {
            Self::Capsule(c) => c,
            Self::Ball(b) => b,
        }
    }
}

/// Cast a moving shape against a single static collider and return the hit (if any).
///
/// - `pose`: the moving shape's starting isometry in world space.
/// - `translation`: the world-space translation for this cast.
///
/// The returned point and normal are in world space; the normal is the static surface's
/// normal and always opposes the motion. Shapes that start in penetration report a hit at
/// fraction 0 unless the motion separates them.
pub fn cast_against(
    collider: &Collider,
    shape: &dyn Shape,
    pose: &Iso,
    translation: &Vec3,
) -> Option<SweepHit> {
    let mut opts = ShapeCastOptions::with_max_time_of_impact(1.0);
    opts.stop_at_penetration = true;
    let hit = query::cast_shapes(
        pose,
        translation,
        shape,
        collider.position(),
        &na::Vector3::zeros(),
        collider.shape(),
        opts,
    )
    .ok()
    .flatten()?;

    let static_pose = collider.position();
    let mut point = (static_pose * hit.witness2).coords;
    let mut normal = static_pose.rotation * hit.normal2.into_inner();

    if hit.time_of_impact <= 0.0 {
        // Witnesses of an initial overlap are unreliable; ask for the penetration contact.
        if let Some(c) = contact_with(collider, shape, pose, 0.0) {
            point = c.point;
            normal = c.normal;
        }
        if normal.dot(translation) > 0.0 {
            // Already separating.
            return None;
        }
    }

    if normal.norm_squared() <= NORMAL_EPS_SQ {
        return None;
    }
    if normal.dot(translation) > 0.0 {
        normal = -normal;
    }

    Some(SweepHit {
        point,
        normal: normal.normalize(),
        fraction: hit.time_of_impact,
    })
}

/// Closest contact (or penetration) between a posed shape and a static collider,
/// within `prediction` distance.
pub fn contact_with(
    collider: &Collider,
    shape: &dyn Shape,
    pose: &Iso,
    prediction: f32,
) -> Option<Contact> {
    let c = closest_contact(collider, shape, pose, prediction)?;
    Some(Contact {
        point: c.point2.coords,
        normal: c.normal2.into_inner(),
    })
}

/// Penetration of a posed shape into a static collider; `None` when they only touch or
/// are apart.
pub fn penetration_with(
    collider: &Collider,
    shape: &dyn Shape,
    pose: &Iso,
) -> Option<Penetration> {
    let c = closest_contact(collider, shape, pose, 0.0)?;
    let normal = c.normal2.into_inner();
    if c.dist >= 0.0 || normal.norm_squared() <= NORMAL_EPS_SQ {
        return None;
    }
    Some(Penetration {
        normal,
        depth: -c.dist,
    })
}

fn closest_contact(
    collider: &Collider,
    shape: &dyn Shape,
    pose: &Iso,
    prediction: f32,
) -> Option<query::Contact> {
    query::contact(pose, shape, collider.position(), collider.shape(), prediction)
        .ok()
        .flatten()
}

/// Cast a segment against a single static collider (solid).
pub fn ray_against(collider: &Collider, start: Vec3, end: Vec3) -> Option<RayHit> {
    let delta = end - start;
    if delta.norm_squared() <= NORMAL_EPS_SQ {
        return None;
    }
    let ray = Ray::new(na::Point3::from(start), delta);
    let hit = collider
        .shape()
        .cast_ray_and_get_normal(collider.position(), &ray, 1.0, true)?;
    Some(RayHit {
        point: start + delta * hit.time_of_impact,
        normal: hit.normal,
        fraction: hit.time_of_impact,
    })
}
