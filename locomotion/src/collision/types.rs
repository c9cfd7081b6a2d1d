/*!
Core collision types and math aliases shared by the collision submodules and the
locomotion controllers.

This module contains no algorithms. It defines the data exchanged between:
- the `CollisionWorld` seam (sweeps, multi-sweeps, ray casts)
- broad/narrow phase helpers of the static world
- the kinematic sweep-and-slide helpers and floor probing
- the climb and flight controllers, which consume contacts every tick
*/

use nalgebra as na;
use serde::Deserialize;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Capsule specification for kinematic bodies and probes.
///
/// half_height is the half-length of the cylinder section (aligned with local +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    #[inline]
    pub const fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height,
        }
    }

    /// Distance from the capsule center to the tip of either cap.
    #[inline]
    pub fn total_half_height(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Shape swept through the world by a probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProbeShape {
    Capsule(CapsuleSpec),
    Sphere { radius: f32 },
}

/// A single impact point + surface normal pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// World-space impact point on the static surface.
    pub point: Vec3,
    /// World-space surface normal, pointing away from the surface toward the probe.
    pub normal: Vec3,
}

/// How far a posed shape sinks into one static collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// World-space direction that separates the shape from the surface.
    pub normal: Vec3,
    /// Distance to move along `normal` until the shapes only touch.
    pub depth: f32,
}

/// Every contact produced by one multi-sweep, ordered by time of impact.
///
/// Rebuilt every tick and replaced wholesale.
pub type ContactSet = Vec<Contact>;

/// First blocking hit of a shape sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// World-space impact point on the static surface.
    pub point: Vec3,
    /// World-space surface normal, opposing the sweep direction.
    pub normal: Vec3,
    /// Fraction (0..1) of the tested translation where the hit occurred.
    pub fraction: f32,
}

impl SweepHit {
    #[inline]
    pub fn contact(&self) -> Contact {
        Contact {
            point: self.point,
            normal: self.normal,
        }
    }
}

/// Hit returned by a line trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Fraction (0..1) of the segment where the hit occurred.
    pub fraction: f32,
}

/// Result of a kinematic movement step (after sweep-and-slide).
#[derive(Clone, Copy, Debug)]
pub struct MoveResult {
    /// Final capsule center position after applying the step and sliding.
    pub end_pos: Vec3,
    /// Information about the last hit encountered during the step (if any).
    pub last_hit: Option<SweepHit>,
    /// Remaining translation that could not be consumed (usually zero on success).
    pub remaining: Vec3,
}

#[inline]
pub fn iso_at(position: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(na::Translation3::from(position), rotation)
}
