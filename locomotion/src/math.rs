//! Orientation helpers and rate-limited interpolation.
//!
//! Conventions: Y is up, body-local forward is -Z, right is +X. Yaw is measured about +Y
//! with `yaw = atan2(-f.x, -f.z)`, positive pitch raises the nose, positive roll lowers the
//! right side.

use std::f32::consts::{PI, TAU};

use crate::collision::settings::NORMAL_EPS_SQ;
use crate::collision::{Quat, Vec3};
use crate::constants::YAW_EPS;

/// Two-axis input (x = right, y = forward/up).
pub type Vec2 = nalgebra::Vector2<f32>;

#[inline]
pub fn world_up() -> Vec3 {
    Vec3::y()
}

#[inline]
pub fn forward_axis(q: &Quat) -> Vec3 {
    q * -Vec3::z()
}

#[inline]
pub fn right_axis(q: &Quat) -> Vec3 {
    q * Vec3::x()
}

#[inline]
pub fn up_axis(q: &Quat) -> Vec3 {
    q * Vec3::y()
}

/// Drop the vertical component.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit vector or zero for degenerate input.
#[inline]
pub fn safe_normal(v: Vec3) -> Vec3 {
    v.try_normalize(NORMAL_EPS_SQ.sqrt()).unwrap_or_else(Vec3::zeros)
}

#[inline]
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Yaw that faces a planar (XZ) delta, or `None` if the delta is too small.
pub fn yaw_from_xz(x: f32, z: f32) -> Option<f32> {
    if x * x + z * z > YAW_EPS {
        return Some((-x).atan2(-z));
    }
    None
}

#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
}

/// Keep only the yaw of `q` (pitch and roll zeroed).
pub fn yaw_only(q: &Quat) -> Quat {
    yaw_rotation(Orientation::from_quat(q).yaw)
}

/// Rotation whose forward (-Z) axis is `forward` and whose up axis is as close to `up` as
/// possible. `None` when `forward` is degenerate or parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let f = forward.try_normalize(NORMAL_EPS_SQ.sqrt())?;
    if f.cross(&up).norm_squared() <= NORMAL_EPS_SQ {
        return None;
    }
    Some(Quat::face_towards(&-f, &up))
}

/// Euler decomposition used by the flight controller (radians).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_quat(q: &Quat) -> Self {
        let f = forward_axis(q);
        let yaw = (-f.x).atan2(-f.z);
        let pitch = f.y.clamp(-1.0, 1.0).asin();
        let residual = (yaw_rotation(yaw) * pitch_rotation(pitch)).inverse() * q;
        let r = residual * Vec3::x();
        let roll = (-r.y).atan2(r.x);
        Self { yaw, pitch, roll }
    }

    pub fn to_quat(&self) -> Quat {
        yaw_rotation(self.yaw) * pitch_rotation(self.pitch) * roll_rotation(self.roll)
    }
}

#[inline]
fn pitch_rotation(pitch: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::x_axis(), pitch)
}

#[inline]
fn roll_rotation(roll: f32) -> Quat {
    Quat::from_axis_angle(&-Vec3::z_axis(), roll)
}

/// Wrap an angle to (-PI, PI].
pub fn normalize_angle(a: f32) -> f32 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Blend `current` toward `target` by `clamp(dt * speed, 0, 1)` of the remaining distance.
/// A non-positive speed jumps straight to the target.
pub fn finterp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist * dist < 1.0e-8 {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

pub fn vinterp_to(current: Vec3, target: Vec3, dt: f32, speed: f32) -> Vec3 {
    if speed <= 0.0 {
        return target;
    }
    let dist = target - current;
    if dist.norm_squared() < 1.0e-8 {
        return target;
    }
    current + dist * (dt * speed).clamp(0.0, 1.0)
}

pub fn qinterp_to(current: Quat, target: Quat, dt: f32, speed: f32) -> Quat {
    if speed <= 0.0 {
        return target;
    }
    let alpha = (dt * speed).clamp(0.0, 1.0);
    current.try_slerp(&target, alpha, 1.0e-6).unwrap_or(target)
}

/// Shortest-arc angular blend.
pub fn interp_angle_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    let delta = normalize_angle(target - current);
    if speed <= 0.0 || delta.abs() < 1.0e-6 {
        return normalize_angle(current + delta);
    }
    normalize_angle(current + delta * (dt * speed).clamp(0.0, 1.0))
}

/// Turn `current` toward `target` by at most `max_delta` along the shortest arc.
pub fn fixed_turn(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = normalize_angle(target - current);
    if delta.abs() <= max_delta {
        return normalize_angle(target);
    }
    normalize_angle(current + max_delta.max(0.0) * delta.signum())
}

/// Linear remap of `value` from `[in_a, in_b]` to `[out_a, out_b]`, clamped to the output range.
pub fn map_range_clamped(value: f32, in_a: f32, in_b: f32, out_a: f32, out_b: f32) -> f32 {
    let span = in_b - in_a;
    if span.abs() < f32::EPSILON {
        return if value >= in_b { out_b } else { out_a };
    }
    let t = ((value - in_a) / span).clamp(0.0, 1.0);
    out_a + (out_b - out_a) * t
}

/// Component of `v` along the unit vector `axis`.
#[inline]
pub fn project_onto(v: Vec3, axis: Vec3) -> Vec3 {
    axis * v.dot(&axis)
}

/// `|a . b| >= threshold`.
#[inline]
pub fn is_parallel(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.dot(&b).abs() >= threshold
}
