//! Braking-deceleration velocity integrator shared by every mode.

use crate::collision::Vec3;
use crate::constants::{
    BRAKE_TO_STOP_VELOCITY, BRAKING_FRICTION_FACTOR, MAX_BRAKING_SUBSTEP, MIN_TICK_TIME,
    OVER_MAX_SPEED_FACTOR, STOPPED_SPEED_SQ,
};
use crate::math::clamp_length;

const ZERO_ACCEL_SQ: f32 = 1.0e-8;

/// Inputs to a single [`calc_velocity`] step.
#[derive(Clone, Copy, Debug)]
pub struct VelocityParams {
    pub dt: f32,
    /// Already scaled by the mode's max acceleration.
    pub acceleration: Vec3,
    pub friction: f32,
    pub fluid: bool,
    pub braking_deceleration: f32,
    /// Overrides `friction` while braking.
    pub braking_friction: Option<f32>,
    pub max_speed: f32,
}

/// Input intent (length clamped to 1) scaled to an acceleration.
pub fn input_acceleration(input: Vec3, max_acceleration: f32) -> Vec3 {
    clamp_length(input, 1.0) * max_acceleration
}

/// Integrate `velocity` one step toward the input acceleration.
///
/// Without input (or above max speed) the body brakes; with input, friction bends the
/// velocity toward the input direction before the acceleration is applied. An excess speed
/// that was already present is kept rather than clamped back.
pub fn calc_velocity(velocity: Vec3, p: VelocityParams) -> Vec3 {
    if p.dt < MIN_TICK_TIME {
        return velocity;
    }
    let friction = p.friction.max(0.0);
    let max_speed = p.max_speed.max(0.0);
    let zero_accel = p.acceleration.norm_squared() <= ZERO_ACCEL_SQ;
    let over_max = velocity.norm_squared() > (max_speed * OVER_MAX_SPEED_FACTOR).powi(2);

    let mut v = velocity;
    if zero_accel || over_max {
        let before = v;
        let braking_friction = p.braking_friction.unwrap_or(friction);
        v = apply_velocity_braking(v, p.dt, braking_friction, p.braking_deceleration);

        // Braking must not drop an accelerating body below max speed.
        if over_max
            && v.norm_squared() < max_speed * max_speed
            && p.acceleration.dot(&before) > 0.0
        {
            v = before.normalize() * max_speed;
        }
    } else {
        let accel_dir = p.acceleration.normalize();
        let speed = v.norm();
        v -= (v - accel_dir * speed) * (p.dt * friction).min(1.0);
    }

    if p.fluid {
        v *= 1.0 - (friction * p.dt).min(1.0);
    }

    if !zero_accel {
        let new_max = if over_max { v.norm() } else { max_speed };
        v += p.acceleration * p.dt;
        v = clamp_length(v, new_max);
    }
    v
}

/// Friction plus constant deceleration opposing the initial velocity, sub-stepped.
pub fn apply_velocity_braking(
    velocity: Vec3,
    dt: f32,
    friction: f32,
    braking_deceleration: f32,
) -> Vec3 {
    if velocity.norm_squared() <= 0.0 || dt < MIN_TICK_TIME {
        return velocity;
    }
    let friction = (friction * BRAKING_FRICTION_FACTOR.max(0.0)).max(0.0);
    let braking_deceleration = braking_deceleration.max(0.0);
    let zero_friction = friction == 0.0;
    let zero_braking = braking_deceleration == 0.0;
    if zero_friction && zero_braking {
        return velocity;
    }

    let old = velocity;
    let rev_accel = if zero_braking {
        Vec3::zeros()
    } else {
        -braking_deceleration * velocity.normalize()
    };

    let mut v = velocity;
    let mut remaining = dt;
    while remaining >= MIN_TICK_TIME {
        let step = if remaining > MAX_BRAKING_SUBSTEP && !zero_friction {
            MAX_BRAKING_SUBSTEP.min(remaining * 0.5)
        } else {
            remaining
        };
        remaining -= step;

        v += (-friction * v + rev_accel) * step;

        // Don't reverse direction.
        if v.dot(&old) <= 0.0 {
            return Vec3::zeros();
        }
    }

    let speed_sq = v.norm_squared();
    if speed_sq <= STOPPED_SPEED_SQ
        || (!zero_braking && speed_sq <= BRAKE_TO_STOP_VELOCITY * BRAKE_TO_STOP_VELOCITY)
    {
        return Vec3::zeros();
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(acceleration: Vec3) -> VelocityParams {
        VelocityParams {
            dt: 1.0 / 60.0,
            acceleration,
            friction: 0.0,
            fluid: false,
            braking_deceleration: 550.0,
            braking_friction: None,
            max_speed: 120.0,
        }
    }

    #[test]
    fn accelerates_up_to_max_speed() {
        let mut v = Vec3::zeros();
        let p = params(Vec3::new(0.0, 380.0, 0.0));
        for _ in 0..600 {
            v = calc_velocity(v, p);
        }
        assert!((v.norm() - 120.0).abs() < 1e-3);
        assert!((v.normalize() - Vec3::y()).norm() < 1e-5);
    }

    #[test]
    fn one_step_of_acceleration() {
        let p = params(Vec3::new(0.0, 380.0, 0.0));
        let v = calc_velocity(Vec3::zeros(), p);
        assert!((v.y - 380.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn brakes_linearly_without_friction() {
        let p = params(Vec3::zeros());
        let v = calc_velocity(Vec3::new(0.0, 100.0, 0.0), p);
        assert!((v.y - (100.0 - 550.0 / 60.0)).abs() < 1e-3);
    }

    #[test]
    fn braking_stops_slow_bodies() {
        let v = apply_velocity_braking(Vec3::new(5.0, 0.0, 0.0), 1.0 / 60.0, 0.0, 550.0);
        assert_eq!(v, Vec3::zeros());
        // Never reverses.
        let v = apply_velocity_braking(Vec3::new(50.0, 0.0, 0.0), 1.0, 8.0, 2000.0);
        assert_eq!(v, Vec3::zeros());
    }

    #[test]
    fn no_friction_and_no_braking_keeps_velocity() {
        let v = Vec3::new(30.0, 0.0, 0.0);
        assert_eq!(apply_velocity_braking(v, 0.1, 0.0, 0.0), v);
    }

    #[test]
    fn friction_turns_velocity_toward_input() {
        let p = VelocityParams {
            friction: 8.0,
            max_speed: 500.0,
            ..params(Vec3::new(0.0, 0.0, -2048.0))
        };
        let v = calc_velocity(Vec3::new(400.0, 0.0, 0.0), p);
        assert!(v.x < 400.0);
        assert!(v.z < 0.0);
        assert!(v.norm() <= 500.0 + 1e-3);
    }

    #[test]
    fn input_acceleration_clamps_intent() {
        let a = input_acceleration(Vec3::new(3.0, 0.0, 4.0), 100.0);
        assert!((a.norm() - 100.0).abs() < 1e-4);
        let a = input_acceleration(Vec3::new(0.5, 0.0, 0.0), 100.0);
        assert!((a.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_dt_is_a_no_op() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let p = VelocityParams {
            dt: 0.0,
            ..params(Vec3::x())
        };
        assert_eq!(calc_velocity(v, p), v);
    }
}
