/// Ticks shorter than this (seconds) are skipped by every physics mode.
pub const MIN_TICK_TIME: f32 = 1.0e-6;

/// Maximum sub-step (seconds) used while integrating braking friction.
pub const MAX_BRAKING_SUBSTEP: f32 = 1.0 / 33.0;

/// Multiplier applied to friction while braking.
pub const BRAKING_FRICTION_FACTOR: f32 = 2.0;

/// Below this speed a braking body with braking deceleration comes to a stop.
pub const BRAKE_TO_STOP_VELOCITY: f32 = 10.0;

/// Speeds whose square is below this are zeroed after braking.
pub const STOPPED_SPEED_SQ: f32 = 1.0e-4;

/// Tolerance used when deciding whether a velocity exceeds the max speed.
pub const OVER_MAX_SPEED_FACTOR: f32 = 1.01;

/// Minimum squared planar motion required to update yaw.
pub const YAW_EPS: f32 = 1.0e-6;

/// Flight pitch never reaches straight up/down, where yaw becomes undefined.
pub const MAX_FLIGHT_PITCH_DEG: f32 = 85.0;

/// Controller pitch limits (degrees).
pub const MAX_AIM_PITCH_DEG: f32 = 89.0;
