//! Tunables for every locomotion mode, loaded once at startup.
//!
//! Every section is `#[serde(default)]`, so a TOML file only needs the values it changes.

use std::path::Path;

use serde::Deserialize;

use crate::animation::MontageId;
use crate::collision::{CapsuleSpec, Vec3};
use crate::curve::SampledCurve;
use crate::error::ConfigError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub world: WorldConfig,
    pub body: BodyConfig,
    pub ground: GroundConfig,
    pub probe: ProbeConfig,
    pub climb: ClimbConfig,
    pub flight: FlightConfig,
    pub animation: AnimationConfig,
    /// Emit probe shapes to the `DebugSink` when one is attached.
    pub debug_draw: bool,
}

impl LocomotionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.climb;
        check_range(
            "climb.min_horizontal_degrees_to_start",
            c.min_horizontal_degrees_to_start,
            1.0,
            75.0,
        )?;
        check_range("climb.collision_shrink_amount", c.collision_shrink_amount, 0.0, 80.0)?;
        check_range("climb.max_speed", c.max_speed, 10.0, 500.0)?;
        check_range("climb.max_acceleration", c.max_acceleration, 10.0, 2000.0)?;
        check_range("climb.braking_deceleration", c.braking_deceleration, 0.0, 3000.0)?;
        check_range("climb.rotation_speed", c.rotation_speed, 1.0, 12.0)?;
        check_range("climb.snap_speed", c.snap_speed, 0.0, 60.0)?;
        check_range("climb.distance_from_surface", c.distance_from_surface, 0.0, 80.0)?;
        check_range("climb.ceiling_parallel_threshold", c.ceiling_parallel_threshold, 0.0, 1.0)?;

        if c.collision_shrink_amount > self.body.capsule.half_height {
            return Err(ConfigError::Invalid(format!(
                "climb.collision_shrink_amount ({}) exceeds body.capsule.half_height ({})",
                c.collision_shrink_amount, self.body.capsule.half_height
            )));
        }

        check_positive("body.capsule.radius", self.body.capsule.radius)?;
        check_positive("body.mass", self.body.mass)?;
        check_positive("probe.wall_capsule.radius", self.probe.wall_capsule.radius)?;
        check_positive("probe.assist_sphere_radius", self.probe.assist_sphere_radius)?;
        check_positive("probe.assist_distance", self.probe.assist_distance)?;
        check_positive("flight.landing_damping", self.flight.landing_damping)?;
        check_positive("flight.rotation_interp_rate", self.flight.rotation_interp_rate)?;
        check_positive("flight.vertical_interp_rate", self.flight.vertical_interp_rate)?;
        check_range(
            "ground.walkable_floor_angle_deg",
            self.ground.walkable_floor_angle_deg,
            0.0,
            90.0,
        )?;

        if self.flight.min_vertical_velocity > self.flight.max_vertical_velocity {
            return Err(ConfigError::Invalid(format!(
                "flight vertical velocity range is empty ({} > {})",
                self.flight.min_vertical_velocity, self.flight.max_vertical_velocity
            )));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} = {value} is outside [{min}, {max}]"
        )))
    }
}

fn check_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} = {value} must be positive")))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f32; 3],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -980.0, 0.0],
        }
    }
}

impl WorldConfig {
    pub fn gravity(&self) -> Vec3 {
        Vec3::from(self.gravity)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub capsule: CapsuleSpec,
    pub mass: f32,
    /// Eye height above the capsule center.
    pub base_eye_height: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            capsule: CapsuleSpec::new(42.0, 54.0),
            mass: 100.0,
            base_eye_height: 64.0,
        }
    }
}

/// Turn rate limits, degrees per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotationRate {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// The per-body values flight overrides and restores.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub max_walk_speed: f32,
    pub max_acceleration: f32,
    pub air_control: f32,
    /// Friction used while braking; `None` uses the current mode's friction.
    pub braking_friction: Option<f32>,
    pub rotation_rate: RotationRate,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            max_walk_speed: 500.0,
            max_acceleration: 2048.0,
            air_control: 0.35,
            braking_friction: None,
            rotation_rate: RotationRate {
                pitch: 0.0,
                yaw: 500.0,
                roll: 0.0,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub tuning: MovementTuning,
    pub ground_friction: f32,
    pub braking_deceleration_walking: f32,
    pub braking_deceleration_falling: f32,
    pub falling_lateral_friction: f32,
    pub jump_z_velocity: f32,
    pub walkable_floor_angle_deg: f32,
    pub max_step_height: f32,
    pub terminal_speed: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            tuning: MovementTuning::default(),
            ground_friction: 8.0,
            braking_deceleration_walking: 2000.0,
            braking_deceleration_falling: 0.0,
            falling_lateral_friction: 0.0,
            jump_z_velocity: 700.0,
            walkable_floor_angle_deg: 44.765,
            max_step_height: 45.0,
            terminal_speed: 4000.0,
        }
    }
}

impl GroundConfig {
    pub fn walkable_floor_cos(&self) -> f32 {
        self.walkable_floor_angle_deg.to_radians().cos()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Distance ahead of the body where the wall sweep starts.
    pub forward_offset: f32,
    pub wall_capsule: CapsuleSpec,
    /// Eye trace length against a vertical wall.
    pub facing_base_length: f32,
    /// How much longer the eye trace gets as the wall leans back.
    pub facing_steepness_factor: f32,
    pub assist_sphere_radius: f32,
    pub assist_distance: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            forward_offset: 20.0,
            wall_capsule: CapsuleSpec::new(50.0, 30.0),
            facing_base_length: 80.0,
            facing_steepness_factor: 5.0,
            assist_sphere_radius: 6.0,
            assist_distance: 120.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    pub min_horizontal_degrees_to_start: f32,
    pub collision_shrink_amount: f32,
    pub max_speed: f32,
    pub max_acceleration: f32,
    pub braking_deceleration: f32,
    pub rotation_speed: f32,
    pub snap_speed: f32,
    pub distance_from_surface: f32,
    /// `|normal . up|` at or above this counts as a floor/ceiling.
    pub ceiling_parallel_threshold: f32,
    /// Upward speed needed for a mantle, as a fraction of `max_speed`.
    pub mantle_min_up_speed_ratio: f32,
    /// Mantle eye trace length in capsule radii.
    pub mantle_trace_radius_multiplier: f32,
    /// Eye height gained while climbing, in multiples of the shrink amount.
    pub climbing_eye_shrink_multiplier: f32,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            min_horizontal_degrees_to_start: 30.0,
            collision_shrink_amount: 30.0,
            max_speed: 120.0,
            max_acceleration: 380.0,
            braking_deceleration: 550.0,
            rotation_speed: 6.0,
            snap_speed: 4.0,
            distance_from_surface: 45.0,
            ceiling_parallel_threshold: 0.95,
            mantle_min_up_speed_ratio: 1.0 / 3.0,
            mantle_trace_radius_multiplier: 2.5,
            climbing_eye_shrink_multiplier: 2.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub tuning: MovementTuning,
    /// Lift multiplier by aim angle in degrees (positive = aiming up).
    pub angle_lift_curve: SampledCurve,
    /// Lift multiplier by descent speed.
    pub descent_lift_curve: SampledCurve,
    /// Vertical velocity is clamped to `[lift_descent_floor, 0]` before sampling the descent curve.
    pub lift_descent_floor: f32,
    /// Vertical velocity mapped onto the full glide scale.
    pub glide_full_descent: f32,
    pub glide_max_scale: f32,
    pub glide_rate_bias: f32,
    /// Rate at which horizontal velocity turns toward the glide direction.
    pub glide_turn_rate: f32,
    pub vertical_interp_rate: f32,
    pub vertical_target_scale: f32,
    pub min_vertical_velocity: f32,
    pub max_vertical_velocity: f32,
    pub landing_damping: f32,
    pub bank_scale: f32,
    pub max_bank_deg: f32,
    pub rotation_interp_rate: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            tuning: MovementTuning {
                max_walk_speed: 4000.0,
                max_acceleration: 600.0,
                air_control: 100.0,
                braking_friction: Some(2.0),
                rotation_rate: RotationRate {
                    pitch: 0.0,
                    yaw: 0.0,
                    roll: 90.0,
                },
            },
            angle_lift_curve: SampledCurve::new(vec![
                [-90.0, 0.0],
                [-20.0, 0.2],
                [0.0, 0.6],
                [30.0, 1.0],
                [70.0, 0.4],
                [90.0, 0.0],
            ]),
            descent_lift_curve: SampledCurve::new(vec![[0.0, 1.0], [1000.0, 1.2], [4000.0, 1.5]]),
            lift_descent_floor: -4000.0,
            glide_full_descent: -500.0,
            glide_max_scale: 1.5,
            glide_rate_bias: 0.05,
            glide_turn_rate: 2.0,
            vertical_interp_rate: 4.0,
            vertical_target_scale: 10.0,
            min_vertical_velocity: -4000.0,
            max_vertical_velocity: 2000.0,
            landing_damping: 3.0,
            bank_scale: 1.0,
            max_bank_deg: 45.0,
            rotation_interp_rate: 3.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub ledge_mantle: Option<MontageId>,
    pub shapeshift_cast: Option<MontageId>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            ledge_mantle: Some(MontageId(1)),
            shapeshift_cast: Some(MontageId(2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;

    #[test]
    fn defaults_validate() {
        let cfg = LocomotionConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.world.gravity(), Vec3::new(0.0, -980.0, 0.0));
        assert!((cfg.ground.walkable_floor_cos() - 0.71).abs() < 1e-3);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = LocomotionConfig::from_toml_str(
            r#"
            debug_draw = true

            [climb]
            max_speed = 200.0

            [flight]
            angle_lift_curve = [[0.0, 1.0], [-90.0, 0.0]]

            [animation]
            ledge_mantle = 7
            "#,
        )
        .unwrap();
        assert!(cfg.debug_draw);
        assert_eq!(cfg.climb.max_speed, 200.0);
        assert_eq!(cfg.climb.snap_speed, 4.0);
        assert_eq!(cfg.animation.ledge_mantle, Some(MontageId(7)));
        assert_eq!(cfg.animation.shapeshift_cast, Some(MontageId(2)));
        assert!((cfg.flight.angle_lift_curve.sample(-45.0) - 0.5).abs() < 1e-6);
        assert_eq!(cfg.flight.tuning.max_walk_speed, 4000.0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = LocomotionConfig::from_toml_str("[climb]\nmin_horizontal_degrees_to_start = 80.0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LocomotionConfig::from_toml_str("[flight]\nlanding_damping = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn shrink_cannot_exceed_capsule() {
        let err = LocomotionConfig::from_toml_str(
            "[body.capsule]\nradius = 30.0\nhalf_height = 20.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LocomotionConfig::from_toml_str("[climb\nmax_speed = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LocomotionConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
