use crate::collision::{CapsuleSpec, FloorHit, Quat, Vec3};
use crate::config::{LocomotionConfig, MovementTuning};
use crate::math;

/// Locomotion mode tag; physics dispatch happens on this once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LocomotionMode {
    #[default]
    Grounded,
    Falling,
    Climbing,
    Flying,
}

/// A capsule-shaped simulated entity.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Acceleration derived from the input consumed by the last physics step.
    pub acceleration: Vec3,
    pub capsule: CapsuleSpec,
    pub mass: f32,
    pub base_eye_height: f32,
    pub tuning: MovementTuning,
    /// Tuning captured at construction; flight restores it on exit.
    pub default_tuning: MovementTuning,
    /// Yaw toward the input direction while grounded/falling.
    pub orient_to_movement: bool,
    pub floor: Option<FloorHit>,
    mode: LocomotionMode,
    pending_input: Vec3,
    pending_force: Vec3,
}

impl Body {
    pub fn new(position: Vec3, rotation: Quat, cfg: &LocomotionConfig) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            capsule: cfg.body.capsule,
            mass: cfg.body.mass,
            base_eye_height: cfg.body.base_eye_height,
            tuning: cfg.ground.tuning,
            default_tuning: cfg.ground.tuning,
            orient_to_movement: true,
            floor: None,
            mode: LocomotionMode::Grounded,
            pending_input: Vec3::zeros(),
            pending_force: Vec3::zeros(),
        }
    }

    #[inline]
    pub fn mode(&self) -> LocomotionMode {
        self.mode
    }

    /// Switch mode, returning the previous one.
    pub fn set_mode(&mut self, mode: LocomotionMode) -> LocomotionMode {
        let previous = self.mode;
        if previous != mode {
            log::debug!("movement mode {previous:?} -> {mode:?}");
            self.mode = mode;
        }
        previous
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.mode == LocomotionMode::Grounded
    }

    /// Airborne, which includes flight.
    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.mode, LocomotionMode::Falling | LocomotionMode::Flying)
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        self.mode == LocomotionMode::Climbing
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.mode == LocomotionMode::Flying
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        math::forward_axis(&self.rotation)
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        math::right_axis(&self.rotation)
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        math::up_axis(&self.rotation)
    }

    /// Accumulate movement intent for the next physics step.
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }

    /// Accumulate an external force for the next physics step.
    pub fn add_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    pub fn pending_input(&self) -> Vec3 {
        self.pending_input
    }

    pub(crate) fn consume_input(&mut self) -> Vec3 {
        std::mem::take(&mut self.pending_input)
    }

    pub(crate) fn consume_force(&mut self) -> Vec3 {
        std::mem::take(&mut self.pending_force)
    }

    /// Zero velocity and every pending input/force.
    pub fn stop_movement_immediately(&mut self) {
        self.velocity = Vec3::zeros();
        self.acceleration = Vec3::zeros();
        self.pending_input = Vec3::zeros();
        self.pending_force = Vec3::zeros();
    }

    /// Eye position along the body's up axis, `extra` higher than the base eye height.
    pub fn eye_location(&self, extra: f32) -> Vec3 {
        self.position + self.up() * (self.base_eye_height + extra)
    }
}
