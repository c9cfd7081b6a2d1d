use std::fmt;

use crate::animation::AnimationSink;
use crate::bitmask_flags::BitmaskFlags;
use crate::body::{Body, LocomotionMode};
use crate::climb::{self, ClimbState};
use crate::collision::{Quat, Vec3, depenetrate};
use crate::config::LocomotionConfig;
use crate::constants::MIN_TICK_TIME;
use crate::context::SimContext;
use crate::flight::{self, FlightState};
use crate::forms::FormKind;
use crate::math::{self, Vec2};
use crate::movement;

crate::define_bitmask_flags!(FormFlag, u8, {
    Visible,
    Collidable,
    Ticking,
    MovementEnabled,
});

/// What a shapeshift request turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeshiftOutcome {
    Ignored,
    /// A cast animation started; the switch happens on the cast notify.
    Casting,
    SwitchTo(FormKind),
}

pub type ShapeshiftHandler = fn(
    &mut Character,
    FormKind,
    &LocomotionConfig,
    Option<&mut dyn AnimationSink>,
) -> ShapeshiftOutcome;

/// Per-form behaviour table.
#[derive(Clone, Copy)]
pub struct FormCapabilities {
    pub can_fly: bool,
    pub can_climb: bool,
    pub on_shapeshift_requested: ShapeshiftHandler,
}

impl FormCapabilities {
    pub fn for_kind(kind: FormKind) -> Self {
        match kind {
            FormKind::Druid => Self {
                can_fly: false,
                can_climb: false,
                on_shapeshift_requested: cast_shapeshift,
            },
            FormKind::Griffon => Self {
                can_fly: true,
                can_climb: false,
                on_shapeshift_requested: revert_to_druid,
            },
            FormKind::Werewolf => Self {
                can_fly: false,
                can_climb: true,
                on_shapeshift_requested: revert_to_druid,
            },
            FormKind::SeaCreature => Self {
                can_fly: false,
                can_climb: false,
                on_shapeshift_requested: revert_to_druid,
            },
        }
    }
}

impl fmt::Debug for FormCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCapabilities")
            .field("can_fly", &self.can_fly)
            .field("can_climb", &self.can_climb)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapeshiftState {
    pub charging: bool,
    pub pending: Option<FormKind>,
}

/// Cast first, switch when the cast animation notifies. Without a cast animation the
/// switch is immediate.
pub fn cast_shapeshift(
    character: &mut Character,
    target: FormKind,
    cfg: &LocomotionConfig,
    animation: Option<&mut dyn AnimationSink>,
) -> ShapeshiftOutcome {
    if character.shapeshift.charging || target == character.kind {
        return ShapeshiftOutcome::Ignored;
    }
    let started = match (cfg.animation.shapeshift_cast, animation) {
        (Some(montage), Some(animation)) => animation.play_montage(montage),
        _ => false,
    };
    if !started {
        log::debug!("no shapeshift cast animation, switching to {target:?} directly");
        return ShapeshiftOutcome::SwitchTo(target);
    }
    character.shapeshift = ShapeshiftState {
        charging: true,
        pending: Some(target),
    };
    let _ = character.body.consume_input();
    log::debug!("{:?} casting shapeshift into {target:?}", character.kind);
    ShapeshiftOutcome::Casting
}

/// Any request goes straight back to the Druid.
pub fn revert_to_druid(
    character: &mut Character,
    _target: FormKind,
    _cfg: &LocomotionConfig,
    _animation: Option<&mut dyn AnimationSink>,
) -> ShapeshiftOutcome {
    if character.kind == FormKind::Druid {
        return ShapeshiftOutcome::Ignored;
    }
    ShapeshiftOutcome::SwitchTo(FormKind::Druid)
}

/// One shapeshift form: a body plus the controllers its capabilities allow.
#[derive(Clone, Debug)]
pub struct Character {
    pub kind: FormKind,
    pub body: Body,
    pub climb: ClimbState,
    pub flight: FlightState,
    pub shapeshift: ShapeshiftState,
    pub capabilities: FormCapabilities,
    pub flags: BitmaskFlags<u8>,
    jump_held: bool,
    /// Set by `place`; the next tick pushes the body out of whatever it landed in.
    unresolved_placement: bool,
}

impl Character {
    /// A new, inactive form.
    pub fn new(kind: FormKind, position: Vec3, rotation: Quat, cfg: &LocomotionConfig) -> Self {
        Self {
            kind,
            body: Body::new(position, rotation, cfg),
            climb: ClimbState::default(),
            flight: FlightState::default(),
            shapeshift: ShapeshiftState::default(),
            capabilities: FormCapabilities::for_kind(kind),
            flags: BitmaskFlags::default(),
            jump_held: false,
            unresolved_placement: false,
        }
    }

    /// Visible, collidable, ticking and movement-enabled, or none of them.
    pub fn set_active(&mut self, active: bool) {
        self.flags.set_many(FormFlag::ALL, active);
    }

    pub fn is_active(&self) -> bool {
        self.flags.has_all(FormFlag::ALL)
    }

    /// Place the body at a new pose, dropping any climb, flight or momentum it had.
    ///
    /// Overlaps at the new pose are resolved at the start of the next tick.
    pub fn place(&mut self, position: Vec3, rotation: Quat, cfg: &LocomotionConfig) {
        if self.body.is_climbing() {
            climb::end_climbing(&mut self.climb, &mut self.body, cfg);
        }
        if self.flight.flying {
            flight::stop_flying(&mut self.flight, &mut self.body, cfg);
        }
        climb::cancel_climbing(&mut self.climb);
        self.body.stop_movement_immediately();
        self.body.floor = None;
        self.body.set_mode(LocomotionMode::Falling);
        self.body.position = position;
        self.body.rotation = rotation;
        self.shapeshift = ShapeshiftState::default();
        self.jump_held = false;
        self.unresolved_placement = true;
    }

    /// Planar move input. On the ground and in the air it is relative to `control_yaw`;
    /// while climbing it is relative to the surface.
    pub fn move_input(&mut self, axis: Vec2, control_yaw: f32) {
        if self.shapeshift.charging || !self.flags.has(FormFlag::MovementEnabled) {
            return;
        }
        let (forward, right) = if self.body.is_climbing() {
            climb::climb_input_axes(&self.body, &self.climb)
        } else {
            let yaw = math::yaw_rotation(control_yaw);
            (math::forward_axis(&yaw), math::right_axis(&yaw))
        };
        self.body.add_movement_input(forward, axis.y);
        self.body.add_movement_input(right, axis.x);
        if axis.y > 0.0 && self.capabilities.can_fly {
            self.flight.flapping = true;
        }
    }

    pub fn move_released(&mut self) {
        self.flight.flapping = false;
    }

    /// Launch from the ground. Holding the button does not re-trigger.
    pub fn jump_pressed(&mut self, cfg: &LocomotionConfig) -> bool {
        if self.jump_held || self.shapeshift.charging {
            return false;
        }
        self.jump_held = true;
        if !self.body.is_grounded() {
            return false;
        }
        self.body.velocity.y = cfg.ground.jump_z_velocity;
        self.body.floor = None;
        self.body.set_mode(LocomotionMode::Falling);
        true
    }

    pub fn jump_released(&mut self) {
        self.jump_held = false;
    }

    /// Returns whether the form is flying afterwards.
    pub fn fly_toggle(&mut self, cfg: &LocomotionConfig) -> bool {
        if !self.capabilities.can_fly {
            return false;
        }
        flight::toggle(&mut self.flight, &mut self.body, cfg)
    }

    /// Cancel climbing, or request it if the wall in front allows.
    pub fn climb_toggle(&mut self, cfg: &LocomotionConfig, ctx: &mut SimContext) -> bool {
        if !self.capabilities.can_climb {
            return false;
        }
        if self.body.is_climbing() {
            climb::cancel_climbing(&mut self.climb);
            false
        } else {
            climb::try_climbing(&mut self.climb, &self.body, cfg, ctx)
        }
    }

    pub fn request_shapeshift(
        &mut self,
        target: FormKind,
        cfg: &LocomotionConfig,
        animation: Option<&mut dyn AnimationSink>,
    ) -> ShapeshiftOutcome {
        let handler = self.capabilities.on_shapeshift_requested;
        handler(self, target, cfg, animation)
    }

    #[inline]
    pub fn is_charging_shapeshift(&self) -> bool {
        self.shapeshift.charging
    }

    /// Finish a cast; returns the form to switch to.
    pub fn end_shapeshift_cast(&mut self) -> Option<FormKind> {
        if !self.shapeshift.charging {
            return None;
        }
        std::mem::take(&mut self.shapeshift).pending
    }

    /// One simulation step. `aim` is the controller rotation.
    pub fn tick(&mut self, aim: &Quat, cfg: &LocomotionConfig, ctx: &mut SimContext) {
        if !self.flags.has(FormFlag::Ticking) || ctx.dt < MIN_TICK_TIME {
            return;
        }

        if std::mem::take(&mut self.unresolved_placement) {
            let body = &mut self.body;
            body.position = depenetrate(ctx.world, body.capsule, body.rotation, body.position);
        }
        if self.capabilities.can_climb {
            climb::refresh_contacts(&mut self.climb, &self.body, cfg, ctx);
        }
        if self.flight.flying {
            flight::pre_physics(&mut self.flight, &mut self.body, aim, cfg, ctx);
        }
        if self.flags.has(FormFlag::MovementEnabled) {
            movement::perform_movement(&mut self.body, &mut self.climb, cfg, ctx);
            climb::on_movement_updated(&mut self.climb, &mut self.body, cfg);
        }
        flight::check_landing(&mut self.flight, &mut self.body, cfg);
    }
}
