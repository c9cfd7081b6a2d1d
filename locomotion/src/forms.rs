//! Shapeshift forms: one character per form, exactly one of them active at a time.
//!
//! Forms are spawned once and persist; switching hides the old body and places the new one
//! where the old one stood. The player controller owns the aim and survives every switch.

use serde::Deserialize;

use crate::animation::AnimationSink;
use crate::body::Body;
use crate::character::{Character, ShapeshiftOutcome};
use crate::collision::{Quat, Vec3};
use crate::config::LocomotionConfig;
use crate::constants::MAX_AIM_PITCH_DEG;
use crate::context::SimContext;
use crate::error::FormError;
use crate::math::{self, Orientation, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum FormKind {
    Druid,
    Griffon,
    Werewolf,
    SeaCreature,
}

/// Free-look aim owned by the player rather than by any body (radians).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerController {
    pub yaw: f32,
    pub pitch: f32,
    possessed: Option<FormKind>,
}

impl PlayerController {
    pub fn control_rotation(&self) -> Quat {
        Orientation::new(self.yaw, self.pitch, 0.0).to_quat()
    }

    /// Mouse-style look input in degrees: x turns right, y looks up.
    pub fn look(&mut self, axis: Vec2) {
        let limit = MAX_AIM_PITCH_DEG.to_radians();
        self.yaw = math::normalize_angle(self.yaw - axis.x.to_radians());
        self.pitch = (self.pitch + axis.y.to_radians()).clamp(-limit, limit);
    }

    /// Take control of `body`; the aim snaps to the body's facing.
    pub fn possess(&mut self, kind: FormKind, body: &Body) {
        let facing = Orientation::from_quat(&body.rotation);
        self.yaw = facing.yaw;
        self.pitch = facing.pitch;
        self.possessed = Some(kind);
    }

    #[inline]
    pub fn possessed(&self) -> Option<FormKind> {
        self.possessed
    }
}

/// Every spawned form plus the controller driving the active one.
#[derive(Debug)]
pub struct FormSet {
    forms: Vec<Character>,
    active: usize,
    controller: PlayerController,
    cfg: LocomotionConfig,
}

impl FormSet {
    /// Spawn every form at `position`/`rotation`, all inactive, then activate the Druid (or
    /// the first form when there is no Druid).
    pub fn spawn(
        kinds: &[FormKind],
        position: Vec3,
        rotation: Quat,
        cfg: LocomotionConfig,
    ) -> Result<Self, FormError> {
        if kinds.is_empty() {
            return Err(FormError::NoForms);
        }
        let mut forms: Vec<Character> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if forms.iter().any(|form| form.kind == kind) {
                return Err(FormError::DuplicateForm(kind));
            }
            forms.push(Character::new(kind, position, rotation, &cfg));
        }

        let active = kinds
            .iter()
            .position(|&kind| kind == FormKind::Druid)
            .unwrap_or(0);
        forms[active].set_active(true);

        let mut controller = PlayerController::default();
        controller.possess(forms[active].kind, &forms[active].body);
        log::info!("spawned {} forms, {:?} active", forms.len(), forms[active].kind);

        Ok(Self {
            forms,
            active,
            controller,
            cfg,
        })
    }

    pub fn active(&self) -> &Character {
        &self.forms[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Character {
        &mut self.forms[self.active]
    }

    #[inline]
    pub fn active_kind(&self) -> FormKind {
        self.forms[self.active].kind
    }

    pub fn form(&self, kind: FormKind) -> Option<&Character> {
        self.forms.iter().find(|form| form.kind == kind)
    }

    pub fn forms(&self) -> &[Character] {
        &self.forms
    }

    pub fn active_count(&self) -> usize {
        self.forms.iter().filter(|form| form.is_active()).count()
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.cfg
    }

    /// Make `kind` the active form. Returns false if it was never spawned or is already
    /// active.
    pub fn switch_to(&mut self, kind: FormKind) -> bool {
        let Some(next) = self.forms.iter().position(|form| form.kind == kind) else {
            log::warn!("cannot switch to {kind:?}: form was never spawned");
            return false;
        };
        if next == self.active {
            return false;
        }

        let previous = &mut self.forms[self.active];
        let position = previous.body.position;
        let rotation = math::yaw_only(&previous.body.rotation);
        let from = previous.kind;
        previous.set_active(false);

        let aim = (self.controller.yaw, self.controller.pitch);
        let incoming = &mut self.forms[next];
        incoming.place(position, rotation, &self.cfg);
        incoming.set_active(true);
        self.controller.possess(kind, &incoming.body);
        (self.controller.yaw, self.controller.pitch) = aim;

        self.active = next;
        log::info!("switched form {from:?} -> {kind:?} at {position:?}");
        true
    }

    pub fn move_input(&mut self, axis: Vec2) {
        let yaw = self.controller.yaw;
        self.active_mut().move_input(axis, yaw);
    }

    pub fn move_released(&mut self) {
        self.active_mut().move_released();
    }

    pub fn look(&mut self, axis: Vec2) {
        self.controller.look(axis);
    }

    pub fn jump_pressed(&mut self) -> bool {
        self.forms[self.active].jump_pressed(&self.cfg)
    }

    pub fn jump_released(&mut self) {
        self.active_mut().jump_released();
    }

    pub fn fly_toggle(&mut self) -> bool {
        self.forms[self.active].fly_toggle(&self.cfg)
    }

    pub fn climb_toggle(&mut self, ctx: &mut SimContext) -> bool {
        self.forms[self.active].climb_toggle(&self.cfg, ctx)
    }

    /// Ask the active form to shapeshift; immediate outcomes switch right away.
    pub fn request_shapeshift(
        &mut self,
        target: FormKind,
        animation: Option<&mut dyn AnimationSink>,
    ) -> ShapeshiftOutcome {
        let outcome = self.forms[self.active].request_shapeshift(target, &self.cfg, animation);
        if let ShapeshiftOutcome::SwitchTo(kind) = outcome {
            self.switch_to(kind);
        }
        outcome
    }

    #[inline]
    pub fn is_charging_shapeshift(&self) -> bool {
        self.active().is_charging_shapeshift()
    }

    /// Cast-complete callback from the animation layer.
    pub fn end_shapeshift_cast_notify(&mut self) -> bool {
        match self.active_mut().end_shapeshift_cast() {
            Some(kind) => self.switch_to(kind),
            None => false,
        }
    }

    /// Step every form; inactive ones are frozen and skip themselves.
    pub fn tick(&mut self, ctx: &mut SimContext) {
        let aim = self.controller.control_rotation();
        for form in &mut self.forms {
            form.tick(&aim, &self.cfg, ctx);
        }
    }
}
