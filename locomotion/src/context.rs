//! Per-tick simulation context and the optional collaborators the controllers call into.

use crate::animation::AnimationSink;
use crate::body::Body;
use crate::collision::{CapsuleSpec, CollisionWorld, Quat, Vec3};

/// Debug visualization sink. Every method is a fire-and-forget draw request.
pub trait DebugSink {
    fn capsule(&mut self, center: Vec3, rotation: Quat, capsule: CapsuleSpec, hit: bool);
    fn sphere(&mut self, center: Vec3, radius: f32, hit: bool);
    fn line(&mut self, start: Vec3, end: Vec3, hit: bool);
    fn point(&mut self, at: Vec3);
}

/// Validation hook for ledge mantles and landing spots.
pub trait LedgePolicy {
    fn can_move_to_ledge(&self, body: &Body) -> bool;
    fn is_location_walkable(&self, location: Vec3) -> bool;
}

/// Accepts every ledge.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenLedgePolicy;

impl LedgePolicy for OpenLedgePolicy {
    fn can_move_to_ledge(&self, _body: &Body) -> bool {
        true
    }

    fn is_location_walkable(&self, _location: Vec3) -> bool {
        true
    }
}

/// Everything a tick needs from outside the character: time step, gravity, the static
/// world and the optional host collaborators.
pub struct SimContext<'a> {
    pub dt: f32,
    pub gravity: Vec3,
    pub world: &'a dyn CollisionWorld,
    pub animation: Option<&'a mut dyn AnimationSink>,
    pub debug: Option<&'a mut dyn DebugSink>,
    pub ledge: &'a dyn LedgePolicy,
}

impl<'a> SimContext<'a> {
    pub fn new(dt: f32, gravity: Vec3, world: &'a dyn CollisionWorld) -> Self {
        Self {
            dt,
            gravity,
            world,
            animation: None,
            debug: None,
            ledge: &OpenLedgePolicy,
        }
    }

    pub fn with_animation(mut self, animation: &'a mut dyn AnimationSink) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_debug(mut self, debug: &'a mut dyn DebugSink) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn with_ledge_policy(mut self, ledge: &'a dyn LedgePolicy) -> Self {
        self.ledge = ledge;
        self
    }

    pub fn animation(&mut self) -> Option<&mut dyn AnimationSink> {
        match self.animation.as_mut() {
            Some(sink) => Some(&mut **sink),
            None => None,
        }
    }

    pub fn debug(&mut self) -> Option<&mut dyn DebugSink> {
        match self.debug.as_mut() {
            Some(sink) => Some(&mut **sink),
            None => None,
        }
    }
}
