pub mod animation;
pub mod bitmask_flags;
pub mod body;
pub mod character;
pub mod climb;
pub mod collision;
pub mod config;
pub mod constants;
pub mod context;
pub mod curve;
pub mod error;
pub mod flight;
pub mod forms;
pub mod math;
pub mod movement;
pub mod probe;
pub mod surface;

pub use animation::{AnimationSink, MontageId};
pub use body::{Body, LocomotionMode};
pub use character::{Character, FormCapabilities, FormFlag, ShapeshiftOutcome};
pub use climb::ClimbState;
pub use collision::{
    CapsuleSpec, ColliderShapeDef, CollisionWorld, Contact, Quat, StaticWorld, Vec3,
    WorldStaticDef,
};
pub use config::LocomotionConfig;
pub use constants::{MAX_AIM_PITCH_DEG, MIN_TICK_TIME};
pub use context::{DebugSink, LedgePolicy, OpenLedgePolicy, SimContext};
pub use curve::{Curve, SampledCurve};
pub use error::{ConfigError, FormError};
pub use flight::FlightState;
pub use forms::{FormKind, FormSet, PlayerController};
pub use math::Vec2;
pub use surface::SurfaceEstimate;

pub use rapier3d;
