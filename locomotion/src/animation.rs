use serde::Deserialize;

/// Handle of a one-shot animation (mantle, shapeshift cast) owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct MontageId(pub u32);

/// Outbound animation hooks. The host plays montages and, for the shapeshift cast,
/// reports completion back through `FormSet::end_shapeshift_cast_notify`.
pub trait AnimationSink {
    /// Start `montage`; returns false if it could not be played.
    fn play_montage(&mut self, montage: MontageId) -> bool;

    fn is_montage_playing(&self, montage: MontageId) -> bool;
}
