use locomotion::{AnimationSink, MontageId};

/// Stand-in for an animation system: every montage plays for a fixed time and then
/// reports itself finished.
#[derive(Debug, Default)]
pub struct ScriptedAnimator {
    durations: Vec<(MontageId, f32)>,
    default_duration: f32,
    playing: Vec<(MontageId, f32)>,
}

impl ScriptedAnimator {
    pub fn new(default_duration: f32) -> Self {
        Self {
            default_duration,
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, montage: MontageId, seconds: f32) -> Self {
        self.durations.push((montage, seconds));
        self
    }

    fn duration_of(&self, montage: MontageId) -> f32 {
        self.durations
            .iter()
            .find(|(id, _)| *id == montage)
            .map_or(self.default_duration, |&(_, seconds)| seconds)
    }

    /// Advance every playing montage; returns the ones that finished this step.
    pub fn advance(&mut self, dt: f32) -> Vec<MontageId> {
        let mut finished = Vec::new();
        self.playing.retain_mut(|(montage, remaining)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                finished.push(*montage);
                false
            } else {
                true
            }
        });
        finished
    }
}

impl AnimationSink for ScriptedAnimator {
    fn play_montage(&mut self, montage: MontageId) -> bool {
        let duration = self.duration_of(montage);
        self.playing.retain(|(id, _)| *id != montage);
        self.playing.push((montage, duration));
        log::debug!("montage {montage:?} playing for {duration}s");
        true
    }

    fn is_montage_playing(&self, montage: MontageId) -> bool {
        self.playing.iter().any(|(id, _)| *id == montage)
    }
}
