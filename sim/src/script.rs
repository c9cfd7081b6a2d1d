use locomotion::{CollisionWorld, FormKind, FormSet, SimContext, Vec2};

use crate::animator::ScriptedAnimator;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Keep pushing the move stick until `Release`.
    Hold(Vec2),
    Release,
    Look(Vec2),
    Jump,
    ClimbToggle,
    FlyToggle,
    Shapeshift(FormKind),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    pub at: f32,
    pub action: Action,
}

fn cue(at: f32, action: Action) -> Cue {
    Cue { at, action }
}

/// Walk to the front wall, become the Werewolf and climb it, come back as the Druid, then
/// take off as the Griffon and land again.
fn demo_cues() -> Vec<Cue> {
    let forward = Vec2::new(0.0, 1.0);
    vec![
        cue(0.0, Action::Hold(forward)),
        cue(0.4, Action::Shapeshift(FormKind::Werewolf)),
        cue(2.2, Action::ClimbToggle),
        cue(5.0, Action::Release),
        cue(5.2, Action::Shapeshift(FormKind::Druid)),
        cue(5.6, Action::Look(Vec2::new(180.0, 0.0))),
        cue(5.8, Action::Shapeshift(FormKind::Griffon)),
        cue(7.0, Action::Hold(forward)),
        cue(7.2, Action::Jump),
        cue(7.4, Action::FlyToggle),
        cue(7.6, Action::Look(Vec2::new(0.0, 15.0))),
        cue(10.0, Action::Look(Vec2::new(0.0, -30.0))),
        cue(11.5, Action::Release),
        cue(12.0, Action::FlyToggle),
    ]
}

/// Replays a fixed input timeline against a form set.
#[derive(Debug)]
pub struct Script {
    cues: Vec<Cue>,
    next: usize,
    held: Option<Vec2>,
}

impl Script {
    pub fn demo() -> Self {
        Self {
            cues: demo_cues(),
            next: 0,
            held: None,
        }
    }

    /// Seconds until the last cue, plus time to settle.
    pub fn duration(&self) -> f32 {
        self.cues.last().map_or(0.0, |cue| cue.at) + 2.0
    }

    /// Fire every cue due at `time`, then feed the held stick.
    pub fn run(
        &mut self,
        time: f32,
        forms: &mut FormSet,
        animator: &mut ScriptedAnimator,
        world: &dyn CollisionWorld,
        dt: f32,
    ) {
        while let Some(&cue) = self.cues.get(self.next) {
            if cue.at > time {
                break;
            }
            self.next += 1;
            log::info!("t={time:.2}s {:?}", cue.action);
            self.fire(cue.action, forms, animator, world, dt);
        }
        if let Some(axis) = self.held {
            forms.move_input(axis);
        }
    }

    fn fire(
        &mut self,
        action: Action,
        forms: &mut FormSet,
        animator: &mut ScriptedAnimator,
        world: &dyn CollisionWorld,
        dt: f32,
    ) {
        match action {
            Action::Hold(axis) => self.held = Some(axis),
            Action::Release => {
                self.held = None;
                forms.move_released();
            }
            Action::Look(axis) => forms.look(axis),
            Action::Jump => {
                if !forms.jump_pressed() {
                    log::warn!("{:?} could not jump", forms.active_kind());
                }
                forms.jump_released();
            }
            Action::ClimbToggle => {
                let gravity = forms.config().world.gravity();
                let mut ctx = SimContext::new(dt, gravity, world);
                let climbing = forms.climb_toggle(&mut ctx);
                log::info!("{:?} climb requested: {climbing}", forms.active_kind());
            }
            Action::FlyToggle => {
                let flying = forms.fly_toggle();
                log::info!("{:?} flying: {flying}", forms.active_kind());
            }
            Action::Shapeshift(target) => {
                let outcome = forms.request_shapeshift(target, Some(animator));
                log::info!("shapeshift to {target:?}: {outcome:?}");
            }
        }
    }
}
