//! Headless demo host: loads the locomotion config, builds a small level and plays a
//! scripted session through every form at a fixed 60 Hz.
//!
//! Usage:
//!   cargo run -p sim -- [path/to/locomotion.toml]

mod animator;
mod level;
mod script;

use anyhow::{Context, Result};
use locomotion::{FormKind, FormSet, LocomotionConfig, MontageId, Quat, SimContext};

use crate::animator::ScriptedAnimator;
use crate::script::Script;

const TICK_HZ: u32 = 60;
const SHAPESHIFT_CAST_SECONDS: f32 = 0.8;
const MANTLE_SECONDS: f32 = 1.2;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => LocomotionConfig::load(&path)
            .with_context(|| format!("load locomotion config from '{path}'"))?,
        None => LocomotionConfig::default(),
    };

    let world = level::build();
    let gravity = cfg.world.gravity();
    let cast_montage = cfg.animation.shapeshift_cast;
    let mut animator = durations(ScriptedAnimator::new(1.0), &cfg);
    let spawn = level::spawn_point(&cfg);
    let kinds = [FormKind::Druid, FormKind::Griffon, FormKind::Werewolf];
    let mut forms = FormSet::spawn(&kinds, spawn, Quat::identity(), cfg)
        .context("spawn shapeshift forms")?;

    let dt = 1.0 / TICK_HZ as f32;
    let mut script = Script::demo();
    let ticks = (script.duration() * TICK_HZ as f32).ceil() as u32;
    log::info!("running {ticks} ticks against {} world statics", world.len());

    for tick in 0..ticks {
        let time = tick as f32 * dt;
        script.run(time, &mut forms, &mut animator, &world, dt);

        let mut ctx = SimContext::new(dt, gravity, &world).with_animation(&mut animator);
        forms.tick(&mut ctx);

        for finished in animator.advance(dt) {
            if Some(finished) == cast_montage && forms.end_shapeshift_cast_notify() {
                log::info!("shapeshift cast finished, now {:?}", forms.active_kind());
            }
        }

        if tick % TICK_HZ == 0 {
            let form = forms.active();
            let body = &form.body;
            log::info!(
                "t={:>5.2}s {:?} {:?} pos=({:.0}, {:.0}, {:.0}) speed={:.0}",
                time,
                form.kind,
                body.mode(),
                body.position.x,
                body.position.y,
                body.position.z,
                body.velocity.norm(),
            );
        }
    }

    let form = forms.active();
    log::info!("finished as {:?} ({:?}) at {:?}", form.kind, form.body.mode(), form.body.position);
    Ok(())
}

fn durations(animator: ScriptedAnimator, cfg: &LocomotionConfig) -> ScriptedAnimator {
    let timed: [(Option<MontageId>, f32); 2] = [
        (cfg.animation.shapeshift_cast, SHAPESHIFT_CAST_SECONDS),
        (cfg.animation.ledge_mantle, MANTLE_SECONDS),
    ];
    timed
        .into_iter()
        .filter_map(|(montage, seconds)| montage.map(|id| (id, seconds)))
        .fold(animator, |animator, (id, seconds)| animator.with_duration(id, seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_the_defaults() {
        let cfg = LocomotionConfig::from_toml_str(include_str!("../data/locomotion.toml"))
            .expect("shipped config parses");
        let defaults = LocomotionConfig::default();
        assert_eq!(cfg.body.capsule, defaults.body.capsule);
        assert_eq!(cfg.ground.tuning, defaults.ground.tuning);
        assert_eq!(cfg.flight.tuning, defaults.flight.tuning);
        assert_eq!(cfg.flight.angle_lift_curve, defaults.flight.angle_lift_curve);
        assert_eq!(cfg.animation.shapeshift_cast, Some(MontageId(2)));
    }

    #[test]
    fn forms_spawn_standing_in_the_level() {
        let cfg = LocomotionConfig::default();
        let world = level::build();
        let gravity = cfg.world.gravity();
        let spawn = level::spawn_point(&cfg);
        let mut forms = FormSet::spawn(&[FormKind::Druid], spawn, Quat::identity(), cfg)
            .expect("forms spawn");
        let mut ctx = SimContext::new(1.0 / TICK_HZ as f32, gravity, &world);
        forms.tick(&mut ctx);
        assert!(forms.active().body.is_grounded());
        assert!((forms.active().body.position.y - spawn.y).abs() < 0.5);
    }
}
