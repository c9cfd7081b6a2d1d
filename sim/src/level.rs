use locomotion::collision::settings::FLOOR_HOVER_HEIGHT;
use locomotion::{ColliderShapeDef, LocomotionConfig, StaticWorld, Vec3, WorldStaticDef};
use nalgebra::Vector3;

/// Where the forms spawn: standing on the ground, facing the climbable wall.
pub fn spawn_point(cfg: &LocomotionConfig) -> Vec3 {
    Vec3::new(0.0, cfg.body.capsule.total_half_height() + FLOOR_HOVER_HEIGHT, 0.0)
}

/// Ground plane, a climbable wall straight ahead (-Z) with an open top edge, and a tall
/// wall off to the right.
pub fn build() -> StaticWorld {
    StaticWorld::build(vec![
        WorldStaticDef::new(
            1,
            Vector3::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        ),
        // Face at z = -350, top at y = 400: above the eyes of a form that starts climbing
        // from the ground.
        WorldStaticDef::new(
            2,
            Vector3::new(0.0, 200.0, -400.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(300.0, 200.0, 50.0),
            },
        ),
        // Face at x = 600, 800 tall.
        WorldStaticDef::new(
            3,
            Vector3::new(650.0, 400.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vector3::new(50.0, 400.0, 600.0),
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use locomotion::climb::{self, ClimbState};
    use locomotion::{Body, Quat, SimContext};

    #[test]
    fn front_wall_edge_opens_only_near_its_top() {
        let cfg = LocomotionConfig::default();
        let world = build();
        let stand_off = Vec3::new(0.0, 0.0, -350.0 + cfg.climb.distance_from_surface);
        let mut body = Body::new(spawn_point(&cfg) + stand_off, Quat::identity(), &cfg);
        let mut state = ClimbState::default();
        climb::begin_climbing(&mut state, &mut body, &cfg);
        let mut ctx = SimContext::new(1.0 / 60.0, cfg.world.gravity(), &world);
        assert!(!climb::has_reached_edge(&body, &cfg, &mut ctx));

        body.position.y = 300.0;
        assert!(climb::has_reached_edge(&body, &cfg, &mut ctx));
    }
}
