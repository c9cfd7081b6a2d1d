use crate::collision::{CollisionWorld, Contact, ProbeShape, Quat, Vec3};
use crate::config::ProbeConfig;
use crate::context::DebugSink;
use crate::math::safe_normal;

/// Averaged climbing surface for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceEstimate {
    pub position: Vec3,
    /// Unit length, or zero when no surface was found.
    pub normal: Vec3,
}

impl SurfaceEstimate {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.normal != Vec3::zeros()
    }
}

/// Reduce `contacts` to a single surface estimate.
///
/// Each contact is re-checked with a small sphere swept from `body_position` toward its
/// impact point; the first surface that sphere meets is what gets averaged. Contacts whose
/// assist sweep finds nothing are dropped. With a `debug` sink every assist sphere is drawn
/// where it stopped.
pub fn estimate(
    world: &dyn CollisionWorld,
    contacts: &[Contact],
    body_position: Vec3,
    probe: &ProbeConfig,
    mut debug: Option<&mut dyn DebugSink>,
) -> SurfaceEstimate {
    let shape = ProbeShape::Sphere {
        radius: probe.assist_sphere_radius,
    };
    let mut position_sum = Vec3::zeros();
    let mut normal_sum = Vec3::zeros();
    let mut count = 0u32;

    for contact in contacts {
        let direction = safe_normal(contact.point - body_position);
        if direction == Vec3::zeros() {
            continue;
        }
        let end = body_position + direction * probe.assist_distance;
        let hit = world.sweep(shape, Quat::identity(), body_position, end);
        if let Some(debug) = debug.as_deref_mut() {
            let reached = hit.map_or(end, |hit| body_position.lerp(&end, hit.fraction));
            debug.sphere(reached, probe.assist_sphere_radius, hit.is_some());
        }
        if let Some(hit) = hit {
            position_sum += hit.point;
            normal_sum += hit.normal;
            count += 1;
        }
    }

    if count == 0 {
        return SurfaceEstimate::default();
    }
    SurfaceEstimate {
        position: position_sum / count as f32,
        normal: safe_normal(normal_sum),
    }
}
