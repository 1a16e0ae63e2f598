//! Ray picking against the column surface, used to aim digging and
//! building.
//!
//! Rays are marched in fixed steps and compared with the stored height of
//! the column under each sample. Samples over ungenerated chunks never hit.

use strata_core::math::Ray;
use strata_core::WorldPos;

use crate::world::World;

const DIG_START: f32 = 0.5;
const DIG_STEP: f32 = 0.1;
const PLACE_START: f32 = 1.0;
const PLACE_STEP: f32 = 0.05;
/// Height of the viewer's eye above their feet.
const EYE_HEIGHT: f32 = 1.5;
/// Placement closer than this to the viewer's feet is refused.
const MIN_PLACE_DISTANCE: f32 = 1.0;

impl World {
    /// First cell at or below the surface along `ray`, as a dig target.
    ///
    /// The returned position always names the surface cell of the hit
    /// column, so it can be passed straight to [`World::remove`].
    pub fn pick_block(&self, ray: &Ray, max_distance: f32) -> Option<WorldPos> {
        ray.march(DIG_START, max_distance, DIG_STEP)
            .find_map(|point| {
                let height = self.surface_height(point.x, point.z)?;
                (point.y <= height + 1.0).then(|| {
                    WorldPos::new(
                        point.x.floor() as i64,
                        height.floor() as i64,
                        point.z.floor() as i64,
                    )
                })
            })
    }

    /// Cell directly above the first surface the ray grazes, as a build
    /// target for [`World::place`].
    ///
    /// Returns `None` when no surface is within reach or the target would
    /// overlap the viewer, whose eye is the ray origin.
    pub fn pick_placement(&self, ray: &Ray, max_distance: f32) -> Option<WorldPos> {
        let target = ray
            .march(PLACE_START, max_distance, PLACE_STEP)
            .find_map(|point| {
                let height = self.surface_height(point.x, point.z)?;
                (point.y <= height + 1.5 && point.y > height - 0.5).then(|| {
                    WorldPos::new(
                        point.x.floor() as i64,
                        height.floor() as i64 + 1,
                        point.z.floor() as i64,
                    )
                })
            })?;

        let mut feet = ray.origin;
        feet.y -= EYE_HEIGHT;
        let distance = target.to_vec3().distance(feet);
        if distance < MIN_PLACE_DISTANCE {
            tracing::debug!(distance, "Placement target too close to viewer");
            return None;
        }
        Some(target)
    }
}
