//! Math utilities and helpers.

use glam::Vec3;

/// Ray for picking operations.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    /// Ray origin
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from an eye position towards a target point
    #[inline]
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self::new(eye, target - eye)
    }

    /// Get a point along the ray at distance t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Sample points along the ray from `start` (inclusive) to `end`
    /// (exclusive) every `step` units.
    pub fn march(&self, start: f32, end: f32, step: f32) -> impl Iterator<Item = Vec3> + '_ {
        let steps = if step > 0.0 && end > start {
            ((end - start) / step).ceil() as usize
        } else {
            0
        };
        (0..steps).map(move |i| self.at(start + step * i as f32))
    }
}
