//! Read-only terrain lookups for physics, cameras and placement logic.

use glam::Vec3;
use strata_core::{BlockId, WorldPos};

use crate::world::World;

/// Coarse classification of a cell derived from the column height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Empty,
    Solid,
}

impl Occupancy {
    pub fn is_solid(self) -> bool {
        self == Self::Solid
    }
}

impl World {
    /// Stored height of the column containing `(x, z)`, or `None` while its
    /// chunk is missing, pending or otherwise ungenerated.
    pub fn surface_height(&self, x: f32, z: f32) -> Option<f32> {
        let (chunk, column) = WorldPos::from(Vec3::new(x, 0.0, z)).split();
        self.store.get(chunk)?.height(column)
    }

    /// Standable height at `(x, z)`: the stored height plus the surface
    /// offset. Never fails; ungenerated columns report the fallback height.
    pub fn terrain_height(&self, x: f32, z: f32) -> f32 {
        self.surface_height(x, z).map_or(self.config().fallback_height, |height| {
            height + self.config().surface_offset
        })
    }

    /// Whether the cell at `pos` lies below the standable height.
    pub fn block_at(&self, pos: WorldPos) -> Occupancy {
        if (pos.y as f32) < self.terrain_height(pos.x as f32, pos.z as f32) {
            Occupancy::Solid
        } else {
            Occupancy::Empty
        }
    }

    /// Subsurface material recorded at `pos` during generation.
    ///
    /// `BlockId::AIR` for untagged or above-surface cells, `None` when the
    /// chunk is not generated.
    pub fn subsurface_at(&self, pos: WorldPos) -> Option<BlockId> {
        let (chunk, column) = pos.split();
        self.store.get(chunk)?.ore_at(column, i32::try_from(pos.y).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DimensionConfig;
    use crate::generation::TerrainConfig;
    use crate::world::WorldConfig;
    use approx::assert_relative_eq;
    use strata_core::ChunkPos;

    fn world(seed: u32) -> World {
        World::new(
            WorldConfig {
                render_radius: 1,
                ..Default::default()
            },
            TerrainConfig {
                seed,
                ..Default::default()
            },
            DimensionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn ungenerated_columns_use_fallback() {
        let world = world(0);
        assert_eq!(world.surface_height(3.0, 3.0), None);
        assert_relative_eq!(world.terrain_height(3.0, 3.0), 5.0);
        assert_relative_eq!(world.terrain_height(-1e6, 4e5), 5.0);
    }

    #[test]
    fn terrain_height_adds_surface_offset() {
        let mut world = world(42);
        world.update(Vec3::ZERO);

        for (x, z) in [(0.0, 0.0), (7.5, -3.2), (-16.0, 15.9)] {
            let stored = world.surface_height(x, z).unwrap();
            assert_relative_eq!(world.terrain_height(x, z), stored + 1.0);
        }
    }

    #[test]
    fn stored_height_matches_generator() {
        let mut world = world(42);
        world.update(Vec3::ZERO);

        let expected = world
            .generator()
            .height_at(-5, 9, &DimensionConfig::default());
        assert_relative_eq!(world.surface_height(-5.0, 9.0).unwrap(), expected);
    }

    #[test]
    fn height_unaffected_by_unrelated_generation() {
        let mut world = world(0);
        world.update(Vec3::ZERO);
        let before = world.terrain_height(2.0, 2.0);

        world.update(Vec3::new(48.0, 0.0, 48.0));
        assert!(world.chunk(ChunkPos::new(4, 4)).is_some());

        assert_relative_eq!(world.terrain_height(2.0, 2.0), before);
    }

    #[test]
    fn block_at_splits_on_standable_height() {
        let mut world = world(9);
        world.update(Vec3::ZERO);

        let surface = world.surface_height(6.0, 6.0).unwrap().floor() as i64;
        assert_eq!(world.block_at(WorldPos::new(6, surface, 6)), Occupancy::Solid);
        assert!(world.block_at(WorldPos::new(6, 0, 6)).is_solid());
        assert_eq!(world.block_at(WorldPos::new(6, surface + 2, 6)), Occupancy::Empty);
    }

    #[test]
    fn subsurface_reports_bedrock_and_air() {
        let mut world = world(9);
        world.update(Vec3::ZERO);

        assert_eq!(world.subsurface_at(WorldPos::new(1, 0, 1)), Some(BlockId::BEDROCK));
        let surface = world.surface_height(1.0, 1.0).unwrap().floor() as i64;
        assert_eq!(
            world.subsurface_at(WorldPos::new(1, surface + 1, 1)),
            Some(BlockId::AIR)
        );
        assert_eq!(world.subsurface_at(WorldPos::new(500, 0, 500)), None);
    }
}
