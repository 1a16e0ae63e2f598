//! Column-granular digging and building.
//!
//! Edits change the height of a whole column by one cell; they never
//! toggle an arbitrary 3D cell. The owning chunk is remeshed before the
//! call returns. Neighbouring chunks are left alone: meshes treat cells
//! outside their own chunk as empty, so no other mesh depends on the
//! edited column.

use strata_core::constants::MAX_HEIGHT;
use strata_core::{BlockId, ChunkPos, LocalColumn, WorldPos};
use thiserror::Error;

use crate::chunk::Chunk;
use crate::world::World;

/// Why an edit was rejected. A rejected edit changes nothing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    #[error("chunk ({}, {}) is not generated", .chunk.x, .chunk.z)]
    ChunkNotGenerated { chunk: ChunkPos },

    #[error("y={y} is above the surface at {surface}")]
    AboveSurface { y: i64, surface: i64 },

    #[error("y={y} is below bedrock")]
    BelowBedrock { y: i64 },

    #[error("y={y} is not directly above the surface, expected {expected}")]
    NotOnSurface { y: i64, expected: i64 },

    #[error("y={y} is above the height ceiling {ceiling}")]
    AboveCeiling { y: i64, ceiling: i64 },
}

fn generated_surface(
    chunk: Option<&Chunk>,
    pos: ChunkPos,
    column: LocalColumn,
) -> Result<i64, EditError> {
    chunk
        .and_then(|chunk| chunk.height(column))
        .map(|height| height.floor() as i64)
        .ok_or(EditError::ChunkNotGenerated { chunk: pos })
}

impl World {
    /// Dig at `pos`, lowering its column by one cell.
    ///
    /// Returns the dimension's top material when the targeted cell was the
    /// surface cell, its fill material otherwise.
    pub fn remove(&mut self, pos: WorldPos) -> Result<BlockId, EditError> {
        let (chunk_pos, column) = pos.split();
        let result =
            generated_surface(self.store.get(chunk_pos), chunk_pos, column).and_then(|surface| {
                if pos.y < 0 {
                    Err(EditError::BelowBedrock { y: pos.y })
                } else if pos.y > surface {
                    Err(EditError::AboveSurface { y: pos.y, surface })
                } else {
                    Ok(surface)
                }
            });
        let surface = match result {
            Ok(surface) => surface,
            Err(err) => {
                tracing::warn!(x = pos.x, y = pos.y, z = pos.z, %err, "Remove rejected");
                return Err(err);
            }
        };

        let dropped = if pos.y == surface {
            self.dimension().top_block
        } else {
            self.dimension().fill_block
        };

        if let Some(chunk) = self.store.get_mut(chunk_pos) {
            chunk.set_height(column, (surface - 1).max(0) as f32);
        }
        self.remesh(chunk_pos);

        tracing::debug!(
            x = pos.x,
            y = pos.y,
            z = pos.z,
            block = %dropped,
            "Removed block"
        );
        Ok(dropped)
    }

    /// Build `block` at `pos`, which must sit directly on the column's
    /// surface and not above the height ceiling.
    pub fn place(&mut self, pos: WorldPos, block: BlockId) -> Result<(), EditError> {
        let (chunk_pos, column) = pos.split();
        let result =
            generated_surface(self.store.get(chunk_pos), chunk_pos, column).and_then(|surface| {
                let ceiling = i64::from(MAX_HEIGHT);
                if pos.y != surface + 1 {
                    Err(EditError::NotOnSurface {
                        y: pos.y,
                        expected: surface + 1,
                    })
                } else if pos.y > ceiling {
                    Err(EditError::AboveCeiling { y: pos.y, ceiling })
                } else {
                    Ok(())
                }
            });
        if let Err(err) = result {
            tracing::warn!(x = pos.x, y = pos.y, z = pos.z, %block, %err, "Place rejected");
            return Err(err);
        }

        if let Some(chunk) = self.store.get_mut(chunk_pos) {
            chunk.set_height(column, pos.y as f32);
        }
        self.remesh(chunk_pos);

        tracing::info!(
            x = pos.x,
            y = pos.y,
            z = pos.z,
            %block,
            "Placed block"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkState;
    use crate::dimension::DimensionConfig;
    use crate::generation::TerrainConfig;
    use crate::world::WorldConfig;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn generated_world(seed: u32) -> World {
        let mut world = World::new(
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
        .unwrap();
        world.update(Vec3::new(8.0, 0.0, 8.0));
        world
    }

    fn surface(world: &World, x: i64, z: i64) -> i64 {
        let (chunk, column) = WorldPos::new(x, 0, z).split();
        world
            .chunk(chunk)
            .unwrap()
            .surface_level(column)
            .unwrap()
            .into()
    }

    #[test]
    fn remove_surface_cell_drops_top_material() {
        let mut world = generated_world(0);
        let h = surface(&world, 0, 0);
        let before = world.terrain_height(0.0, 0.0);

        let dropped = world.remove(WorldPos::new(0, h, 0)).unwrap();

        assert_eq!(dropped, world.dimension().top_block);
        let after = world.terrain_height(0.0, 0.0);
        if h > 0 {
            assert_relative_eq!(after, h as f32);
            assert!(after < before);
        }
        assert_eq!(
            world.chunk(ChunkPos::new(0, 0)).unwrap().state(),
            ChunkState::Meshed
        );
    }

    #[test]
    fn remove_buried_cell_drops_fill_material() {
        let mut world = generated_world(3);
        let (x, z) = (5, 9);
        // Build up so there is something below the surface to dig.
        let h = surface(&world, x, z);
        world
            .place(WorldPos::new(x, h + 1, z), BlockId::DIRT)
            .unwrap();

        let dropped = world.remove(WorldPos::new(x, h, z)).unwrap();
        assert_eq!(dropped, world.dimension().fill_block);
        assert_eq!(surface(&world, x, z), h);
    }

    #[test]
    fn place_then_remove_round_trip() {
        let mut world = generated_world(11);
        let (x, z) = (-3, 12);
        let h = surface(&world, x, z);

        world
            .place(WorldPos::new(x, h + 1, z), BlockId::STONE)
            .unwrap();
        assert_eq!(surface(&world, x, z), h + 1);

        let dropped = world.remove(WorldPos::new(x, h + 1, z)).unwrap();
        assert_eq!(dropped, world.dimension().top_block);
        assert_eq!(surface(&world, x, z), h);
    }

    #[test]
    fn place_off_surface_fails() {
        let mut world = generated_world(5);
        let h = surface(&world, 2, 2);

        for y in [h - 1, h, h + 2, h + 10] {
            let err = world
                .place(WorldPos::new(2, y, 2), BlockId::DIRT)
                .unwrap_err();
            assert_eq!(err, EditError::NotOnSurface { y, expected: h + 1 });
        }
        assert_eq!(surface(&world, 2, 2), h);
    }

    #[test]
    fn remove_outside_column_fails() {
        let mut world = generated_world(5);
        let h = surface(&world, 7, 1);

        assert_eq!(
            world.remove(WorldPos::new(7, h + 1, 1)),
            Err(EditError::AboveSurface { y: h + 1, surface: h })
        );
        assert_eq!(
            world.remove(WorldPos::new(7, -1, 1)),
            Err(EditError::BelowBedrock { y: -1 })
        );
        assert_eq!(surface(&world, 7, 1), h);
    }

    #[test]
    fn edits_in_ungenerated_chunks_fail() {
        let mut world = generated_world(0);
        let far = WorldPos::new(1000, 5, 1000);
        let chunk = far.chunk_pos();

        assert_eq!(
            world.remove(far),
            Err(EditError::ChunkNotGenerated { chunk })
        );
        assert_eq!(
            world.place(far, BlockId::DIRT),
            Err(EditError::ChunkNotGenerated { chunk })
        );
    }

    #[test]
    fn place_respects_ceiling() {
        let mut world = generated_world(0);
        let (x, z) = (1, 1);
        let mut h = surface(&world, x, z);
        while h < i64::from(MAX_HEIGHT) {
            world
            .place(WorldPos::new(x, h + 1, z), BlockId::DIRT)
            .unwrap();
            h += 1;
        }

        let y = i64::from(MAX_HEIGHT) + 1;
        assert_eq!(
            world.place(WorldPos::new(x, y, z), BlockId::DIRT),
            Err(EditError::AboveCeiling {
                y,
                ceiling: i64::from(MAX_HEIGHT)
            })
        );
    }

    #[test]
    fn remove_at_bedrock_keeps_floor() {
        let mut world = generated_world(0);
        let (x, z) = (4, 4);
        let mut h = surface(&world, x, z);
        while h > 0 {
            world.remove(WorldPos::new(x, h, z)).unwrap();
            h -= 1;
        }
        assert_eq!(surface(&world, x, z), 0);

        world.remove(WorldPos::new(x, 0, z)).unwrap();
        assert_eq!(surface(&world, x, z), 0);
    }

    #[test]
    fn edit_only_touches_owning_chunk() {
        let mut world = generated_world(8);
        let neighbour = ChunkPos::new(-1, 0);
        let before = world.chunk(neighbour).unwrap().mesh().cloned();

        let h = surface(&world, 0, 3);
        world.place(WorldPos::new(0, h + 1, 3), BlockId::DIRT).unwrap();

        assert_eq!(world.chunk(neighbour).unwrap().mesh().cloned(), before);
    }
}
