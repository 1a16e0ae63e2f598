//! Procedural column generation.

use glam::DVec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strata_core::constants::{COLUMN_GRID_SIZE, MAX_HEIGHT};
use strata_core::{BlockId, ChunkPos, Error, Result};

use crate::chunk::{ColumnData, ColumnGrid, OreGrid};
use crate::dimension::DimensionConfig;
use crate::noise_field::NoiseField;
use crate::WorldSeed;

/// One layer of the fractal height sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    /// Horizontal frequency in cycles per column.
    pub frequency: f64,
    /// Height contribution at full noise amplitude.
    pub amplitude: f64,
    /// Extra offset so octaves sample independent slices.
    pub seed_offset: f64,
}

/// Depth band in which a subsurface material may appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OreBand {
    /// Material written into the ore grid.
    pub block: BlockId,
    /// Cells at or above this level never carry the material.
    pub max_y: i32,
    /// 3D sampling frequency.
    pub frequency: f64,
    /// Noise value the sample must exceed. Higher means rarer.
    pub threshold: f64,
    pub seed_offset: f64,
}

/// Terrain generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Seed for the noise permutation.
    pub seed: WorldSeed,
    /// Height octaves, summed.
    pub octaves: Vec<Octave>,
    /// Constant added to the octave sum.
    pub base_height: f64,
    /// Ore bands. Evaluated rarest first regardless of order here.
    pub ore_bands: Vec<OreBand>,
    /// Tag for buried cells outside every band.
    pub filler: BlockId,
    /// Cells this close to the surface stay untagged unless an ore hits.
    pub topsoil_depth: i32,
    /// Heights are clamped to `[0, max_height]`.
    pub max_height: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: vec![
                Octave {
                    frequency: 0.02,
                    amplitude: 8.0,
                    seed_offset: 0.0,
                },
                Octave {
                    frequency: 0.05,
                    amplitude: 4.0,
                    seed_offset: 10.0,
                },
                Octave {
                    frequency: 0.1,
                    amplitude: 2.0,
                    seed_offset: 20.0,
                },
            ],
            base_height: 5.0,
            ore_bands: vec![
                OreBand {
                    block: BlockId::IRON_ORE,
                    max_y: 40,
                    frequency: 0.1,
                    threshold: 0.6,
                    seed_offset: 0.0,
                },
                OreBand {
                    block: BlockId::GOLD_ORE,
                    max_y: 25,
                    frequency: 0.15,
                    threshold: 0.75,
                    seed_offset: 100.0,
                },
                OreBand {
                    block: BlockId::DIAMOND,
                    max_y: 15,
                    frequency: 0.2,
                    threshold: 0.85,
                    seed_offset: 200.0,
                },
            ],
            filler: BlockId::STONE,
            topsoil_depth: 3,
            max_height: MAX_HEIGHT,
        }
    }
}

impl TerrainConfig {
    /// Check the configuration for values generation cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.octaves.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one octave is required".into(),
            ));
        }
        if self
            .octaves
            .iter()
            .any(|o| !o.frequency.is_finite() || o.frequency <= 0.0)
        {
            return Err(Error::InvalidConfig(
                "octave frequency must be positive".into(),
            ));
        }
        if !(0..=MAX_HEIGHT).contains(&self.max_height) {
            return Err(Error::InvalidConfig(format!(
                "max height {} outside [0, {MAX_HEIGHT}]",
                self.max_height
            )));
        }
        for band in &self.ore_bands {
            if band.block.is_air() || !band.frequency.is_finite() || band.frequency <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "ore band for {} is malformed",
                    band.block
                )));
            }
        }
        Ok(())
    }
}

/// Procedural column generator using multi-octave noise.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    config: TerrainConfig,
    noise: NoiseField,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given configuration.
    pub fn new(mut config: TerrainConfig) -> Self {
        config
            .ore_bands
            .sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        let noise = NoiseField::new(config.seed);
        Self { config, noise }
    }

    /// Create a terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed) -> Self {
        Self::new(TerrainConfig {
            seed,
            ..Default::default()
        })
    }

    /// Surface height at world XZ coordinates, clamped to
    /// `[0, max_height]`.
    pub fn height_at(&self, world_x: i64, world_z: i64, dimension: &DimensionConfig) -> f32 {
        let height = self
            .config
            .octaves
            .iter()
            .map(|octave| {
                let point = DVec3::new(
                    world_x as f64 * octave.frequency,
                    0.0,
                    world_z as f64 * octave.frequency,
                );
                self.noise
                    .sample(point, dimension.seed_offset + octave.seed_offset)
                    * octave.amplitude
            })
            .sum::<f64>()
            + self.config.base_height;

        height.clamp(0.0, f64::from(self.config.max_height)) as f32
    }

    /// Subsurface tag for a buried cell. Rarer bands win over common ones
    /// and over the filler.
    fn ore_at(
        &self,
        world_x: i64,
        world_y: i32,
        world_z: i64,
        surface: i32,
        dimension: &DimensionConfig,
    ) -> BlockId {
        if world_y == 0 {
            return BlockId::BEDROCK;
        }

        for band in &self.config.ore_bands {
            if world_y >= band.max_y {
                continue;
            }
            let point =
                DVec3::new(world_x as f64, f64::from(world_y), world_z as f64) * band.frequency;
            if self
                .noise
                .sample(point, dimension.seed_offset + band.seed_offset)
                > band.threshold
            {
                return band.block;
            }
        }

        if world_y < surface - self.config.topsoil_depth {
            self.config.filler
        } else {
            BlockId::AIR
        }
    }

    /// Generate the height, liquid and ore grids of one chunk.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn generate_columns(&self, pos: ChunkPos, dimension: &DimensionConfig) -> ColumnData {
        let corner = pos.to_world_pos();
        let water_level = dimension.water_level;

        let mut heights = ColumnGrid::filled(0.0f32);
        let mut liquid = ColumnGrid::filled(0.0f32);
        let mut tallest = 0;

        for x in 0..COLUMN_GRID_SIZE {
            for z in 0..COLUMN_GRID_SIZE {
                let height = self.height_at(corner.x + x as i64, corner.z + z as i64, dimension);
                heights.set(x, z, height);
                liquid.set(x, z, (water_level - height).max(0.0));
                tallest = tallest.max(height.floor() as i32);
            }
        }

        let mut ore = OreGrid::new(tallest as usize + 1);
        for x in 0..COLUMN_GRID_SIZE {
            for z in 0..COLUMN_GRID_SIZE {
                let world_x = corner.x + x as i64;
                let world_z = corner.z + z as i64;
                let surface = heights.get(x, z).floor() as i32;
                for y in 0..=surface {
                    let tag = self.ore_at(world_x, y, world_z, surface, dimension);
                    if tag.is_solid() {
                        ore.set(x, y as usize, z, tag);
                    }
                }
            }
        }

        tracing::trace!(
            chunk_x = pos.x,
            chunk_z = pos.z,
            tallest,
            "generated chunk columns"
        );

        ColumnData {
            heights,
            liquid,
            ore,
        }
    }

    /// Generate multiple chunks in parallel.
    ///
    /// Returns a vector of (position, columns) pairs.
    pub fn generate_chunks_parallel(
        &self,
        positions: &[ChunkPos],
        dimension: &DimensionConfig,
    ) -> Vec<(ChunkPos, ColumnData)> {
        positions
            .par_iter()
            .map(|&pos| (pos, self.generate_columns(pos, dimension)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::constants::CHUNK_SIZE;

    #[test]
    fn generator_deterministic() {
        let gen1 = TerrainGenerator::with_seed(12345);
        let gen2 = TerrainGenerator::with_seed(12345);
        let dim = DimensionConfig::default();

        for x in -100..100 {
            for z in -100..100 {
                assert_eq!(
                    gen1.height_at(x, z, &dim).to_bits(),
                    gen2.height_at(x, z, &dim).to_bits()
                );
            }
        }
    }

    #[test]
    fn dimensions_produce_different_terrain() {
        let generator = TerrainGenerator::with_seed(0);
        let purple = DimensionConfig::purple();
        let forest = DimensionConfig::forest();

        let mut differences = 0;
        for x in 0..10 {
            for z in 0..10 {
                if generator.height_at(x * 7 + 3, z * 5 + 1, &purple)
                    != generator.height_at(x * 7 + 3, z * 5 + 1, &forest)
                {
                    differences += 1;
                }
            }
        }
        assert!(differences > 50, "dimensions should produce different terrain");
    }

    #[test]
    fn heights_are_clamped() {
        let config = TerrainConfig {
            base_height: -50.0,
            ..Default::default()
        };
        let generator = TerrainGenerator::new(config);
        let columns = generator.generate_columns(ChunkPos::new(0, 0), &DimensionConfig::default());
        assert!(columns.heights.values().iter().all(|&h| h == 0.0));

        let config = TerrainConfig {
            base_height: 500.0,
            ..Default::default()
        };
        let generator = TerrainGenerator::new(config);
        let columns = generator.generate_columns(ChunkPos::new(0, 0), &DimensionConfig::default());
        assert!(columns
            .heights
            .values()
            .iter()
            .all(|&h| h == MAX_HEIGHT as f32));
    }

    #[test]
    fn liquid_fills_to_water_level() {
        let generator = TerrainGenerator::with_seed(1);
        let dim = DimensionConfig::purple();
        let columns = generator.generate_columns(ChunkPos::new(2, -3), &dim);

        for (h, l) in columns.heights.values().iter().zip(columns.liquid.values()) {
            if *h < dim.water_level {
                assert!((h + l - dim.water_level).abs() < 1e-4);
            } else {
                assert_eq!(*l, 0.0);
            }
        }
    }

    #[test]
    fn overlap_column_matches_neighbor() {
        let generator = TerrainGenerator::with_seed(9);
        let dim = DimensionConfig::default();
        let left = generator.generate_columns(ChunkPos::new(0, 0), &dim);
        let right = generator.generate_columns(ChunkPos::new(1, 0), &dim);

        for z in 0..COLUMN_GRID_SIZE {
            assert_eq!(left.heights.get(CHUNK_SIZE, z), right.heights.get(0, z));
        }
    }

    #[test]
    fn regeneration_is_identical() {
        let generator = TerrainGenerator::with_seed(0);
        let dim = DimensionConfig::default();
        let first = generator.generate_columns(ChunkPos::new(-4, 7), &dim);
        let second = generator.generate_columns(ChunkPos::new(-4, 7), &dim);
        assert_eq!(first, second);
    }

    #[test]
    fn rarer_bands_take_precedence() {
        // Every band fires everywhere; the rarest must win.
        let mut config = TerrainConfig {
            base_height: 30.0,
            octaves: vec![Octave {
                frequency: 0.01,
                amplitude: 0.0,
                seed_offset: 0.0,
            }],
            ..Default::default()
        };
        for band in &mut config.ore_bands {
            band.threshold -= 10.0;
        }
        let diamond_ceiling = config
            .ore_bands
            .iter()
            .find(|b| b.block == BlockId::DIAMOND)
            .map(|b| b.max_y)
            .unwrap();
        let generator = TerrainGenerator::new(config);
        let columns = generator.generate_columns(ChunkPos::new(0, 0), &DimensionConfig::default());

        assert_eq!(columns.ore.get(3, 0, 3), BlockId::BEDROCK);
        assert_eq!(columns.ore.get(3, 1, 3), BlockId::DIAMOND);
        assert_eq!(columns.ore.get(3, diamond_ceiling - 1, 3), BlockId::DIAMOND);
        assert_eq!(columns.ore.get(3, diamond_ceiling, 3), BlockId::GOLD_ORE);
        assert_eq!(columns.ore.get(3, 28, 3), BlockId::IRON_ORE);
    }

    #[test]
    fn filler_below_topsoil_only() {
        let config = TerrainConfig {
            base_height: 12.0,
            octaves: vec![Octave {
                frequency: 0.01,
                amplitude: 0.0,
                seed_offset: 0.0,
            }],
            ore_bands: Vec::new(),
            ..Default::default()
        };
        let generator = TerrainGenerator::new(config);
        let columns = generator.generate_columns(ChunkPos::new(5, 5), &DimensionConfig::default());

        assert_eq!(columns.ore.layers(), 13);
        assert_eq!(columns.ore.get(0, 0, 0), BlockId::BEDROCK);
        assert_eq!(columns.ore.get(0, 8, 0), BlockId::STONE);
        assert_eq!(columns.ore.get(0, 9, 0), BlockId::AIR);
        assert_eq!(columns.ore.get(0, 12, 0), BlockId::AIR);
        assert_eq!(columns.ore.get(0, 13, 0), BlockId::AIR);
    }

    #[test]
    fn parallel_generation_matches_sequential() {
        let generator = TerrainGenerator::with_seed(42);
        let dim = DimensionConfig::ice();
        let positions = vec![ChunkPos::new(0, 0), ChunkPos::new(1, 0), ChunkPos::new(0, 1)];

        for (pos, parallel) in generator.generate_chunks_parallel(&positions, &dim) {
            assert_eq!(parallel, generator.generate_columns(pos, &dim));
        }
    }

    #[test]
    fn validate_rejects_bad_configs() {
        assert!(TerrainConfig::default().validate().is_ok());

        let no_octaves = TerrainConfig {
            octaves: Vec::new(),
            ..Default::default()
        };
        assert!(no_octaves.validate().is_err());

        let too_tall = TerrainConfig {
            max_height: MAX_HEIGHT + 1,
            ..Default::default()
        };
        assert!(too_tall.validate().is_err());
    }
}
