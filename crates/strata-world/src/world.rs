//! The world: chunk store, generator and active dimension, driven by
//! [`World::update`].

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strata_core::{ChunkPos, Error, Result};

use crate::chunk::{Chunk, ChunkState};
use crate::chunk_store::ChunkStore;
use crate::dimension::{DimensionConfig, Palette};
use crate::generation::{TerrainConfig, TerrainGenerator};
use crate::mesh::build_chunk_mesh;
use crate::streaming::GenerationWorker;

/// Streaming and query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Maximum number of chunks the store holds.
    pub capacity: usize,
    /// Chebyshev radius, in chunks, kept generated around the reference.
    pub render_radius: i32,
    /// Height reported for columns whose chunk is not generated yet.
    pub fallback_height: f32,
    /// Added to stored heights to get the standable height.
    pub surface_offset: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            capacity: 128,
            render_radius: 3,
            fallback_height: 5.0,
            surface_offset: 1.0,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "chunk capacity must be non-zero".into(),
            ));
        }
        if self.render_radius < 0 {
            return Err(Error::InvalidConfig(format!(
                "render radius {} is negative",
                self.render_radius
            )));
        }
        if !self.fallback_height.is_finite() || !self.surface_offset.is_finite() {
            return Err(Error::InvalidConfig(
                "fallback height and surface offset must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// What one call to [`World::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldUpdate {
    /// Chunks added to the store.
    pub created: usize,
    /// Coordinates in range that did not fit in the store.
    pub rejected: usize,
    /// Chunks submitted to the background worker.
    pub submitted: usize,
    /// Chunks whose columns were installed.
    pub generated: usize,
    /// Chunks that received a new mesh.
    pub meshed: usize,
}

/// Terrain world for one dimension at a time.
pub struct World {
    config: WorldConfig,
    pub(crate) store: ChunkStore,
    generator: TerrainGenerator,
    dimension: Arc<DimensionConfig>,
    worker: Option<GenerationWorker>,
    /// Bumped whenever chunk contents are discarded, so in-flight
    /// background results can be recognised as stale.
    epoch: u64,
}

impl World {
    /// Create a world that generates chunks inline during `update`.
    pub fn new(
        config: WorldConfig,
        terrain: TerrainConfig,
        dimension: DimensionConfig,
    ) -> Result<Self> {
        config.validate()?;
        terrain.validate()?;
        dimension.validate()?;

        tracing::info!(
            seed = terrain.seed,
            dimension = %dimension.name,
            capacity = config.capacity,
            render_radius = config.render_radius,
            "Created world"
        );

        Ok(Self {
            store: ChunkStore::new(config.capacity),
            config,
            generator: TerrainGenerator::new(terrain),
            dimension: Arc::new(dimension),
            worker: None,
            epoch: 0,
        })
    }

    /// Create a world whose column generation runs on a background thread.
    ///
    /// New chunks are `Pending` until their columns arrive; queries treat
    /// them as ungenerated meanwhile.
    pub fn with_background_generation(
        config: WorldConfig,
        terrain: TerrainConfig,
        dimension: DimensionConfig,
    ) -> Result<Self> {
        let mut world = Self::new(config, terrain, dimension)?;
        world.worker = Some(GenerationWorker::spawn(world.generator.clone())?);
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn dimension(&self) -> &DimensionConfig {
        &self.dimension
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.store.get(pos)
    }

    /// Check if generation runs on the background worker.
    pub fn is_background(&self) -> bool {
        self.worker.is_some()
    }

    /// Stream chunks around `reference`: create every chunk within the
    /// render radius, generate those without data, then mesh every
    /// generated chunk without a mesh.
    #[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
    pub fn update(&mut self, reference: Vec3) -> WorldUpdate {
        let center = ChunkPos::from_world(reference.x, reference.z);
        let mut stats = WorldUpdate::default();

        let missing = self.request_radius(center, &mut stats);
        if self.worker.is_some() {
            self.collect_background(&mut stats);
            self.submit_background(missing, &mut stats);
        } else {
            self.generate_inline(&missing, &mut stats);
        }
        stats.meshed = self.mesh_dirty();

        if stats.rejected > 0 {
            tracing::debug!(
                rejected = stats.rejected,
                capacity = self.store.capacity(),
                "Chunk store full, not streaming further chunks"
            );
        }
        if stats.generated > 0 || stats.meshed > 0 {
            tracing::debug!(
                center_x = center.x,
                center_z = center.z,
                generated = stats.generated,
                meshed = stats.meshed,
                "World update"
            );
        }
        stats
    }

    /// Create the chunks around `center` and return those still lacking
    /// column data and not already submitted.
    fn request_radius(&mut self, center: ChunkPos, stats: &mut WorldUpdate) -> Vec<ChunkPos> {
        let radius = self.config.render_radius;
        let mut missing = Vec::new();

        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let pos = ChunkPos::new(center.x + dx, center.z + dz);
                let existed = self.store.contains(pos);
                match self.store.get_or_create(pos) {
                    Some(chunk) => {
                        if !existed {
                            stats.created += 1;
                        }
                        if chunk.state() == ChunkState::Empty {
                            missing.push(pos);
                        }
                    }
                    None => stats.rejected += 1,
                }
            }
        }
        missing
    }

    fn generate_inline(&mut self, missing: &[ChunkPos], stats: &mut WorldUpdate) {
        if missing.is_empty() {
            return;
        }
        for (pos, columns) in self
            .generator
            .generate_chunks_parallel(missing, &self.dimension)
        {
            if let Some(chunk) = self.store.get_mut(pos) {
                if chunk.install_columns(columns) {
                    stats.generated += 1;
                }
            }
        }
    }

    fn submit_background(&mut self, missing: Vec<ChunkPos>, stats: &mut WorldUpdate) {
        let Some(worker) = &self.worker else {
            return;
        };
        if missing.is_empty() {
            return;
        }

        let count = missing.len();
        match worker.submit(self.epoch, Arc::clone(&self.dimension), missing.clone()) {
            Ok(()) => {
                for pos in missing {
                    if let Some(chunk) = self.store.get_mut(pos) {
                        chunk.mark_pending();
                    }
                }
                stats.submitted += count;
            }
            // Queue full; the chunks stay empty and are offered again next update.
            Err(_) => tracing::trace!(count, "Generation queue full"),
        }
    }

    fn collect_background(&mut self, stats: &mut WorldUpdate) {
        let Some(worker) = &self.worker else {
            return;
        };
        while let Some(result) = worker.try_recv() {
            if result.epoch != self.epoch {
                tracing::trace!(x = result.pos.x, z = result.pos.z, "Dropping stale columns");
                continue;
            }
            let Some(chunk) = self.store.get_mut(result.pos) else {
                continue;
            };
            if chunk.state() == ChunkState::Pending && chunk.install_columns(result.columns) {
                stats.generated += 1;
            }
        }
    }

    /// Mesh every generated chunk that has no current mesh.
    fn mesh_dirty(&mut self) -> usize {
        let palette = self.dimension.palette;
        self.store
            .iter_mut()
            .filter(|chunk| chunk.state() == ChunkState::Generated)
            .map(|chunk| usize::from(mesh_chunk(chunk, &palette)))
            .sum()
    }

    /// Rebuild the mesh of one chunk right away. Returns false if the chunk
    /// is missing, ungenerated, or has nothing visible.
    pub(crate) fn remesh(&mut self, pos: ChunkPos) -> bool {
        let palette = self.dimension.palette;
        self.store
            .get_mut(pos)
            .is_some_and(|chunk| mesh_chunk(chunk, &palette))
    }

    /// Discard the contents of every chunk so the next `update` regenerates
    /// and remeshes the visible set.
    pub fn regenerate_all(&mut self) {
        self.epoch += 1;
        for chunk in self.store.iter_mut() {
            chunk.reset();
        }
        tracing::debug!(chunks = self.store.len(), "Marked all chunks for regeneration");
    }

    /// Switch to another dimension and regenerate everything under it.
    pub fn set_dimension(&mut self, dimension: DimensionConfig) -> Result<()> {
        dimension.validate()?;
        tracing::info!(
            from = %self.dimension.name,
            to = %dimension.name,
            "Switching dimension"
        );
        self.dimension = Arc::new(dimension);
        self.regenerate_all();
        Ok(())
    }

    /// Drop every chunk, releasing meshes and column data.
    pub fn teardown(&mut self) {
        self.epoch += 1;
        let released = self.store.len();
        self.store.clear();
        tracing::debug!(released, "World torn down");
    }
}

/// Build and install the mesh of one generated chunk. A failed build leaves
/// the chunk generated so a later update retries.
fn mesh_chunk(chunk: &mut Chunk, palette: &Palette) -> bool {
    let Some(columns) = chunk.columns() else {
        return false;
    };
    match build_chunk_mesh(chunk.pos, columns, palette) {
        Ok(mesh) => {
            let visible = mesh.is_some();
            chunk.install_mesh(mesh);
            visible
        }
        Err(err) => {
            tracing::warn!(x = chunk.pos.x, z = chunk.pos.z, %err, "Mesh build failed");
            chunk.invalidate_mesh();
            false
        }
    }
}
