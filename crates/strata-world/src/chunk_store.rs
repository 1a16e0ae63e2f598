//! Bounded chunk store with coordinate indexing.

use hashbrown::HashMap;
use strata_core::ChunkPos;

use crate::chunk::{Chunk, ChunkState};

/// Owns every loaded chunk, in creation order, up to a fixed capacity.
///
/// Chunks are never evicted individually; the store is cleared as a whole
/// on teardown.
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    /// Chunk position to slot in `chunks`.
    index: HashMap<ChunkPos, usize>,
    capacity: usize,
}

impl ChunkStore {
    /// Create an empty store holding at most `capacity` chunks.
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up a chunk, creating an empty one if absent.
    ///
    /// Returns `None` when the chunk does not exist and the store is full.
    pub fn get_or_create(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        if let Some(&slot) = self.index.get(&pos) {
            return self.chunks.get_mut(slot);
        }
        if self.is_full() {
            return None;
        }

        tracing::trace!(x = pos.x, z = pos.z, "Creating chunk");
        let slot = self.chunks.len();
        self.chunks.push(Chunk::new(pos));
        self.index.insert(pos, slot);
        self.chunks.get_mut(slot)
    }

    /// Get the chunk at the given position, if loaded.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.index.get(&pos).and_then(|&slot| self.chunks.get(slot))
    }

    /// Get a mutable reference to the chunk at the given position.
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.index
            .get(&pos)
            .and_then(|&slot| self.chunks.get_mut(slot))
    }

    /// Check if a chunk exists at the given position.
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.index.contains_key(&pos)
    }

    /// Get the number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if no chunks are loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Check if the store has reached its chunk capacity.
    pub fn is_full(&self) -> bool {
        self.chunks.len() >= self.capacity
    }

    /// Get the maximum chunk capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All loaded chunk positions, in creation order.
    pub fn positions(&self) -> Vec<ChunkPos> {
        self.chunks.iter().map(|chunk| chunk.pos).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.iter_mut()
    }

    /// Loaded chunks within a Chebyshev radius of `center`.
    pub fn positions_in_radius(&self, center: ChunkPos, radius: i32) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .map(|chunk| chunk.pos)
            .filter(|pos| pos.chebyshev_distance(center) <= radius)
            .collect()
    }

    /// Get chunks in a specific state.
    pub fn positions_in_state(&self, state: ChunkState) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .filter(|chunk| chunk.state() == state)
            .map(|chunk| chunk.pos)
            .collect()
    }

    /// Drop every chunk together with its mesh and column data.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.index.clear();
    }

    /// Get total memory usage of all chunks.
    pub fn memory_usage(&self) -> usize {
        self.chunks.iter().map(Chunk::memory_usage).sum()
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new(128)
    }
}
