//! Coordinate systems for the column world.
//!
//! The world is partitioned horizontally only: a [`ChunkPos`] names a
//! square of `CHUNK_SIZE x CHUNK_SIZE` columns, a [`LocalColumn`] names one
//! column inside it, and a [`WorldPos`] is an integer cell anywhere in the
//! world.

use crate::constants::{CHUNK_BITS, CHUNK_SIZE};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Column within a chunk (0 to CHUNK_SIZE-1 per axis).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct LocalColumn {
    pub x: u8,
    pub z: u8,
}

impl LocalColumn {
    /// Create a new local column
    #[inline]
    pub const fn new(x: u8, z: u8) -> Self {
        debug_assert!((x as usize) < CHUNK_SIZE);
        debug_assert!((z as usize) < CHUNK_SIZE);
        Self { x, z }
    }

    /// Build a local column from offsets relative to the chunk corner,
    /// clamping each axis into `[0, CHUNK_SIZE)` instead of rejecting it.
    #[inline]
    pub fn clamped(dx: i64, dz: i64) -> Self {
        let max = (CHUNK_SIZE - 1) as i64;
        Self {
            x: dx.clamp(0, max) as u8,
            z: dz.clamp(0, max) as u8,
        }
    }
}

/// Chunk position in chunk coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// Create a new chunk position
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given horizontal world coordinates.
    #[inline]
    pub fn from_world(x: f32, z: f32) -> Self {
        let size = CHUNK_SIZE as f32;
        Self::new((x / size).floor() as i32, (z / size).floor() as i32)
    }

    /// Convert to world position (corner of chunk at y = 0)
    #[inline]
    pub const fn to_world_pos(self) -> WorldPos {
        WorldPos::new(
            (self.x as i64) << CHUNK_BITS,
            0,
            (self.z as i64) << CHUNK_BITS,
        )
    }

    /// Chebyshev (chessboard) distance to another chunk position
    #[inline]
    pub const fn chebyshev_distance(self, other: Self) -> i32 {
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        if dx > dz {
            dx
        } else {
            dz
        }
    }
}

/// World position in cell coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl WorldPos {
    /// Create a new world position
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Get the chunk containing this position
    #[inline]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new((self.x >> CHUNK_BITS) as i32, (self.z >> CHUNK_BITS) as i32)
    }

    /// Get the column within the owning chunk
    #[inline]
    pub fn local_column(self) -> LocalColumn {
        let corner = self.chunk_pos().to_world_pos();
        LocalColumn::clamped(self.x - corner.x, self.z - corner.z)
    }

    /// Split into chunk and local column
    #[inline]
    pub fn split(self) -> (ChunkPos, LocalColumn) {
        (self.chunk_pos(), self.local_column())
    }

    /// Convert to floating point Vec3
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl From<Vec3> for WorldPos {
    fn from(v: Vec3) -> Self {
        Self::new(v.x.floor() as i64, v.y.floor() as i64, v.z.floor() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_pos_chunk_local_roundtrip() {
        let world = WorldPos::new(100, -50, 200);
        let (chunk, local) = world.split();
        let corner = chunk.to_world_pos();
        assert_eq!(corner.x + i64::from(local.x), world.x);
        assert_eq!(corner.z + i64::from(local.z), world.z);
    }

    #[test]
    fn negative_world_pos_chunk() {
        let world = WorldPos::new(-1, 7, -1);
        let (chunk, local) = world.split();
        assert_eq!(chunk, ChunkPos::new(-1, -1));
        assert_eq!(local, LocalColumn::new(15, 15));
    }

    #[test]
    fn float_and_integer_chunk_lookup_agree() {
        for x in [-33, -17, -16, -1, 0, 1, 15, 16, 31, 32] {
            let from_float = ChunkPos::from_world(x as f32 + 0.5, 3.25);
            let from_int = WorldPos::new(x, 0, 3).chunk_pos();
            assert_eq!(from_float, from_int, "x = {x}");
        }
    }

    #[test]
    fn clamped_local_column() {
        assert_eq!(LocalColumn::clamped(-3, 4), LocalColumn::new(0, 4));
        assert_eq!(LocalColumn::clamped(16, 40), LocalColumn::new(15, 15));
    }

    #[test]
    fn chebyshev_distance_is_max_axis() {
        let a = ChunkPos::new(2, -1);
        assert_eq!(a.chebyshev_distance(ChunkPos::new(-1, 0)), 3);
        assert_eq!(a.chebyshev_distance(ChunkPos::new(2, 4)), 5);
        assert_eq!(a.chebyshev_distance(a), 0);
    }
}
