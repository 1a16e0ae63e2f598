//! Core types, coordinates, and errors for the Strata terrain engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - Block identifiers and palette colors
//! - Coordinate systems (world, chunk, local column)
//! - Ray math for picking
//! - Common error types

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::{ChunkPos, LocalColumn, WorldPos};
pub use error::{Error, Result};
pub use types::{BlockId, Color};

/// Engine-wide constants
pub mod constants {
    /// Edge length of a chunk in columns
    pub const CHUNK_SIZE: usize = 16;
    /// Bits needed to represent a column offset within a chunk (4 bits for 0-15)
    pub const CHUNK_BITS: u32 = 4;
    /// Side length of the per-chunk column grids. One extra column overlaps
    /// the next chunk's first column so neighbouring surfaces line up.
    pub const COLUMN_GRID_SIZE: usize = CHUNK_SIZE + 1;
    /// Highest supported column height; placements above it are rejected.
    pub const MAX_HEIGHT: i32 = 100;
}
