//! Chunked heightfield terrain for the Strata engine: generation,
//! streaming, meshing, editing and queries.

pub mod chunk;
pub mod chunk_store;
pub mod dimension;
pub mod edit;
pub mod generation;
pub mod mesh;
pub mod noise_field;
pub mod query;
pub mod raycast;
pub mod streaming;
pub mod world;

pub use chunk::{Chunk, ChunkState, ColumnData};
pub use chunk_store::ChunkStore;
pub use dimension::{DimensionConfig, Palette};
pub use edit::EditError;
pub use generation::{TerrainConfig, TerrainGenerator};
pub use mesh::{build_chunk_mesh, ChunkMesh, MeshError, MeshStats};
pub use query::Occupancy;
pub use world::{World, WorldConfig, WorldUpdate};

/// World seed for procedural generation.
pub type WorldSeed = u32;
