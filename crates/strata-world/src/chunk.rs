//! Chunk data structure for column world storage.

use strata_core::constants::{COLUMN_GRID_SIZE, MAX_HEIGHT};
use strata_core::{BlockId, ChunkPos, LocalColumn};

use crate::mesh::ChunkMesh;

/// State of a chunk in the streaming pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChunkState {
    /// Created but holds no terrain yet.
    #[default]
    Empty,
    /// Submitted to the background generator.
    Pending,
    /// Column data present, no mesh reflecting it.
    Generated,
    /// Mesh reflects the current column data.
    Meshed,
}

/// A `(CHUNK_SIZE + 1)^2` grid of per-column values.
///
/// The extra row and column duplicate the first columns of the neighbouring
/// chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGrid<T> {
    cells: Vec<T>,
}

impl<T: Copy + Default> Default for ColumnGrid<T> {
    fn default() -> Self {
        Self::filled(T::default())
    }
}

impl<T: Copy> ColumnGrid<T> {
    /// Grid with every column set to `value`.
    pub fn filled(value: T) -> Self {
        Self {
            cells: vec![value; COLUMN_GRID_SIZE * COLUMN_GRID_SIZE],
        }
    }

    #[inline]
    fn index(x: usize, z: usize) -> usize {
        debug_assert!(x < COLUMN_GRID_SIZE && z < COLUMN_GRID_SIZE);
        x * COLUMN_GRID_SIZE + z
    }

    /// Value stored for column `(x, z)`.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> T {
        self.cells[Self::index(x, z)]
    }

    /// Overwrite the value stored for column `(x, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        self.cells[Self::index(x, z)] = value;
    }

    /// Value stored for a chunk-local column.
    #[inline]
    pub fn at(&self, column: LocalColumn) -> T {
        self.get(column.x as usize, column.z as usize)
    }

    /// All values in row-major `x * size + z` order.
    pub fn values(&self) -> &[T] {
        &self.cells
    }
}

/// Sparse subsurface material tags, one per cell below the surface.
///
/// Sized to the tallest column at generation time; cells outside the grid
/// read as untagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreGrid {
    layers: usize,
    cells: Vec<BlockId>,
}

impl OreGrid {
    /// Allocate an untagged grid with `layers` vertical cells per column.
    pub fn new(layers: usize) -> Self {
        Self {
            layers,
            cells: vec![BlockId::AIR; COLUMN_GRID_SIZE * layers * COLUMN_GRID_SIZE],
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        (x < COLUMN_GRID_SIZE && y < self.layers && z < COLUMN_GRID_SIZE)
            .then(|| (x * self.layers + y) * COLUMN_GRID_SIZE + z)
    }

    /// Number of vertical cells per column.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Tag at a cell, `BlockId::AIR` when untagged or out of range.
    pub fn get(&self, x: usize, y: i32, z: usize) -> BlockId {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.index(x, y, z))
            .map_or(BlockId::AIR, |i| self.cells[i])
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        if let Some(i) = self.index(x, y, z) {
            self.cells[i] = block;
        }
    }

    pub fn memory_usage(&self) -> usize {
        self.cells.len() * std::mem::size_of::<BlockId>()
    }
}

/// Everything column generation produces for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    /// Surface elevation per column.
    pub heights: ColumnGrid<f32>,
    /// Liquid depth above the surface per column (0 = dry).
    pub liquid: ColumnGrid<f32>,
    /// Subsurface material tags.
    pub ore: OreGrid,
}

impl ColumnData {
    /// Integer level of the topmost occupied cell of a column, `None` if the
    /// column holds no cells.
    #[inline]
    pub fn surface_level(&self, x: usize, z: usize) -> Option<i32> {
        surface_level(self.heights.get(x, z))
    }
}

/// Topmost occupied cell for a stored height; negative heights are hollow.
#[inline]
pub fn surface_level(height: f32) -> Option<i32> {
    (height >= 0.0).then(|| height.floor() as i32)
}

/// A single chunk of column data (16x16 columns).
pub struct Chunk {
    /// Position in chunk coordinates.
    pub pos: ChunkPos,
    state: ChunkState,
    /// Present exactly while the chunk is generated.
    columns: Option<ColumnData>,
    /// Present exactly while the chunk is meshed.
    mesh: Option<ChunkMesh>,
}

impl Chunk {
    /// Create a new empty chunk at the given position.
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            state: ChunkState::Empty,
            columns: None,
            mesh: None,
        }
    }

    /// Current state in the streaming pipeline.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_generated(&self) -> bool {
        self.columns.is_some()
    }

    pub fn is_meshed(&self) -> bool {
        self.state == ChunkState::Meshed
    }

    /// Column data, once generated.
    pub fn columns(&self) -> Option<&ColumnData> {
        self.columns.as_ref()
    }

    /// Current mesh, if one reflects the column data.
    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    /// Stored height of a column.
    pub fn height(&self, column: LocalColumn) -> Option<f32> {
        self.columns.as_ref().map(|c| c.heights.at(column))
    }

    /// Topmost occupied cell of a column.
    pub fn surface_level(&self, column: LocalColumn) -> Option<i32> {
        self.height(column).and_then(surface_level)
    }

    /// Subsurface tag of a cell. Untagged cells and cells above the surface
    /// read as `BlockId::AIR`.
    pub fn ore_at(&self, column: LocalColumn, y: i32) -> Option<BlockId> {
        let columns = self.columns.as_ref()?;
        let surface = surface_level(columns.heights.at(column))?;
        Some(if y > surface {
            BlockId::AIR
        } else {
            columns.ore.get(column.x as usize, y, column.z as usize)
        })
    }

    /// Mark an empty chunk as submitted for background generation.
    pub(crate) fn mark_pending(&mut self) {
        if self.state == ChunkState::Empty {
            self.state = ChunkState::Pending;
        }
    }

    /// Install freshly generated columns. Generation happens once: returns
    /// false and leaves the chunk untouched if it already holds data.
    pub(crate) fn install_columns(&mut self, columns: ColumnData) -> bool {
        if self.columns.is_some() {
            return false;
        }
        self.columns = Some(columns);
        self.state = ChunkState::Generated;
        true
    }

    /// Set a column height, clamped to `[0, MAX_HEIGHT]`, and drop the now
    /// stale mesh. Returns false if the chunk is not generated.
    pub(crate) fn set_height(&mut self, column: LocalColumn, height: f32) -> bool {
        let Some(columns) = self.columns.as_mut() else {
            return false;
        };
        let height = height.clamp(0.0, MAX_HEIGHT as f32);
        columns
            .heights
            .set(column.x as usize, column.z as usize, height);
        self.invalidate_mesh();
        true
    }

    /// Install the result of a mesh build. `None` (nothing visible) leaves
    /// the chunk generated but unmeshed.
    pub(crate) fn install_mesh(&mut self, mesh: Option<ChunkMesh>) {
        if self.columns.is_none() {
            return;
        }
        self.state = if mesh.is_some() {
            ChunkState::Meshed
        } else {
            ChunkState::Generated
        };
        self.mesh = mesh;
    }

    /// Release the mesh so the next update rebuilds it.
    pub(crate) fn invalidate_mesh(&mut self) {
        self.mesh = None;
        if self.state == ChunkState::Meshed {
            self.state = ChunkState::Generated;
        }
    }

    /// Drop mesh and column data, returning to `Empty`.
    pub(crate) fn reset(&mut self) {
        self.mesh = None;
        self.columns = None;
        self.state = ChunkState::Empty;
    }

    /// Get memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        let base = std::mem::size_of::<Self>();
        let columns = self.columns.as_ref().map_or(0, |c| {
            (c.heights.values().len() + c.liquid.values().len()) * std::mem::size_of::<f32>()
                + c.ore.memory_usage()
        });
        let mesh = self.mesh.as_ref().map_or(0, ChunkMesh::memory_usage);
        base + columns + mesh
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("pos", &self.pos)
            .field("state", &self.state)
            .field("mesh", &self.mesh.as_ref().map(ChunkMesh::vertex_count))
            .finish_non_exhaustive()
    }
}
