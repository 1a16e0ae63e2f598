//! Face-culled surface meshes built from column data.
//!
//! A cell at local `(x, y, z)` is solid iff `0 <= y <= surface(x, z)`.
//! Each solid cell emits a quad for every direction whose neighbour is not
//! solid; cells outside the chunk interior count as empty, so chunk borders
//! always carry their side walls. A second pass adds the translucent liquid
//! layer.

use glam::{Vec2, Vec3};
use strata_core::constants::{CHUNK_SIZE, MAX_HEIGHT};
use strata_core::{ChunkPos, Color};
use thiserror::Error;

use crate::chunk::{surface_level, ColumnData};
use crate::dimension::Palette;

/// Vertices per emitted face (two unindexed triangles).
pub const VERTICES_PER_FACE: usize = 6;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosZ,
    NegZ,
    PosX,
    NegX,
}

impl Face {
    pub const ALL: [Self; 6] = [
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
        Self::PosX,
        Self::NegX,
    ];

    /// The four lateral faces.
    pub const SIDES: [Self; 4] = [Self::PosZ, Self::NegZ, Self::PosX, Self::NegX];

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub const fn normal(self) -> Vec3 {
        match self {
            Self::PosY => Vec3::Y,
            Self::NegY => Vec3::NEG_Y,
            Self::PosZ => Vec3::Z,
            Self::NegZ => Vec3::NEG_Z,
            Self::PosX => Vec3::X,
            Self::NegX => Vec3::NEG_X,
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
        }
    }

    /// Corner offsets and texture coordinates of the two triangles,
    /// counter-clockwise seen from outside the cell.
    fn corners(self) -> [([f32; 3], [f32; 2]); VERTICES_PER_FACE] {
        match self {
            Self::PosY => [
                ([0.0, 1.0, 1.0], [0.0, 0.0]),
                ([1.0, 1.0, 1.0], [1.0, 0.0]),
                ([1.0, 1.0, 0.0], [1.0, 1.0]),
                ([0.0, 1.0, 1.0], [0.0, 0.0]),
                ([1.0, 1.0, 0.0], [1.0, 1.0]),
                ([0.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            Self::NegY => [
                ([0.0, 0.0, 0.0], [0.0, 0.0]),
                ([1.0, 0.0, 0.0], [1.0, 0.0]),
                ([1.0, 0.0, 1.0], [1.0, 1.0]),
                ([0.0, 0.0, 0.0], [0.0, 0.0]),
                ([1.0, 0.0, 1.0], [1.0, 1.0]),
                ([0.0, 0.0, 1.0], [0.0, 1.0]),
            ],
            Self::PosZ => [
                ([0.0, 0.0, 1.0], [0.0, 0.0]),
                ([1.0, 0.0, 1.0], [1.0, 0.0]),
                ([1.0, 1.0, 1.0], [1.0, 1.0]),
                ([0.0, 0.0, 1.0], [0.0, 0.0]),
                ([1.0, 1.0, 1.0], [1.0, 1.0]),
                ([0.0, 1.0, 1.0], [0.0, 1.0]),
            ],
            Self::NegZ => [
                ([1.0, 0.0, 0.0], [0.0, 0.0]),
                ([0.0, 0.0, 0.0], [1.0, 0.0]),
                ([0.0, 1.0, 0.0], [1.0, 1.0]),
                ([1.0, 0.0, 0.0], [0.0, 0.0]),
                ([0.0, 1.0, 0.0], [1.0, 1.0]),
                ([1.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            Self::PosX => [
                ([1.0, 0.0, 1.0], [0.0, 0.0]),
                ([1.0, 0.0, 0.0], [1.0, 0.0]),
                ([1.0, 1.0, 0.0], [1.0, 1.0]),
                ([1.0, 0.0, 1.0], [0.0, 0.0]),
                ([1.0, 1.0, 0.0], [1.0, 1.0]),
                ([1.0, 1.0, 1.0], [0.0, 1.0]),
            ],
            Self::NegX => [
                ([0.0, 0.0, 0.0], [0.0, 0.0]),
                ([0.0, 0.0, 1.0], [1.0, 0.0]),
                ([0.0, 1.0, 1.0], [1.0, 1.0]),
                ([0.0, 0.0, 0.0], [0.0, 0.0]),
                ([0.0, 1.0, 1.0], [1.0, 1.0]),
                ([0.0, 1.0, 0.0], [0.0, 1.0]),
            ],
        }
    }
}

/// Error raised while turning staged geometry into mesh buffers.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("failed to allocate mesh buffers for {vertices} vertices")]
    Allocation { vertices: usize },
}

/// Face counts of a built mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub solid_faces: usize,
    pub liquid_faces: usize,
}

/// Render-ready chunk surface: parallel, unindexed vertex arrays in world
/// space. Immutable once built; edits replace the whole mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    colors: Vec<[u8; 4]>,
    stats: MeshStats,
}

impl ChunkMesh {
    /// Vertex positions in world space, three per triangle.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex face normals.
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Per-vertex texture coordinates.
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Per-vertex RGBA colors.
    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Face counts gathered while building.
    pub fn stats(&self) -> MeshStats {
        self.stats
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Raw bytes of the position buffer, ready for upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the normal buffer.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Raw bytes of the UV buffer.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw bytes of the color buffer.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Total bytes held by all vertex buffers.
    pub fn memory_usage(&self) -> usize {
        self.position_bytes().len()
            + self.normal_bytes().len()
            + self.uv_bytes().len()
            + self.color_bytes().len()
    }
}

/// Staging buffers filled while walking the columns.
#[derive(Default)]
struct MeshBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    colors: Vec<Color>,
    stats: MeshStats,
}

impl MeshBuilder {
    fn push_face(&mut self, cell: Vec3, face: Face, color: Color) {
        let normal = face.normal();
        for (offset, uv) in face.corners() {
            self.positions.push(cell + Vec3::from_array(offset));
            self.normals.push(normal);
            self.uvs.push(Vec2::from_array(uv));
            self.colors.push(color);
        }
    }

    fn finish(self) -> Result<Option<ChunkMesh>, MeshError> {
        let vertices = self.positions.len();
        if vertices == 0 {
            return Ok(None);
        }

        let alloc_err = |_| MeshError::Allocation { vertices };
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut colors = Vec::new();
        positions.try_reserve_exact(vertices).map_err(alloc_err)?;
        normals.try_reserve_exact(vertices).map_err(alloc_err)?;
        uvs.try_reserve_exact(vertices).map_err(alloc_err)?;
        colors.try_reserve_exact(vertices).map_err(alloc_err)?;

        positions.extend(self.positions.iter().map(|p| p.to_array()));
        normals.extend(self.normals.iter().map(|n| n.to_array()));
        uvs.extend(self.uvs.iter().map(|uv| uv.to_array()));
        colors.extend(self.colors.iter().map(|c| c.to_array()));

        Ok(Some(ChunkMesh {
            positions,
            normals,
            uvs,
            colors,
            stats: self.stats,
        }))
    }
}

#[inline]
fn in_interior(x: i32, z: i32) -> bool {
    let size = CHUNK_SIZE as i32;
    (0..size).contains(&x) && (0..size).contains(&z)
}

/// Topmost solid cell of an interior column, capped at the height ceiling.
#[inline]
fn solid_top(columns: &ColumnData, x: i32, z: i32) -> Option<i32> {
    if !in_interior(x, z) {
        return None;
    }
    surface_level(columns.heights.get(x as usize, z as usize)).map(|top| top.min(MAX_HEIGHT))
}

fn is_solid(columns: &ColumnData, x: i32, y: i32, z: i32) -> bool {
    solid_top(columns, x, z).is_some_and(|top| (0..=top).contains(&y))
}

/// Half-open range of liquid cells above an interior column.
fn liquid_extent(columns: &ColumnData, x: i32, z: i32) -> Option<(i32, i32)> {
    if !in_interior(x, z) {
        return None;
    }
    let height = columns.heights.get(x as usize, z as usize);
    let depth = columns.liquid.get(x as usize, z as usize);
    if depth <= 0.0 {
        return None;
    }
    let start = surface_level(height).map_or(0, |top| top + 1);
    let end = ((height + depth).floor() as i32).min(MAX_HEIGHT + 1);
    (end > start).then_some((start, end))
}

fn is_liquid(columns: &ColumnData, x: i32, y: i32, z: i32) -> bool {
    liquid_extent(columns, x, z).is_some_and(|(start, end)| (start..end).contains(&y))
}

/// Build the mesh of one chunk.
///
/// Returns `Ok(None)` when no face is visible. This is a pure function of
/// the column data and palette.
#[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
pub fn build_chunk_mesh(
    pos: ChunkPos,
    columns: &ColumnData,
    palette: &Palette,
) -> Result<Option<ChunkMesh>, MeshError> {
    let corner = pos.to_world_pos().to_vec3();
    let size = CHUNK_SIZE as i32;
    let mut builder = MeshBuilder::default();

    for x in 0..size {
        for z in 0..size {
            let Some(top) = solid_top(columns, x, z) else {
                continue;
            };
            for y in 0..=top {
                let cell = corner + Vec3::new(x as f32, y as f32, z as f32);
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    if is_solid(columns, x + dx, y + dy, z + dz) {
                        continue;
                    }
                    let color = match face {
                        Face::PosY if y == top => palette.top,
                        Face::PosY | Face::NegY => palette.fill,
                        _ => palette.side,
                    };
                    builder.push_face(cell, face, color);
                    builder.stats.solid_faces += 1;
                }
            }
        }
    }

    for x in 0..size {
        for z in 0..size {
            let Some((start, end)) = liquid_extent(columns, x, z) else {
                continue;
            };
            for y in start..end {
                let cell = corner + Vec3::new(x as f32, y as f32, z as f32);
                if y == end - 1 {
                    builder.push_face(cell, Face::PosY, palette.liquid);
                    builder.stats.liquid_faces += 1;
                }
                for face in Face::SIDES {
                    let (dx, _, dz) = face.delta();
                    if !is_liquid(columns, x + dx, y, z + dz) {
                        builder.push_face(cell, face, palette.liquid);
                        builder.stats.liquid_faces += 1;
                    }
                }
            }
        }
    }

    builder.finish()
}
