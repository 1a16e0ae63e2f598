//! Core block and color types.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Unique identifier for a block type.
///
/// Block ID 0 is reserved for air (empty space). In subsurface grids air
/// marks a cell that carries no tag of its own.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct BlockId(pub u16);

impl BlockId {
    /// Air block (empty space)
    pub const AIR: Self = Self(0);
    /// Grass block
    pub const GRASS: Self = Self(1);
    /// Dirt block
    pub const DIRT: Self = Self(2);
    /// Stone block
    pub const STONE: Self = Self(3);
    /// Sand block
    pub const SAND: Self = Self(4);
    /// Water block
    pub const WATER: Self = Self(5);
    /// Ice block
    pub const ICE: Self = Self(6);
    /// Crystal block
    pub const CRYSTAL: Self = Self(7);
    /// Bedrock, the bottom layer of every column
    pub const BEDROCK: Self = Self(8);
    /// Iron ore
    pub const IRON_ORE: Self = Self(9);
    /// Gold ore
    pub const GOLD_ORE: Self = Self(10);
    /// Diamond ore
    pub const DIAMOND: Self = Self(11);

    /// Returns true if this block is air (empty)
    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this block is solid (not air)
    #[inline]
    pub const fn is_solid(self) -> bool {
        self.0 != 0
    }

    /// Human readable name, used in log output.
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "air",
            1 => "grass",
            2 => "dirt",
            3 => "stone",
            4 => "sand",
            5 => "water",
            6 => "ice",
            7 => "crystal",
            8 => "bedrock",
            9 => "iron ore",
            10 => "gold ore",
            11 => "diamond",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 8-bit RGBA color, laid out the way vertex color buffers expect it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a color with explicit alpha
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Returns true if the color is not fully opaque
    #[inline]
    pub const fn is_translucent(self) -> bool {
        self.a < 255
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
