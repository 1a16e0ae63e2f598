//! Dimension parameters: seed offset, water level and surface palette.
//!
//! A dimension never changes engine logic. It is passed explicitly into
//! generation and meshing, so several worlds with different dimensions can
//! coexist.

use serde::{Deserialize, Serialize};
use strata_core::{BlockId, Color, Error, Result};

/// Liquid tint used by water dimensions.
const WATER: Color = Color::rgba(30, 100, 255, 180);
/// Liquid tint used by lava dimensions.
const LAVA: Color = Color::rgba(255, 90, 20, 200);

/// Colors applied to the surface roles of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Top face of the surface cell.
    pub top: Color,
    /// All four side faces.
    pub side: Color,
    /// Faces of cells below the surface.
    pub fill: Color,
    /// Translucent liquid layer.
    pub liquid: Color,
}

impl Default for Palette {
    fn default() -> Self {
        DimensionConfig::purple().palette
    }
}

/// Configuration bundle for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionConfig {
    /// Stable identifier; also drives the default seed offset.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Offset applied to every noise lookup of this dimension.
    pub seed_offset: f64,
    /// Columns below this height are flooded up to it.
    pub water_level: f32,
    /// Surface colors.
    pub palette: Palette,
    /// Material dropped when a surface cell is removed.
    pub top_block: BlockId,
    /// Material dropped when a buried cell is removed.
    pub fill_block: BlockId,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self::purple()
    }
}

impl DimensionConfig {
    fn preset(id: u32, name: &str, water_level: f32, palette: Palette) -> Self {
        Self {
            id,
            name: name.to_string(),
            seed_offset: f64::from(id) * 1000.0,
            water_level,
            palette,
            top_block: BlockId::GRASS,
            fill_block: BlockId::DIRT,
        }
    }

    pub fn purple() -> Self {
        Self::preset(
            0,
            "Purple Dimension",
            4.0,
            Palette {
                top: Color::rgb(153, 51, 255),
                side: Color::rgb(51, 25, 0),
                fill: Color::rgb(51, 25, 0),
                liquid: WATER,
            },
        )
    }

    pub fn forest() -> Self {
        Self::preset(
            1,
            "Forest Dimension",
            5.0,
            Palette {
                top: Color::rgb(50, 200, 50),
                side: Color::rgb(101, 67, 33),
                fill: Color::rgb(139, 90, 43),
                liquid: WATER,
            },
        )
    }

    pub fn alien() -> Self {
        Self::preset(
            2,
            "Alien Dimension",
            2.0,
            Palette {
                top: Color::rgb(255, 50, 50),
                side: Color::rgb(150, 30, 30),
                fill: Color::rgb(100, 20, 20),
                liquid: LAVA,
            },
        )
    }

    pub fn desert() -> Self {
        Self {
            top_block: BlockId::SAND,
            fill_block: BlockId::SAND,
            ..Self::preset(
                3,
                "Desert Dimension",
                1.0,
                Palette {
                    top: Color::rgb(220, 180, 120),
                    side: Color::rgb(200, 160, 100),
                    fill: Color::rgb(180, 140, 80),
                    liquid: WATER,
                },
            )
        }
    }

    pub fn ice() -> Self {
        Self {
            top_block: BlockId::ICE,
            ..Self::preset(
                4,
                "Ice Dimension",
                4.0,
                Palette {
                    top: Color::rgb(200, 220, 255),
                    side: Color::rgb(180, 200, 230),
                    fill: Color::rgb(150, 170, 200),
                    liquid: Color::rgba(170, 210, 255, 200),
                },
            )
        }
    }

    pub fn volcano() -> Self {
        Self {
            top_block: BlockId::STONE,
            fill_block: BlockId::STONE,
            ..Self::preset(
                5,
                "Volcano Dimension",
                3.0,
                Palette {
                    top: Color::rgb(60, 60, 60),
                    side: Color::rgb(40, 40, 40),
                    fill: Color::rgb(30, 30, 30),
                    liquid: LAVA,
                },
            )
        }
    }

    pub fn space() -> Self {
        Self {
            top_block: BlockId::STONE,
            fill_block: BlockId::STONE,
            ..Self::preset(
                6,
                "Space Dimension",
                0.0,
                Palette {
                    top: Color::rgb(80, 80, 100),
                    side: Color::rgb(60, 60, 80),
                    fill: Color::rgb(40, 40, 60),
                    liquid: Color::rgba(10, 10, 20, 160),
                },
            )
        }
    }

    /// All built-in dimensions, ordered by id.
    pub fn presets() -> Vec<Self> {
        vec![
            Self::purple(),
            Self::forest(),
            Self::alien(),
            Self::desert(),
            Self::ice(),
            Self::volcano(),
            Self::space(),
        ]
    }

    /// Look up a built-in dimension by id.
    pub fn by_id(id: u32) -> Option<Self> {
        Self::presets().into_iter().find(|d| d.id == id)
    }

    /// Check the configuration for values generation cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.seed_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "dimension '{}' has a non-finite seed offset",
                self.name
            )));
        }
        if !self.water_level.is_finite() || self.water_level < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "dimension '{}' has invalid water level {}",
                self.name, self.water_level
            )));
        }
        if self.top_block.is_air() || self.fill_block.is_air() {
            return Err(Error::InvalidConfig(format!(
                "dimension '{}' drops air",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_unique_ids_and_offsets() {
        let presets = DimensionConfig::presets();
        assert_eq!(presets.len(), 7);
        for (i, dim) in presets.iter().enumerate() {
            assert_eq!(dim.id as usize, i);
            assert_eq!(dim.seed_offset, i as f64 * 1000.0);
            dim.validate().unwrap();
        }
    }

    #[test]
    fn liquid_is_translucent() {
        for dim in DimensionConfig::presets() {
            assert!(dim.palette.liquid.is_translucent(), "{}", dim.name);
            assert!(!dim.palette.top.is_translucent(), "{}", dim.name);
        }
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(DimensionConfig::by_id(3).unwrap().name, "Desert Dimension");
        assert!(DimensionConfig::by_id(42).is_none());
    }

    #[test]
    fn rejects_negative_water_level() {
        let dim = DimensionConfig {
            water_level: -1.0,
            ..DimensionConfig::default()
        };
        assert!(matches!(dim.validate(), Err(Error::InvalidConfig(_))));
    }
}
