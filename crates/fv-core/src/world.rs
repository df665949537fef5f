use serde::{Deserialize, Serialize};

use crate::geom::BlockPos;
use crate::id::RegionId;

/// The realm (dimension) a world belongs to.
///
/// Alternate realms force a fixed temperature baseline instead of the full
/// surface climate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    /// The regular overworld with the full climate model.
    Surface,
    /// A molten underworld. Ambient temperature is pinned hot.
    Ember,
    /// A lightless cavern realm. Ambient temperature is pinned cool.
    Hollow,
}

impl Realm {
    /// The fixed ambient baseline for alternate realms, in degrees Celsius.
    /// `None` for [`Realm::Surface`], which uses the full model.
    pub fn fixed_baseline(self) -> Option<f64> {
        match self {
            Self::Surface => None,
            Self::Ember => Some(58.0),
            Self::Hollow => Some(8.0),
        }
    }
}

/// Climate classification of a world region.
///
/// Each biome carries a normalized climate value in `[0, 1]` (0 = frigid,
/// 1 = scorching) that the temperature engine maps into a Celsius range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Permanent snow and ice.
    Glacier,
    /// Cold conifer forest.
    Taiga,
    /// Temperate open grassland.
    Plains,
    /// Temperate broadleaf forest.
    Forest,
    /// Humid, hot rainforest.
    Jungle,
    /// Hot, dry sand desert.
    Desert,
    /// Hot grassland with sparse trees.
    Savanna,
    /// Open ocean.
    Ocean,
    /// Sandy shoreline.
    Beach,
    /// High rocky peaks.
    Highlands,
    /// Waterlogged lowlands.
    Marsh,
}

impl Biome {
    /// Normalized climate value in `[0, 1]`.
    pub fn climate(self) -> f64 {
        match self {
            Self::Glacier => 0.0,
            Self::Taiga => 0.2,
            Self::Highlands => 0.3,
            Self::Ocean => 0.45,
            Self::Plains => 0.5,
            Self::Forest => 0.55,
            Self::Beach => 0.6,
            Self::Marsh => 0.65,
            Self::Jungle => 0.8,
            Self::Savanna => 0.9,
            Self::Desert => 1.0,
        }
    }

    /// Whether this biome is open water.
    pub fn is_ocean(self) -> bool {
        matches!(self, Self::Ocean)
    }

    /// Whether this biome sits on a coast. Wind is amplified here.
    pub fn is_coastal(self) -> bool {
        self.is_ocean() || matches!(self, Self::Beach)
    }
}

/// A block of world terrain, reduced to the properties the simulation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    /// Empty space.
    Air,
    /// Generic solid terrain (stone, dirt, planks, ...).
    Solid,
    /// Still or flowing water.
    Water,
    /// Molten rock. Strong heat source and instant-override hazard.
    Lava,
    /// Burning fire block.
    Fire,
    /// A lit campfire.
    Campfire,
    /// A furnace that is currently smelting.
    LitFurnace,
    /// A torch or comparable small light source.
    Torch,
    /// Solid magma rock, warm to stand near.
    Magma,
    /// Regular ice.
    Ice,
    /// Compressed ice, colder than regular ice.
    PackedIce,
    /// A layer of snow.
    SnowLayer,
    /// Loose powder snow a player can sink into.
    PowderSnow,
    /// Tree leaves. Not solid for wind purposes but counts as cover.
    Leaves,
}

impl Block {
    /// Whether the block blocks wind and counts toward shelter.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Solid | Self::LitFurnace | Self::Magma | Self::Ice | Self::PackedIce
        )
    }

    /// Whether the block provides overhead cover without being wind-solid.
    pub fn is_cover(self) -> bool {
        self.is_solid() || matches!(self, Self::Leaves)
    }

    /// Peak warming contribution in °C for a heat-emitting block, before
    /// distance falloff. `None` for blocks that emit no heat.
    pub fn heat_emission(self) -> Option<f64> {
        match self {
            Self::Lava => Some(12.0),
            Self::Fire => Some(8.0),
            Self::Campfire => Some(7.0),
            Self::LitFurnace => Some(5.0),
            Self::Magma => Some(4.0),
            Self::Torch => Some(1.5),
            _ => None,
        }
    }

    /// Peak cooling contribution in °C for a cold-emitting block, before
    /// distance falloff. `None` for blocks that emit no cold.
    pub fn cold_emission(self) -> Option<f64> {
        match self {
            Self::PackedIce => Some(4.0),
            Self::Ice => Some(3.0),
            Self::PowderSnow => Some(3.0),
            Self::SnowLayer => Some(1.5),
            _ => None,
        }
    }

    /// Whether the block is a liquid.
    pub fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }
}

/// Read-only view of the host game world.
///
/// Implemented by the host collaborator. Positional queries return `Option`:
/// a `None` means the lookup could not be resolved this tick (for example an
/// unloaded chunk mid-teleport), and the engine skips the affected player
/// without raising.
pub trait WorldView {
    /// The realm this world belongs to.
    fn realm(&self) -> Realm;

    /// Time of day in hours, `0.0..24.0`. Solar noon is 12.0.
    fn time_of_day(&self) -> f64;

    /// Whether precipitation is currently falling anywhere in the world.
    fn is_raining(&self) -> bool;

    /// Whether a thunderstorm is active.
    fn is_thundering(&self) -> bool;

    /// The world's sea level Y coordinate, the reference altitude for
    /// temperature and wind corrections.
    fn sea_level(&self) -> i32;

    /// Biome at a position, or `None` if unresolved this tick.
    fn biome_at(&self, pos: BlockPos) -> Option<Biome>;

    /// Block at a position, or `None` if unresolved this tick.
    fn block_at(&self, pos: BlockPos) -> Option<Block>;

    /// Whether the sky is visible from a position, or `None` if unresolved.
    fn sky_visible(&self, pos: BlockPos) -> Option<bool>;

    /// The wind region containing a position.
    fn region_of(&self, pos: BlockPos) -> RegionId;
}
