use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::Vec3;
use crate::id::PlayerId;

/// Equipment slot for a piece of armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorSlot {
    /// Helmet slot.
    Head,
    /// Chestplate slot.
    Chest,
    /// Leggings slot.
    Legs,
    /// Boots slot.
    Feet,
}

impl ArmorSlot {
    /// All armor slots in display order.
    pub const ALL: [Self; 4] = [Self::Head, Self::Chest, Self::Legs, Self::Feet];
}

/// Material a piece of armor is made from.
///
/// Resolved once by the host when equipment changes; the engine never
/// inspects item display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorMaterial {
    /// Woven cloth. Light insulation.
    Cloth,
    /// Tanned hide.
    Leather,
    /// Thick animal wool.
    Wool,
    /// Heavy animal fur. Best insulation.
    Fur,
    /// Forged iron. Conducts heat, poor insulation.
    Iron,
    /// Hardened steel.
    Steel,
}

impl ArmorMaterial {
    /// Insulation factor per equipped piece, the fraction of the gap toward
    /// comfort temperature this piece closes.
    pub fn insulation(self) -> f64 {
        match self {
            Self::Fur => 0.12,
            Self::Wool => 0.09,
            Self::Leather => 0.06,
            Self::Cloth => 0.04,
            Self::Steel => 0.02,
            Self::Iron => 0.015,
        }
    }
}

/// Per-tick player input supplied by the host.
///
/// One snapshot per connected player is passed to every simulation tick.
/// All state the engines need about the player body is here; the engines
/// never call back into entity objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Stable player identifier.
    pub id: PlayerId,
    /// Current position (feet).
    pub position: Vec3,
    /// Current velocity in blocks per tick.
    pub velocity: Vec3,
    /// Whether the player is standing on solid ground.
    pub on_ground: bool,
    /// Whether the player is touching water (swimming or wading).
    pub in_water: bool,
    /// Whether the player's head is below the water surface.
    pub submerged: bool,
    /// Whether the player is inside lava.
    pub in_lava: bool,
    /// Whether the player is on fire.
    pub on_fire: bool,
    /// Whether the player is sunk into powder snow.
    pub in_powder_snow: bool,
    /// Whether the player is sprinting.
    pub sprinting: bool,
    /// Whether the player is sneaking.
    pub sneaking: bool,
    /// External hunger signal, `0.0` starving to `1.0` full.
    pub hunger: f64,
    /// Combined potion/status multiplier applied to stamina regeneration.
    pub status_regen_multiplier: f64,
    /// Equipped armor material by slot. Absent slots are empty.
    pub armor: HashMap<ArmorSlot, ArmorMaterial>,
}

impl PlayerSnapshot {
    /// A stationary, unequipped snapshot at a position. Tests and hosts
    /// start from this and set what differs.
    pub fn at(id: PlayerId, position: Vec3) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            on_ground: true,
            in_water: false,
            submerged: false,
            in_lava: false,
            on_fire: false,
            in_powder_snow: false,
            sprinting: false,
            sneaking: false,
            hunger: 1.0,
            status_regen_multiplier: 1.0,
            armor: HashMap::new(),
        }
    }

    /// Whether the player is airborne (not on ground, not in a liquid).
    pub fn airborne(&self) -> bool {
        !self.on_ground && !self.in_water && !self.in_lava
    }

    /// Whether the player is moving horizontally this tick.
    pub fn is_moving(&self) -> bool {
        self.velocity.horizontal().length() > 1e-3
    }

    /// Number of equipped armor pieces.
    pub fn armor_pieces(&self) -> usize {
        self.armor.len()
    }

    /// Sum of per-piece insulation factors over equipped armor.
    pub fn armor_insulation(&self) -> f64 {
        self.armor.values().map(|m| m.insulation()).sum()
    }
}
