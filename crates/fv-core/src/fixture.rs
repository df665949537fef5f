//! An in-memory [`WorldView`] implementation.
//!
//! `FlatWorld` models a flat, single-biome world with a sparse block map
//! layered on top. Engine tests build scenarios with it; hosts can use it
//! as a reference for wiring their own adapter.

use std::collections::{HashMap, HashSet};

use crate::geom::BlockPos;
use crate::id::RegionId;
use crate::world::{Biome, Block, Realm, WorldView};

/// Horizontal extent of one wind region in blocks.
const REGION_SIZE: i32 = 512;

/// A flat in-memory world: solid ground at and below `ground_y`, air above,
/// with individual blocks overridable.
#[derive(Debug, Clone)]
pub struct FlatWorld {
    realm: Realm,
    biome: Biome,
    time_of_day: f64,
    raining: bool,
    thundering: bool,
    sea_level: i32,
    ground_y: i32,
    blocks: HashMap<BlockPos, Block>,
    /// Positions at which lookups fail, to exercise transient-failure paths.
    unresolved: HashSet<BlockPos>,
}

impl FlatWorld {
    /// A plains world at noon with ground and sea level at y = 64.
    pub fn new() -> Self {
        Self {
            realm: Realm::Surface,
            biome: Biome::Plains,
            time_of_day: 12.0,
            raining: false,
            thundering: false,
            sea_level: 64,
            ground_y: 64,
            blocks: HashMap::new(),
            unresolved: HashSet::new(),
        }
    }

    /// Set the realm.
    pub fn with_realm(mut self, realm: Realm) -> Self {
        self.realm = realm;
        self
    }

    /// Set the single biome the world reports everywhere.
    pub fn with_biome(mut self, biome: Biome) -> Self {
        self.biome = biome;
        self
    }

    /// Set the time of day in hours.
    pub fn with_time(mut self, hours: f64) -> Self {
        self.time_of_day = hours;
        self
    }

    /// Set the precipitation and storm flags.
    pub fn with_weather(mut self, raining: bool, thundering: bool) -> Self {
        self.raining = raining;
        self.thundering = thundering;
        self
    }

    /// Change the time of day in place.
    pub fn set_time(&mut self, hours: f64) {
        self.time_of_day = hours;
    }

    /// Change the weather flags in place.
    pub fn set_weather(&mut self, raining: bool, thundering: bool) {
        self.raining = raining;
        self.thundering = thundering;
    }

    /// Place a block, overriding the flat terrain.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) {
        self.blocks.insert(pos, block);
    }

    /// Fill a cuboid with a block.
    pub fn fill(&mut self, min: BlockPos, max: BlockPos, block: Block) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_block(BlockPos::new(x, y, z), block);
                }
            }
        }
    }

    /// Mark a position as unresolvable, making positional queries there
    /// return `None`.
    pub fn poison(&mut self, pos: BlockPos) {
        self.unresolved.insert(pos);
    }
}

impl Default for FlatWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldView for FlatWorld {
    fn realm(&self) -> Realm {
        self.realm
    }

    fn time_of_day(&self) -> f64 {
        self.time_of_day
    }

    fn is_raining(&self) -> bool {
        self.raining
    }

    fn is_thundering(&self) -> bool {
        self.thundering
    }

    fn sea_level(&self) -> i32 {
        self.sea_level
    }

    fn biome_at(&self, pos: BlockPos) -> Option<Biome> {
        if self.unresolved.contains(&pos) {
            return None;
        }
        Some(self.biome)
    }

    fn block_at(&self, pos: BlockPos) -> Option<Block> {
        if self.unresolved.contains(&pos) {
            return None;
        }
        if let Some(block) = self.blocks.get(&pos) {
            return Some(*block);
        }
        if pos.y <= self.ground_y {
            Some(Block::Solid)
        } else {
            Some(Block::Air)
        }
    }

    fn sky_visible(&self, pos: BlockPos) -> Option<bool> {
        if self.unresolved.contains(&pos) {
            return None;
        }
        // Visible unless any placed block covers the column above.
        let covered = self
            .blocks
            .iter()
            .any(|(p, b)| p.x == pos.x && p.z == pos.z && p.y > pos.y && b.is_cover());
        Some(!covered && pos.y > self.ground_y)
    }

    fn region_of(&self, pos: BlockPos) -> RegionId {
        RegionId::new(pos.x.div_euclid(REGION_SIZE), pos.z.div_euclid(REGION_SIZE))
    }
}
