//! Core types for Frostveil: identifiers, geometry, and the host world interface.
//!
//! This crate defines the data that crosses the boundary between the host
//! game world and the survival simulation engine. It is independent of the
//! engine — the host supplies a [`WorldView`] implementation and a
//! [`PlayerSnapshot`] per connected player each tick, and the engine in
//! `fv-engine` does the rest.

/// In-memory world fixture for tests and host integration smoke tests.
pub mod fixture;
/// Block positions and 3-D vectors.
pub mod geom;
/// Player and world-region identifiers.
pub mod id;
/// Per-tick player input: position, motion flags, and equipment.
pub mod player;
/// Realms, biomes, blocks, and the host terrain-query trait.
pub mod world;

/// Re-export of [`fixture::FlatWorld`].
pub use fixture::FlatWorld;
/// Re-exports of [`geom::BlockPos`] and [`geom::Vec3`].
pub use geom::{BlockPos, Vec3};
/// Re-exports of [`id::PlayerId`] and [`id::RegionId`].
pub use id::{PlayerId, RegionId};
/// Re-exports of [`player::ArmorMaterial`], [`player::ArmorSlot`], and
/// [`player::PlayerSnapshot`].
pub use player::{ArmorMaterial, ArmorSlot, PlayerSnapshot};
/// Re-exports of [`world::Biome`], [`world::Block`], [`world::Realm`], and
/// [`world::WorldView`].
pub use world::{Biome, Block, Realm, WorldView};
