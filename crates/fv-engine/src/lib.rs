//! Frostveil survival engine.
//!
//! A deterministic, tick-driven environmental survival simulation: body and
//! ambient temperature, regional wind and derived weather, stamina and
//! thirst pools, and progression-driven difficulty scaling. The engine is
//! host-agnostic: the host implements [`fv_core::WorldView`], hands the
//! engine player snapshots each tick, and drains queued display pushes and
//! wind impulses afterward.

/// Deterministic tick-based clock.
pub mod clock;
/// Engine tuning and validation.
pub mod config;
/// Per-tick context handed to each engine.
pub mod context;
/// Difficulty profiles and dynamic scaling.
pub mod difficulty;
/// Error types.
pub mod error;
/// Simulation events and the event log.
pub mod event;
/// The top-level orchestrator.
pub mod simulation;
/// Stamina pool and regeneration.
pub mod stamina;
/// Shared keyed state.
pub mod state;
/// Outbound display synchronization.
pub mod sync;
/// The engine trait.
pub mod system;
/// Temperature model.
pub mod temperature;
/// Thirst pool and dehydration tiers.
pub mod thirst;
/// Regional wind and weather.
pub mod wind;

pub use clock::SimClock;
pub use config::{
    DifficultyConfig, SimConfig, StaminaConfig, SyncConfig, TemperatureConfig, ThirstConfig,
    WindConfig,
};
pub use context::SimContext;
pub use difficulty::{
    Aspect, CustomPreset, DifficultyPreset, DifficultyProfile, DifficultySystem, MULTIPLIER_MAX,
    MULTIPLIER_MIN,
};
pub use error::{SimError, SimResult};
pub use event::{EventLog, SimEvent, SimEventKind};
pub use simulation::Simulation;
pub use stamina::StaminaSystem;
pub use state::{PlayerEnvironment, SurvivalState};
pub use sync::{DifficultySummary, DisplayPush, HudSnapshot, SyncSystem};
pub use system::System;
pub use temperature::{TEMP_MAX, TEMP_MIN, TemperatureSystem};
pub use thirst::{DehydrationTier, ThirstSystem};
pub use wind::{RegionWind, WeatherKind, WindImpulse, WindSystem};
