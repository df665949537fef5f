//! Shared keyed simulation state.
//!
//! All per-player and per-region records live in [`SurvivalState`], an
//! explicitly owned object passed to every engine through the tick context.
//! The maps are lock-protected because administrative and network-receive
//! code paths (an inbound action consuming stamina, a command querying a
//! profile) may run on different threads than the tick loop.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use fv_core::{PlayerId, RegionId};

use crate::config::SimConfig;
use crate::difficulty::DifficultyProfile;
use crate::sync::DisplayPush;
use crate::thirst::DehydrationTier;
use crate::wind::{RegionWind, WindImpulse};

/// Per-player environment record.
///
/// Bounded quantities are clamped to their domain on every write; consumers
/// never observe a value outside range.
#[derive(Debug, Clone, Copy)]
pub struct PlayerEnvironment {
    /// Smoothed body temperature in °C.
    pub body_temperature: f64,
    /// When the body temperature was last recomputed, if ever.
    pub last_computed_ms: Option<u64>,
    /// Delta between the two most recent smoothed samples.
    pub temperature_trend: f64,
    /// Until when the player counts as wet. Wetness caps heat retention.
    pub wet_until: Option<u64>,
    /// Current stamina pool value.
    pub stamina: f64,
    /// Stamina value most recently transmitted to display consumers.
    pub last_synced_stamina: f64,
    /// Current thirst (hydration) pool value.
    pub thirst: f64,
    /// Dehydration tier currently in effect.
    pub dehydration: DehydrationTier,
}

impl PlayerEnvironment {
    fn new(config: &SimConfig) -> Self {
        Self {
            body_temperature: config.temperature.comfort,
            last_computed_ms: None,
            temperature_trend: 0.0,
            wet_until: None,
            stamina: config.stamina.max,
            last_synced_stamina: config.stamina.max,
            thirst: config.thirst.max,
            dehydration: DehydrationTier::Hydrated,
        }
    }

    /// Whether the player counts as wet at the given time.
    pub fn is_wet(&self, now_ms: u64) -> bool {
        self.wet_until.is_some_and(|until| now_ms < until)
    }
}

/// Shared, concurrency-safe keyed state for the whole simulation.
///
/// Player and profile entries are created lazily on first observation and
/// removed on disconnect; region entries live for the process lifetime.
/// All accessors take `&self` and may be called from any thread.
#[derive(Debug)]
pub struct SurvivalState {
    config: SimConfig,
    players: RwLock<HashMap<PlayerId, PlayerEnvironment>>,
    regions: RwLock<HashMap<RegionId, RegionWind>>,
    profiles: RwLock<HashMap<PlayerId, DifficultyProfile>>,
    outbound: Mutex<Vec<DisplayPush>>,
    impulses: Mutex<Vec<WindImpulse>>,
}

impl SurvivalState {
    /// Create empty state with the given configuration.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            players: RwLock::new(HashMap::new()),
            regions: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            outbound: Mutex::new(Vec::new()),
            impulses: Mutex::new(Vec::new()),
        }
    }

    /// The configuration this state was created with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Snapshot of a player's environment record, if tracked.
    pub fn player_env(&self, id: PlayerId) -> Option<PlayerEnvironment> {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Run a closure against a player's record, creating it on first
    /// observation. Returns the closure's result.
    ///
    /// The closure runs under the map's write lock, making read-modify-write
    /// sequences atomic with respect to concurrent callers.
    pub fn modify_player<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut PlayerEnvironment) -> R,
    ) -> R {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let env = players
            .entry(id)
            .or_insert_with(|| PlayerEnvironment::new(&self.config));
        f(env)
    }

    /// Drop all state for a disconnected player.
    pub fn remove_player(&self, id: PlayerId) {
        self.players
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Number of tracked players.
    pub fn player_count(&self) -> usize {
        self.players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Evict player records whose temperature cache has gone stale.
    ///
    /// `connected` names the players present in the current tick; their
    /// records are never evicted, even with a stale cache timestamp. The
    /// environment record also holds the stamina and thirst pools, so
    /// evicting a connected player (say, mid-teleport with their chunk
    /// unloaded) would recreate the record at full pools. Returns the
    /// evicted player ids. Difficulty profiles are kept: a collaborator may
    /// still persist them after the player left.
    pub fn evict_stale_players(
        &self,
        now_ms: u64,
        stale_ms: u64,
        connected: &[PlayerId],
    ) -> Vec<PlayerId> {
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<PlayerId> = players
            .iter()
            .filter(|(id, env)| {
                !connected.contains(id)
                    && env
                        .last_computed_ms
                        .is_some_and(|t| now_ms.saturating_sub(t) > stale_ms)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            players.remove(id);
        }
        stale
    }

    /// Snapshot of a region's wind record, if tracked.
    pub fn region_wind(&self, id: RegionId) -> Option<RegionWind> {
        self.regions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }

    /// Run a closure against a region's wind record, creating it lazily.
    pub fn modify_region<R>(&self, id: RegionId, f: impl FnOnce(&mut RegionWind) -> R) -> R {
        let mut regions = self.regions.write().unwrap_or_else(PoisonError::into_inner);
        let wind = regions.entry(id).or_default();
        f(wind)
    }

    /// Snapshot of a player's difficulty profile, if tracked.
    pub fn profile(&self, id: PlayerId) -> Option<DifficultyProfile> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Run a closure against a player's profile, creating a default profile
    /// on first observation.
    pub fn modify_profile<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut DifficultyProfile) -> R,
    ) -> R {
        let mut profiles = self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let profile = profiles.entry(id).or_default();
        f(profile)
    }

    /// Install a previously persisted profile, replacing any tracked one.
    pub fn restore_profile(&self, id: PlayerId, profile: DifficultyProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, profile);
    }

    /// Queue a value push for display consumers. Callable from any thread.
    pub fn push_display(&self, push: DisplayPush) {
        self.outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(push);
    }

    /// Take all queued display pushes. The host transmits these however it
    /// likes; the engine only specifies the data.
    pub fn drain_outbound(&self) -> Vec<DisplayPush> {
        std::mem::take(
            &mut *self
                .outbound
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Queue a wind impulse for the host to apply to a player body.
    pub fn push_impulse(&self, impulse: WindImpulse) {
        self.impulses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(impulse);
    }

    /// Take all queued wind impulses.
    pub fn drain_impulses(&self) -> Vec<WindImpulse> {
        std::mem::take(
            &mut *self
                .impulses
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_records_are_created_lazily() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        assert!(state.player_env(id).is_none());
        state.modify_player(id, |_| {});
        let env = state.player_env(id).unwrap();
        assert!((env.stamina - 100.0).abs() < f64::EPSILON);
        assert!((env.thirst - 100.0).abs() < f64::EPSILON);
        assert!(env.last_computed_ms.is_none());
    }

    #[test]
    fn remove_player_drops_env_and_profile() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        state.modify_player(id, |_| {});
        state.modify_profile(id, |_| {});
        state.remove_player(id);
        assert!(state.player_env(id).is_none());
        assert!(state.profile(id).is_none());
    }

    #[test]
    fn stale_players_are_evicted_but_profiles_kept() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        state.modify_player(id, |env| env.last_computed_ms = Some(0));
        state.modify_profile(id, |_| {});
        let evicted = state.evict_stale_players(60_000, 30_000, &[]);
        assert_eq!(evicted, vec![id]);
        assert!(state.player_env(id).is_none());
        assert!(state.profile(id).is_some());
    }

    #[test]
    fn fresh_players_survive_eviction() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        state.modify_player(id, |env| env.last_computed_ms = Some(55_000));
        assert!(state.evict_stale_players(60_000, 30_000, &[]).is_empty());
        assert!(state.player_env(id).is_some());
    }

    #[test]
    fn connected_players_keep_pools_through_eviction() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        // Stale cache timestamp, but the player is still in the roster.
        state.modify_player(id, |env| {
            env.last_computed_ms = Some(0);
            env.thirst = 20.0;
            env.stamina = 35.0;
        });
        assert!(state.evict_stale_players(60_000, 30_000, &[id]).is_empty());
        let env = state.player_env(id).unwrap();
        assert!((env.thirst - 20.0).abs() < f64::EPSILON);
        assert!((env.stamina - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wetness_expires() {
        let state = SurvivalState::new(SimConfig::default());
        let id = PlayerId::new();
        state.modify_player(id, |env| env.wet_until = Some(1_000));
        let env = state.player_env(id).unwrap();
        assert!(env.is_wet(500));
        assert!(!env.is_wet(1_000));
    }

    #[test]
    fn outbound_queue_drains_once() {
        let state = SurvivalState::new(SimConfig::default());
        state.push_display(DisplayPush::Stamina {
            player: PlayerId::new(),
            value: 50.0,
            max: 100.0,
        });
        assert_eq!(state.drain_outbound().len(), 1);
        assert!(state.drain_outbound().is_empty());
    }
}
