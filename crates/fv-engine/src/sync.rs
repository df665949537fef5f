//! Outbound display synchronization.
//!
//! The engine never talks to a network itself; it queues [`DisplayPush`]
//! values on the shared state and the host drains and transmits them.
//! Pool consumption pushes immediately from wherever it happens, while
//! this engine sends a periodic HUD snapshot, skipped when nothing moved
//! beyond the configured delta.

use std::collections::HashMap;

use fv_core::{BlockPos, PlayerId, Vec3};

use crate::config::SyncConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::system::System;

/// Difficulty state condensed for display.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DifficultySummary {
    /// Display name of the active preset.
    pub preset_name: String,
    /// Dynamic scaling level reached.
    pub scaling_level: u32,
    /// Per-aspect multipliers, indexed by [`crate::Aspect::index`].
    pub multipliers: [f64; 6],
}

/// A full HUD snapshot for one player.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HudSnapshot {
    /// The player this snapshot belongs to.
    pub player: PlayerId,
    /// Smoothed body temperature in °C.
    pub body_temperature: f64,
    /// Cached ambient temperature of the player's region in °C.
    pub ambient_temperature: f64,
    /// Temperature trend (positive = warming).
    pub trend: f64,
    /// Current stamina.
    pub stamina: f64,
    /// Stamina pool capacity.
    pub stamina_max: f64,
    /// Current thirst.
    pub thirst: f64,
    /// Thirst pool capacity.
    pub thirst_max: f64,
    /// Wind direction in the player's region.
    pub wind_direction: Vec3,
    /// Wind strength in the player's region.
    pub wind_strength: f64,
    /// Whether the region's weather counts as a storm.
    pub stormy: bool,
    /// Condensed difficulty state.
    pub difficulty: DifficultySummary,
}

/// One value push toward display consumers.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum DisplayPush {
    /// A stamina value changed enough to transmit.
    Stamina {
        /// The player whose stamina is pushed.
        player: PlayerId,
        /// The value to display.
        value: f64,
        /// The pool capacity.
        max: f64,
    },
    /// A thirst value changed enough to transmit.
    Thirst {
        /// The player whose thirst is pushed.
        player: PlayerId,
        /// The value to display.
        value: f64,
        /// The pool capacity.
        max: f64,
    },
    /// A periodic full HUD snapshot.
    Hud(HudSnapshot),
    /// A difficulty summary changed.
    Difficulty {
        /// The player whose difficulty is pushed.
        player: PlayerId,
        /// The condensed difficulty state.
        summary: DifficultySummary,
    },
    /// A critical-dehydration damage pulse the host should apply.
    DehydrationDamage {
        /// The player to damage.
        player: PlayerId,
        /// Damage to deal.
        amount: f64,
    },
}

/// Periodic HUD snapshot pushes.
#[derive(Debug)]
pub struct SyncSystem {
    config: SyncConfig,
    last_pushed: HashMap<PlayerId, (f64, f64, f64)>,
}

impl SyncSystem {
    /// Create the engine with the given tuning.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            last_pushed: HashMap::new(),
        }
    }
}

impl System for SyncSystem {
    fn name(&self) -> &str {
        "sync"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        if ctx.tick() % self.config.interval_ticks != 0 {
            return Ok(());
        }
        let players = ctx.players;
        for snap in players {
            let Some(env) = ctx.state.player_env(snap.id) else {
                continue;
            };
            let key = (env.body_temperature, env.stamina, env.thirst);
            let changed = match self.last_pushed.get(&snap.id) {
                None => true,
                Some((t, s, h)) => {
                    (t - key.0).abs() > self.config.min_delta
                        || (s - key.1).abs() > self.config.min_delta
                        || (h - key.2).abs() > self.config.min_delta
                }
            };
            if !changed {
                continue;
            }
            self.last_pushed.insert(snap.id, key);

            let pos = BlockPos::new(
                snap.position.x.floor() as i32,
                snap.position.y.floor() as i32,
                snap.position.z.floor() as i32,
            );
            let wind = ctx
                .state
                .region_wind(ctx.world.region_of(pos))
                .unwrap_or_default();
            let summary = ctx
                .state
                .profile(snap.id)
                .unwrap_or_default()
                .summary();
            let config = ctx.state.config();
            ctx.state.push_display(DisplayPush::Hud(HudSnapshot {
                player: snap.id,
                body_temperature: env.body_temperature,
                ambient_temperature: wind.cached_ambient,
                trend: env.temperature_trend,
                stamina: env.stamina,
                stamina_max: config.stamina.max,
                thirst: env.thirst,
                thirst_max: config.thirst.max,
                wind_direction: wind.direction,
                wind_strength: wind.strength(),
                stormy: wind.weather().is_stormy(),
                difficulty: summary,
            }));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_core::{FlatWorld, PlayerSnapshot};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::clock::SimClock;
    use crate::config::SimConfig;
    use crate::event::EventLog;
    use crate::state::SurvivalState;

    fn run_tick(
        system: &mut SyncSystem,
        state: &SurvivalState,
        clock: &SimClock,
        players: &[PlayerSnapshot],
    ) {
        let world = FlatWorld::new();
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut ctx = SimContext {
            world: &world,
            clock,
            state,
            events: &mut events,
            rng: &mut rng,
            players,
        };
        system.tick(&mut ctx).unwrap();
    }

    #[test]
    fn first_snapshot_is_always_pushed() {
        let mut system = SyncSystem::new(SyncConfig::default());
        let state = SurvivalState::new(SimConfig::default());
        let clock = SimClock::new(50);
        let snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        state.modify_player(snap.id, |_| {});
        run_tick(&mut system, &state, &clock, &[snap]);
        let pushes = state.drain_outbound();
        assert!(matches!(pushes[0], DisplayPush::Hud(_)));
    }

    #[test]
    fn unchanged_values_are_not_repushed() {
        let mut system = SyncSystem::new(SyncConfig::default());
        let state = SurvivalState::new(SimConfig::default());
        let clock = SimClock::new(50);
        let snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        state.modify_player(snap.id, |_| {});
        run_tick(&mut system, &state, &clock, &[snap.clone()]);
        state.drain_outbound();
        run_tick(&mut system, &state, &clock, &[snap]);
        assert!(state.drain_outbound().is_empty());
    }

    #[test]
    fn changed_values_are_repushed() {
        let mut system = SyncSystem::new(SyncConfig::default());
        let state = SurvivalState::new(SimConfig::default());
        let clock = SimClock::new(50);
        let snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        state.modify_player(snap.id, |_| {});
        run_tick(&mut system, &state, &clock, &[snap.clone()]);
        state.drain_outbound();
        state.modify_player(snap.id, |env| env.stamina = 40.0);
        run_tick(&mut system, &state, &clock, &[snap]);
        assert_eq!(state.drain_outbound().len(), 1);
    }

    #[test]
    fn hud_snapshot_serializes() {
        let snapshot = HudSnapshot {
            player: PlayerId::new(),
            body_temperature: 18.5,
            ambient_temperature: 12.0,
            trend: -0.2,
            stamina: 80.0,
            stamina_max: 100.0,
            thirst: 65.0,
            thirst_max: 100.0,
            wind_direction: Vec3::UNIT_X,
            wind_strength: 3.5,
            stormy: false,
            difficulty: DifficultySummary {
                preset_name: "normal".into(),
                scaling_level: 1,
                multipliers: [1.0; 6],
            },
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("body_temperature"));
    }
}
