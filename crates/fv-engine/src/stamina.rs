//! Stamina pool: regeneration, consumption, and periodic sync.
//!
//! The pool itself lives in [`SurvivalState`], so gameplay actions on other
//! threads can consume from it atomically. The engine only runs the passive
//! side: temperature-gated regeneration and the periodic value sync toward
//! display consumers.

use fv_core::PlayerId;

use crate::config::StaminaConfig;
use crate::context::SimContext;
use crate::difficulty::Aspect;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::state::SurvivalState;
use crate::sync::DisplayPush;
use crate::system::System;

/// Regeneration multiplier as a function of body temperature.
///
/// Comfortable temperatures regenerate faster than baseline; deep cold
/// nearly stops recovery, and severe heat halves it.
pub fn temperature_regen_multiplier(body_temperature: f64) -> f64 {
    if body_temperature < -20.0 {
        0.1
    } else if body_temperature < 0.0 {
        0.35
    } else if body_temperature < 10.0 {
        0.75
    } else if body_temperature < 32.0 {
        1.25
    } else if body_temperature < 40.0 {
        1.0
    } else {
        0.5
    }
}

impl SurvivalState {
    /// Current stamina value, if the player is tracked.
    pub fn stamina(&self, id: PlayerId) -> Option<f64> {
        self.player_env(id).map(|env| env.stamina)
    }

    /// Set a player's stamina, clamped to the pool's domain. Returns the
    /// stored value.
    pub fn set_stamina(&self, id: PlayerId, value: f64) -> SimResult<f64> {
        if !value.is_finite() {
            return Err(SimError::InvalidAmount { amount: value });
        }
        let max = self.config().stamina.max;
        Ok(self.modify_player(id, |env| {
            env.stamina = value.clamp(0.0, max);
            env.stamina
        }))
    }

    /// Attempt to consume stamina for a gameplay action. All-or-nothing:
    /// `Ok(true)` deducts the full scaled cost, `Ok(false)` leaves the pool
    /// untouched.
    ///
    /// The cost is scaled by the configured depletion rate and the player's
    /// stamina difficulty multiplier. Safe to call from any thread; the
    /// check and the deduction happen under one lock so two concurrent
    /// calls can never both succeed against an insufficient pool.
    pub fn try_consume_stamina(&self, id: PlayerId, amount: f64) -> SimResult<bool> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::InvalidAmount { amount });
        }
        // Profile lock is taken and released before the player lock.
        let multiplier = self.multiplier(id, Aspect::Stamina);
        let cost = amount * self.config().stamina.depletion_rate * multiplier;
        let max = self.config().stamina.max;
        let outcome = self.modify_player(id, |env| {
            if env.stamina < cost {
                None
            } else {
                env.stamina = (env.stamina - cost).clamp(0.0, max);
                env.last_synced_stamina = env.stamina;
                Some(env.stamina)
            }
        });
        match outcome {
            Some(value) => {
                // Consumption syncs immediately so the display never shows a
                // pool the action already spent.
                self.push_display(DisplayPush::Stamina {
                    player: id,
                    value,
                    max,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Passive stamina regeneration and periodic display sync.
#[derive(Debug)]
pub struct StaminaSystem {
    config: StaminaConfig,
}

impl StaminaSystem {
    /// Create the engine with the given tuning.
    pub fn new(config: StaminaConfig) -> Self {
        Self { config }
    }
}

impl System for StaminaSystem {
    fn name(&self) -> &str {
        "stamina"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let sync_due = ctx.tick() % self.config.sync_interval_ticks == 0;
        let players = ctx.players;
        for snap in players {
            let regen = self.config.regen_per_tick
                * self.config.base_regen_multiplier
                * snap.status_regen_multiplier;
            let max = self.config.max;
            let min_delta = self.config.sync_min_delta;
            let synced = ctx.state.modify_player(snap.id, |env| {
                let gated = regen * temperature_regen_multiplier(env.body_temperature);
                env.stamina = (env.stamina + gated).clamp(0.0, max);
                if sync_due && (env.stamina - env.last_synced_stamina).abs() > min_delta {
                    env.last_synced_stamina = env.stamina;
                    Some(env.stamina)
                } else {
                    None
                }
            });
            if let Some(value) = synced {
                ctx.state.push_display(DisplayPush::Stamina {
                    player: snap.id,
                    value,
                    max,
                });
                ctx.emit(
                    SimEventKind::StaminaSynced {
                        player: snap.id,
                        value,
                    },
                    format!("synced stamina {value:.1} for {}", snap.id),
                );
            }
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
    use fv_core::{FlatWorld, PlayerSnapshot, Vec3};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    use crate::clock::SimClock;
    use crate::config::SimConfig;
    use crate::event::EventLog;

    fn state() -> SurvivalState {
        SurvivalState::new(SimConfig::default())
    }

    #[test]
    fn consume_succeeds_and_deducts() {
        let state = state();
        let id = PlayerId::new();
        state.set_stamina(id, 10.0).unwrap();
        assert!(state.try_consume_stamina(id, 5.0).unwrap());
        assert!((state.stamina(id).unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn consume_insufficient_leaves_pool_untouched() {
        let state = state();
        let id = PlayerId::new();
        state.set_stamina(id, 3.0).unwrap();
        assert!(!state.try_consume_stamina(id, 5.0).unwrap());
        assert!((state.stamina(id).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn consume_rejects_invalid_amounts() {
        let state = state();
        let id = PlayerId::new();
        assert!(matches!(
            state.try_consume_stamina(id, -1.0),
            Err(SimError::InvalidAmount { .. })
        ));
        assert!(matches!(
            state.try_consume_stamina(id, f64::NAN),
            Err(SimError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn consume_pushes_display_immediately() {
        let state = state();
        let id = PlayerId::new();
        state.try_consume_stamina(id, 5.0).unwrap();
        let pushes = state.drain_outbound();
        assert!(matches!(
            pushes[0],
            DisplayPush::Stamina { player, .. } if player == id
        ));
    }

    #[test]
    fn difficulty_multiplier_scales_cost() {
        let state = state();
        let id = PlayerId::new();
        state.modify_profile(id, |p| p.multipliers[Aspect::Stamina.index()] = 2.0);
        state.try_consume_stamina(id, 10.0).unwrap();
        assert!((state.stamina(id).unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn concurrent_consume_never_overspends() {
        let state = Arc::new(state());
        let id = PlayerId::new();
        state.set_stamina(id, 50.0).unwrap();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let state = Arc::clone(&state);
            handles.push(std::thread::spawn(move || {
                let mut granted = 0u32;
                for _ in 0..10 {
                    if state.try_consume_stamina(id, 1.0).unwrap() {
                        granted += 1;
                    }
                }
                granted
            }));
        }
        let granted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert!(granted <= 50);
        assert!(state.stamina(id).unwrap() >= 0.0);
    }

    #[test]
    fn cold_body_regenerates_slower_than_comfortable() {
        let system_config = StaminaConfig::default();
        let mut system = StaminaSystem::new(system_config);
        let state = state();
        let world = FlatWorld::new();
        let clock = SimClock::new(50);
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(1);

        let cold = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        let comfy = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        state.modify_player(cold.id, |env| {
            env.body_temperature = -25.0;
            env.stamina = 50.0;
        });
        state.modify_player(comfy.id, |env| {
            env.body_temperature = 20.0;
            env.stamina = 50.0;
        });
        let players = vec![cold.clone(), comfy.clone()];
        let mut ctx = SimContext {
            world: &world,
            clock: &clock,
            state: &state,
            events: &mut events,
            rng: &mut rng,
            players: &players,
        };
        system.tick(&mut ctx).unwrap();
        assert!(state.stamina(cold.id).unwrap() < state.stamina(comfy.id).unwrap());
    }

    #[test]
    fn periodic_sync_skips_tiny_deltas() {
        let mut system = StaminaSystem::new(StaminaConfig::default());
        let state = state();
        let world = FlatWorld::new();
        let clock = SimClock::new(50);
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(1);
        let snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        // Full pool: regen changes nothing, so no push should go out.
        let players = vec![snap];
        let mut ctx = SimContext {
            world: &world,
            clock: &clock,
            state: &state,
            events: &mut events,
            rng: &mut rng,
            players: &players,
        };
        system.tick(&mut ctx).unwrap();
        assert!(state.drain_outbound().is_empty());
    }

    proptest! {
        // Whatever is written, the stored value stays in the pool domain.
        #[test]
        fn set_stamina_round_trips_clamped(value in -500.0f64..500.0) {
            let state = state();
            let id = PlayerId::new();
            let stored = state.set_stamina(id, value).unwrap();
            prop_assert!((0.0..=100.0).contains(&stored));
            prop_assert!((state.stamina(id).unwrap() - stored).abs() < f64::EPSILON);
        }

        // Consumption either deducts exactly the scaled cost or nothing.
        #[test]
        fn consume_is_all_or_nothing(start in 0.0f64..100.0, amount in 0.0f64..100.0) {
            let state = state();
            let id = PlayerId::new();
            state.set_stamina(id, start).unwrap();
            let before = state.stamina(id).unwrap();
            let granted = state.try_consume_stamina(id, amount).unwrap();
            let after = state.stamina(id).unwrap();
            if granted {
                prop_assert!((before - after - amount).abs() < 1e-9);
            } else {
                prop_assert!((before - after).abs() < f64::EPSILON);
            }
        }
    }
}
