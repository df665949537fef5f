//! Thirst pool and dehydration tiers.
//!
//! Hydration drains from a sum of activity and environment terms each tick,
//! and the remaining fraction maps onto dehydration tiers that carry
//! escalating penalties. Like stamina, the pool lives in [`SurvivalState`]
//! so drinking and action costs can be applied from any thread.

use fv_core::PlayerId;

use crate::config::ThirstConfig;
use crate::context::SimContext;
use crate::difficulty::Aspect;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::state::SurvivalState;
use crate::sync::DisplayPush;
use crate::system::System;

/// Dehydration severity, ordered from none to worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum DehydrationTier {
    /// No penalty.
    Hydrated,
    /// Mild penalty to movement.
    Parched,
    /// Heavy penalty to movement and mining.
    Dehydrated,
    /// Worst penalties plus periodic damage.
    Critical,
}

impl DehydrationTier {
    /// Map a remaining-hydration fraction onto a tier.
    pub fn for_fraction(fraction: f64, config: &ThirstConfig) -> Self {
        if fraction < config.tier_critical {
            Self::Critical
        } else if fraction < config.tier_heavy {
            Self::Dehydrated
        } else if fraction < config.tier_mild {
            Self::Parched
        } else {
            Self::Hydrated
        }
    }

    /// Fractional movement-speed penalty for this tier.
    pub fn movement_penalty(self) -> f64 {
        match self {
            Self::Hydrated => 0.0,
            Self::Parched => 0.1,
            Self::Dehydrated => 0.25,
            Self::Critical => 0.4,
        }
    }

    /// Fractional mining-speed penalty for this tier.
    pub fn mining_penalty(self) -> f64 {
        match self {
            Self::Hydrated | Self::Parched => 0.0,
            Self::Dehydrated => 0.25,
            Self::Critical => 0.5,
        }
    }

    /// Whether this tier deals periodic damage.
    pub fn deals_damage(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl std::fmt::Display for DehydrationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hydrated => "hydrated",
            Self::Parched => "parched",
            Self::Dehydrated => "dehydrated",
            Self::Critical => "critically dehydrated",
        };
        f.write_str(name)
    }
}

impl SurvivalState {
    /// Current thirst value, if the player is tracked.
    pub fn thirst(&self, id: PlayerId) -> Option<f64> {
        self.player_env(id).map(|env| env.thirst)
    }

    /// Set a player's thirst, clamped to the pool's domain. Returns the
    /// stored value.
    pub fn set_thirst(&self, id: PlayerId, value: f64) -> SimResult<f64> {
        if !value.is_finite() {
            return Err(SimError::InvalidAmount { amount: value });
        }
        let max = self.config().thirst.max;
        Ok(self.modify_player(id, |env| {
            env.thirst = value.clamp(0.0, max);
            env.thirst
        }))
    }

    /// Restore hydration, e.g. from drinking. Clamped at the pool maximum;
    /// the display is synced immediately.
    pub fn add_thirst(&self, id: PlayerId, amount: f64) -> SimResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::InvalidAmount { amount });
        }
        let max = self.config().thirst.max;
        let value = self.modify_player(id, |env| {
            env.thirst = (env.thirst + amount).clamp(0.0, max);
            env.thirst
        });
        self.push_display(DisplayPush::Thirst {
            player: id,
            value,
            max,
        });
        Ok(value)
    }

    /// Attempt to consume hydration for a gameplay action. All-or-nothing,
    /// with the same atomicity guarantee as stamina consumption.
    pub fn try_consume_thirst(&self, id: PlayerId, amount: f64) -> SimResult<bool> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::InvalidAmount { amount });
        }
        let multiplier = self.multiplier(id, Aspect::Thirst);
        let cost = amount * self.config().thirst.depletion_rate * multiplier;
        let max = self.config().thirst.max;
        let outcome = self.modify_player(id, |env| {
            if env.thirst < cost {
                None
            } else {
                env.thirst = (env.thirst - cost).clamp(0.0, max);
                Some(env.thirst)
            }
        });
        match outcome {
            Some(value) => {
                self.push_display(DisplayPush::Thirst {
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

/// Passive thirst drain, tier transitions, and critical damage pulses.
#[derive(Debug)]
pub struct ThirstSystem {
    config: ThirstConfig,
}

impl ThirstSystem {
    /// Create the engine with the given tuning.
    pub fn new(config: ThirstConfig) -> Self {
        Self { config }
    }

    /// The per-tick drain for a player, before the depletion rate and the
    /// difficulty multiplier. Negative means net regeneration (in water).
    ///
    /// Water contact short-circuits the additive sum: regeneration is a
    /// fixed rate, and the depletion rate and difficulty multiplier scale
    /// positive drain only. A multiplier above 1 makes thirst drain faster,
    /// never refill faster.
    fn drain_for(&self, snap: &fv_core::PlayerSnapshot, body_temperature: f64) -> f64 {
        if snap.in_water || snap.submerged {
            return -self.config.water_regen;
        }
        let mut drain = self.config.base_drain;
        if snap.sprinting {
            drain += self.config.sprint_drain;
        } else if snap.is_moving() {
            drain += self.config.move_drain;
        }
        if snap.on_fire || snap.in_lava {
            drain += self.config.burn_drain;
        }
        if snap.hunger < self.config.hunger_threshold {
            drain += self.config.hunger_drain;
        }
        if body_temperature > self.config.hot_threshold {
            drain += (body_temperature - self.config.hot_threshold) * self.config.hot_drain_per_degree;
        } else if body_temperature > 0.0 && body_temperature < 10.0 {
            drain = (drain - self.config.cold_relief).max(0.0);
        }
        drain
    }
}

impl System for ThirstSystem {
    fn name(&self) -> &str {
        "thirst"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let tick = ctx.tick();
        let players = ctx.players;
        for snap in players {
            let multiplier = ctx.state.multiplier(snap.id, Aspect::Thirst);
            let max = self.config.max;
            let config = &self.config;
            let depletion = self.config.depletion_rate;

            let (tier_change, damage_due) = ctx.state.modify_player(snap.id, |env| {
                let drain = self.drain_for(snap, env.body_temperature);
                let scaled = if drain > 0.0 {
                    drain * depletion * multiplier
                } else {
                    drain
                };
                env.thirst = (env.thirst - scaled).clamp(0.0, max);

                let tier = DehydrationTier::for_fraction(env.thirst / max, config);
                let changed = if tier != env.dehydration {
                    env.dehydration = tier;
                    Some(tier)
                } else {
                    None
                };
                let damage_due =
                    tier.deals_damage() && tick % config.damage_interval_ticks == 0;
                (changed, damage_due)
            });

            if let Some(tier) = tier_change {
                ctx.emit(
                    SimEventKind::DehydrationTierChanged {
                        player: snap.id,
                        tier,
                    },
                    format!("{} is now {tier}", snap.id),
                );
                let value = ctx.state.thirst(snap.id).unwrap_or(0.0);
                ctx.state.push_display(DisplayPush::Thirst {
                    player: snap.id,
                    value,
                    max,
                });
            }
            if damage_due {
                let amount = self.config.damage_amount;
                ctx.emit(
                    SimEventKind::DehydrationDamage {
                        player: snap.id,
                        amount,
                    },
                    format!("{} took {amount} dehydration damage", snap.id),
                );
                ctx.state.push_display(DisplayPush::DehydrationDamage {
                    player: snap.id,
                    amount,
                });
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
