use std::collections::HashSet;

use crate::difficulty::Aspect;
use crate::error::{SimError, SimResult};

/// Temperature engine tuning.
#[derive(Debug, Clone)]
pub struct TemperatureConfig {
    /// Minimum interval between body-temperature recomputations per player.
    pub recompute_interval_ms: u64,
    /// Lower bound of the adaptive smoothing coefficient.
    pub smoothing_min: f64,
    /// Upper bound of the adaptive smoothing coefficient.
    pub smoothing_max: f64,
    /// Maximum ambient-temperature change per update, in °C.
    pub ambient_max_step: f64,
    /// Age after which an untouched player cache entry is evicted.
    pub cache_stale_ms: u64,
    /// Interval between eviction sweeps.
    pub evict_interval_ms: u64,
    /// Comfort temperature armor insulation pulls toward, in °C.
    pub comfort: f64,
    /// How long wetness lasts without an active drying condition.
    pub wet_duration_ms: u64,
    /// Cap on the summed armor insulation factor.
    pub insulation_cap: f64,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            recompute_interval_ms: 500,
            smoothing_min: 0.5,
            smoothing_max: 0.9,
            ambient_max_step: 0.5,
            cache_stale_ms: 30_000,
            evict_interval_ms: 5_000,
            comfort: 20.0,
            wet_duration_ms: 60_000,
            insulation_cap: 0.4,
        }
    }
}

/// Wind engine tuning.
#[derive(Debug, Clone)]
pub struct WindConfig {
    /// Interval between major wind updates (reclassification, retargeting,
    /// direction rotation).
    pub major_interval_ms: u64,
    /// Exponential smoothing coefficient pulling gust strength toward its
    /// target each tick.
    pub gust_alpha: f64,
    /// Hard cap on the gust strength change per tick.
    pub max_step: f64,
    /// Maximum direction rotation per major update, in degrees.
    pub rotation_max_deg: f64,
    /// Wind strength above which moving into the wind drains stamina.
    pub drain_threshold: f64,
    /// Wind strength above which knockback gusts can occur.
    pub knockback_threshold: f64,
    /// Per-tick probability of a knockback gust above the threshold.
    pub knockback_chance: f64,
    /// Stamina drained per tick when fighting a strong headwind.
    pub headwind_drain: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            major_interval_ms: 5_000,
            gust_alpha: 0.15,
            max_step: 0.75,
            rotation_max_deg: 20.0,
            drain_threshold: 6.0,
            knockback_threshold: 10.0,
            knockback_chance: 0.05,
            headwind_drain: 0.4,
        }
    }
}

/// Stamina engine tuning.
#[derive(Debug, Clone)]
pub struct StaminaConfig {
    /// Pool capacity.
    pub max: f64,
    /// Points regenerated per tick before multipliers.
    pub regen_per_tick: f64,
    /// Configured base regeneration multiplier.
    pub base_regen_multiplier: f64,
    /// Multiplier applied to every consumption request.
    pub depletion_rate: f64,
    /// Ticks between periodic sync pushes.
    pub sync_interval_ticks: u64,
    /// Minimum change since the last transmitted value before a periodic
    /// push is sent.
    pub sync_min_delta: f64,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_per_tick: 0.5,
            base_regen_multiplier: 1.0,
            depletion_rate: 1.0,
            sync_interval_ticks: 20,
            sync_min_delta: 0.5,
        }
    }
}

/// Thirst engine tuning. All drain terms are points per tick.
#[derive(Debug, Clone)]
pub struct ThirstConfig {
    /// Pool capacity.
    pub max: f64,
    /// Multiplier applied to the summed drain each tick.
    pub depletion_rate: f64,
    /// Constant baseline drain.
    pub base_drain: f64,
    /// Additional drain while sprinting.
    pub sprint_drain: f64,
    /// Additional drain while moving.
    pub move_drain: f64,
    /// Additional drain while on fire or in lava.
    pub burn_drain: f64,
    /// Additional drain while the external hunger signal is low.
    pub hunger_drain: f64,
    /// Hunger fraction below which the hunger drain applies.
    pub hunger_threshold: f64,
    /// Body temperature above which heat drain scales in.
    pub hot_threshold: f64,
    /// Extra drain per °C above the hot threshold.
    pub hot_drain_per_degree: f64,
    /// Drain reduction in the mild-cold band (0..10 °C).
    pub cold_relief: f64,
    /// Net regeneration per tick while in or on water.
    pub water_regen: f64,
    /// Remaining fraction below which the mild dehydration tier begins.
    pub tier_mild: f64,
    /// Remaining fraction below which the heavy dehydration tier begins.
    pub tier_heavy: f64,
    /// Remaining fraction below which the critical dehydration tier begins.
    pub tier_critical: f64,
    /// Ticks between damage pulses at the critical tier.
    pub damage_interval_ticks: u64,
    /// Damage dealt per pulse at the critical tier.
    pub damage_amount: f64,
}

impl Default for ThirstConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            depletion_rate: 1.0,
            base_drain: 0.008,
            sprint_drain: 0.025,
            move_drain: 0.008,
            burn_drain: 0.05,
            hunger_drain: 0.012,
            hunger_threshold: 0.3,
            hot_threshold: 32.0,
            hot_drain_per_degree: 0.004,
            cold_relief: 0.004,
            water_regen: 0.15,
            tier_mild: 0.30,
            tier_heavy: 0.15,
            tier_critical: 0.05,
            damage_interval_ticks: 80,
            damage_amount: 1.0,
        }
    }
}

/// Difficulty scaling tuning.
#[derive(Debug, Clone)]
pub struct DifficultyConfig {
    /// Progression score weight per hour of playtime.
    pub weight_playtime: f64,
    /// Progression score weight per point of damage taken.
    pub weight_damage: f64,
    /// Progression score weight per resource gathered.
    pub weight_resources: f64,
    /// Progression score weight per death.
    pub weight_deaths: f64,
    /// Score required per scaling level.
    pub threshold_per_level: f64,
    /// Minimum simulated time between scaling adjustments.
    pub cooldown_ms: u64,
    /// Ticks between scaling checks inside the tick loop.
    pub check_interval_ticks: u64,
    /// Linear coefficient of the per-level multiplier growth.
    pub growth_base: f64,
    /// Exponent of the per-level multiplier growth (mildly super-linear).
    pub growth_exponent: f64,
    /// Aspects affected by dynamic level raises. Aspects enabled after a
    /// raise do not receive missed levels retroactively.
    pub enabled_aspects: HashSet<Aspect>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            weight_playtime: 1.0,
            weight_damage: 0.02,
            weight_resources: 0.001,
            weight_deaths: 0.5,
            threshold_per_level: 10.0,
            cooldown_ms: 300_000,
            check_interval_ticks: 100,
            growth_base: 0.04,
            growth_exponent: 1.25,
            enabled_aspects: Aspect::ALL.into_iter().collect(),
        }
    }
}

/// Outbound display sync tuning.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Ticks between periodic HUD pushes.
    pub interval_ticks: u64,
    /// Minimum change in any pushed value before a periodic push is sent.
    pub min_delta: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ticks: 40,
            min_delta: 0.5,
        }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Simulated milliseconds per tick.
    pub millis_per_tick: u64,
    /// Maximum event log size (oldest events dropped when exceeded).
    /// 0 = unlimited.
    pub max_events: usize,
    /// Temperature engine tuning.
    pub temperature: TemperatureConfig,
    /// Wind engine tuning.
    pub wind: WindConfig,
    /// Stamina engine tuning.
    pub stamina: StaminaConfig,
    /// Thirst engine tuning.
    pub thirst: ThirstConfig,
    /// Difficulty scaling tuning.
    pub difficulty: DifficultyConfig,
    /// Outbound display sync tuning.
    pub sync: SyncConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            millis_per_tick: 50,
            max_events: 1024,
            temperature: TemperatureConfig::default(),
            wind: WindConfig::default(),
            stamina: StaminaConfig::default(),
            thirst: ThirstConfig::default(),
            difficulty: DifficultyConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the simulated tick duration in milliseconds.
    pub fn with_millis_per_tick(mut self, millis: u64) -> Self {
        self.millis_per_tick = millis;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the stamina tuning.
    pub fn with_stamina(mut self, stamina: StaminaConfig) -> Self {
        self.stamina = stamina;
        self
    }

    /// Replace the thirst tuning.
    pub fn with_thirst(mut self, thirst: ThirstConfig) -> Self {
        self.thirst = thirst;
        self
    }

    /// Replace the difficulty tuning.
    pub fn with_difficulty(mut self, difficulty: DifficultyConfig) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Reject out-of-range values.
    ///
    /// Out-of-range configuration is a programming-contract violation;
    /// silently clamping it would hide caller bugs, so construction of a
    /// [`crate::Simulation`] fails instead.
    pub fn validate(&self) -> SimResult<()> {
        fn require(ok: bool, message: &str) -> SimResult<()> {
            if ok {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(message.to_string()))
            }
        }

        require(self.millis_per_tick > 0, "millis_per_tick must be positive")?;
        require(self.stamina.max > 0.0, "stamina max must be positive")?;
        require(
            self.stamina.regen_per_tick >= 0.0 && self.stamina.regen_per_tick.is_finite(),
            "stamina regen_per_tick must be finite and non-negative",
        )?;
        require(
            self.stamina.depletion_rate > 0.0,
            "stamina depletion_rate must be positive",
        )?;
        require(self.thirst.max > 0.0, "thirst max must be positive")?;
        require(
            self.thirst.depletion_rate > 0.0,
            "thirst depletion_rate must be positive",
        )?;
        require(
            self.thirst.tier_critical < self.thirst.tier_heavy
                && self.thirst.tier_heavy < self.thirst.tier_mild,
            "thirst tiers must be ordered critical < heavy < mild",
        )?;
        require(
            (0.0..=1.0).contains(&self.temperature.smoothing_min)
                && (0.0..=1.0).contains(&self.temperature.smoothing_max)
                && self.temperature.smoothing_min <= self.temperature.smoothing_max,
            "temperature smoothing bounds must satisfy 0 <= min <= max <= 1",
        )?;
        require(
            self.temperature.ambient_max_step > 0.0,
            "temperature ambient_max_step must be positive",
        )?;
        require(
            self.temperature.recompute_interval_ms > 0,
            "temperature recompute_interval_ms must be positive",
        )?;
        require(
            (0.0..=1.0).contains(&self.wind.gust_alpha),
            "wind gust_alpha must be in [0, 1]",
        )?;
        require(self.wind.max_step > 0.0, "wind max_step must be positive")?;
        require(
            (0.0..=1.0).contains(&self.wind.knockback_chance),
            "wind knockback_chance must be in [0, 1]",
        )?;
        require(
            self.difficulty.threshold_per_level > 0.0,
            "difficulty threshold_per_level must be positive",
        )?;
        require(
            self.difficulty.growth_exponent >= 1.0,
            "difficulty growth_exponent must be at least 1",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_chain() {
        let config = SimConfig::default().with_seed(7).with_max_events(64);
        assert_eq!(config.seed, 7);
        assert_eq!(config.max_events, 64);
    }

    #[test]
    fn negative_regen_is_rejected() {
        let config = SimConfig::default().with_stamina(StaminaConfig {
            regen_per_tick: -1.0,
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn misordered_thirst_tiers_are_rejected() {
        let config = SimConfig::default().with_thirst(ThirstConfig {
            tier_mild: 0.01,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_smoothing_bounds_are_rejected() {
        let config = SimConfig {
            temperature: TemperatureConfig {
                smoothing_min: 0.95,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
