//! Difficulty profiles, presets, and dynamic progression scaling.
//!
//! Every player carries a profile of per-aspect multipliers seeded from a
//! preset. A progression score accumulated from playtime, damage, gathering,
//! and deaths raises a scaling level over time, and each raise multiplies
//! the enabled aspects by a mildly super-linear factor. Profiles serialize
//! so a host can persist them across sessions.

use std::collections::HashSet;

use fv_core::PlayerId;

use crate::config::DifficultyConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::state::SurvivalState;
use crate::sync::{DifficultySummary, DisplayPush};
use crate::system::System;

/// Lower clamp for every aspect multiplier.
pub const MULTIPLIER_MIN: f64 = 0.1;
/// Upper clamp for every aspect multiplier.
pub const MULTIPLIER_MAX: f64 = 5.0;

/// A gameplay aspect a difficulty multiplier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Aspect {
    /// Cost of stamina-consuming actions.
    Stamina,
    /// Rate of hydration loss.
    Thirst,
    /// Severity of temperature effects.
    Temperature,
    /// Severity of environmental hazards.
    Hazard,
    /// Incoming damage taken.
    Damage,
    /// Hostile mob pressure.
    Mob,
}

impl Aspect {
    /// All aspects, in multiplier-array order.
    pub const ALL: [Self; 6] = [
        Self::Stamina,
        Self::Thirst,
        Self::Temperature,
        Self::Hazard,
        Self::Damage,
        Self::Mob,
    ];

    /// Index of this aspect in a profile's multiplier array.
    pub fn index(self) -> usize {
        match self {
            Self::Stamina => 0,
            Self::Thirst => 1,
            Self::Temperature => 2,
            Self::Hazard => 3,
            Self::Damage => 4,
            Self::Mob => 5,
        }
    }
}

/// A named custom preset with its own base multiplier and display color.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CustomPreset {
    /// Display name.
    pub name: String,
    /// Base multiplier applied to every aspect.
    pub multiplier: f64,
    /// Display color as RGB.
    pub color: [u8; 3],
}

/// A difficulty preset seeding all aspect multipliers.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub enum DifficultyPreset {
    /// Reduced multipliers for a relaxed game.
    Easy,
    /// Baseline multipliers.
    #[default]
    Normal,
    /// Raised multipliers.
    Hard,
    /// Strongly raised multipliers.
    Hardcore,
    /// Host-defined preset.
    Custom(CustomPreset),
}

impl DifficultyPreset {
    /// The base multiplier this preset seeds every aspect with.
    pub fn base_multiplier(&self) -> f64 {
        match self {
            Self::Easy => 0.75,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Hardcore => 2.0,
            Self::Custom(custom) => custom.multiplier.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX),
        }
    }

    /// Display name of the preset.
    pub fn name(&self) -> &str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Hardcore => "hardcore",
            Self::Custom(custom) => &custom.name,
        }
    }
}

/// Per-player difficulty profile.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DifficultyProfile {
    /// The preset currently in effect.
    pub preset: DifficultyPreset,
    /// Per-aspect multipliers, indexed by [`Aspect::index`].
    pub multipliers: [f64; 6],
    /// Total simulated playtime in milliseconds.
    pub playtime_ms: u64,
    /// Total damage taken.
    pub damage_taken: f64,
    /// Total resources gathered.
    pub resources_gathered: f64,
    /// Total deaths.
    pub deaths: u32,
    /// Dynamic scaling level reached so far.
    pub scaling_level: u32,
    /// When the last dynamic adjustment was applied; 0 = never.
    pub last_adjustment_ms: u64,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Normal,
            multipliers: [1.0; 6],
            playtime_ms: 0,
            damage_taken: 0.0,
            resources_gathered: 0.0,
            deaths: 0,
            scaling_level: 0,
            last_adjustment_ms: 0,
        }
    }
}

impl DifficultyProfile {
    /// Apply a preset, resetting every aspect multiplier to its base. The
    /// dynamic scaling level is kept but its accumulated multiplier effect
    /// is discarded.
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        let base = preset.base_multiplier();
        self.preset = preset;
        self.multipliers = [base.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX); 6];
    }

    /// The effective multiplier for an aspect, always within clamp bounds.
    pub fn multiplier(&self, aspect: Aspect) -> f64 {
        self.multipliers[aspect.index()].clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
    }

    /// Progression score from the accumulated counters.
    pub fn progression_score(&self, config: &DifficultyConfig) -> f64 {
        let hours = self.playtime_ms as f64 / 3_600_000.0;
        hours * config.weight_playtime
            + self.damage_taken * config.weight_damage
            + self.resources_gathered * config.weight_resources
            + f64::from(self.deaths) * config.weight_deaths
    }

    /// Snapshot for display consumers.
    pub fn summary(&self) -> DifficultySummary {
        DifficultySummary {
            preset_name: self.preset.name().to_string(),
            scaling_level: self.scaling_level,
            multipliers: self.multipliers,
        }
    }
}

/// The multiplier factor applied when reaching `level`. Mildly super-linear
/// so late levels bite harder than early ones.
fn level_factor(level: u32, config: &DifficultyConfig) -> f64 {
    1.0 + config.growth_base * f64::from(level).powf(config.growth_exponent)
}

impl SurvivalState {
    /// The effective difficulty multiplier for a player and aspect. Players
    /// without a profile get the neutral multiplier.
    pub fn multiplier(&self, id: PlayerId, aspect: Aspect) -> f64 {
        self.profile(id)
            .map_or(1.0, |profile| profile.multiplier(aspect))
    }

    /// Replace a player's preset, reseeding all aspect multipliers.
    pub fn set_preset(&self, id: PlayerId, preset: DifficultyPreset) {
        self.modify_profile(id, |profile| profile.apply_preset(preset));
    }

    /// Record damage taken toward the progression score.
    pub fn record_damage(&self, id: PlayerId, amount: f64) -> SimResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::InvalidAmount { amount });
        }
        self.modify_profile(id, |profile| profile.damage_taken += amount);
        Ok(())
    }

    /// Record gathered resources toward the progression score.
    pub fn record_resources(&self, id: PlayerId, amount: f64) -> SimResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(SimError::InvalidAmount { amount });
        }
        self.modify_profile(id, |profile| profile.resources_gathered += amount);
        Ok(())
    }

    /// Record a death toward the progression score.
    pub fn record_death(&self, id: PlayerId) {
        self.modify_profile(id, |profile| profile.deaths += 1);
    }

    /// Reset a player's dynamic scaling, keeping preset and counters.
    pub fn reset_scaling(&self, id: PlayerId) {
        self.modify_profile(id, |profile| {
            let base = profile.preset.base_multiplier();
            profile.scaling_level = 0;
            profile.last_adjustment_ms = 0;
            profile.multipliers = [base.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX); 6];
        });
    }

    /// Check a player's progression score against their scaling level and
    /// apply any level raises that are due.
    ///
    /// Returns one `(level, factor)` pair per raise applied. Raises after
    /// the first are gated by the adjustment cooldown; a profile that has
    /// never been adjusted is always eligible, so a brand-new player with a
    /// large imported score scales on the first check. When the score jumps
    /// several levels at once, each level's own factor is applied in turn
    /// rather than one flat factor for the jump.
    pub fn check_and_apply_dynamic_scaling(
        &self,
        id: PlayerId,
        now_ms: u64,
        config: &DifficultyConfig,
        enabled: &HashSet<Aspect>,
    ) -> Vec<(u32, f64)> {
        self.modify_profile(id, |profile| {
            if profile.last_adjustment_ms != 0
                && now_ms.saturating_sub(profile.last_adjustment_ms) < config.cooldown_ms
            {
                return Vec::new();
            }
            let score = profile.progression_score(config);
            let target = (score / config.threshold_per_level).floor() as u32;
            let mut raises = Vec::new();
            while profile.scaling_level < target {
                profile.scaling_level += 1;
                let factor = level_factor(profile.scaling_level, config);
                for aspect in enabled {
                    let slot = &mut profile.multipliers[aspect.index()];
                    *slot = (*slot * factor).clamp(MULTIPLIER_MIN, MULTIPLIER_MAX);
                }
                profile.last_adjustment_ms = now_ms.max(1);
                raises.push((profile.scaling_level, factor));
            }
            raises
        })
    }
}

/// Accrues playtime and periodically applies dynamic scaling.
#[derive(Debug)]
pub struct DifficultySystem {
    config: DifficultyConfig,
}

impl DifficultySystem {
    /// Create the engine with the given tuning.
    pub fn new(config: DifficultyConfig) -> Self {
        Self { config }
    }
}

impl System for DifficultySystem {
    fn name(&self) -> &str {
        "difficulty"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let millis = ctx.clock.millis_per_tick();
        let check_due = ctx.tick() % self.config.check_interval_ticks == 0;
        let players = ctx.players;
        for snap in players {
            ctx.state
                .modify_profile(snap.id, |profile| profile.playtime_ms += millis);
            if !check_due {
                continue;
            }
            let raises = ctx.state.check_and_apply_dynamic_scaling(
                snap.id,
                now,
                &self.config,
                &self.config.enabled_aspects,
            );
            if raises.is_empty() {
                continue;
            }
            for (level, factor) in &raises {
                ctx.emit(
                    SimEventKind::ScalingRaised {
                        player: snap.id,
                        level: *level,
                        factor: *factor,
                    },
                    format!("{} reached scaling level {level}", snap.id),
                );
            }
            if let Some(profile) = ctx.state.profile(snap.id) {
                ctx.state.push_display(DisplayPush::Difficulty {
                    player: snap.id,
                    summary: profile.summary(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::config::SimConfig;

    fn state() -> SurvivalState {
        SurvivalState::new(SimConfig::default())
    }

    #[test]
    fn presets_seed_all_aspects() {
        let mut profile = DifficultyProfile::default();
        profile.apply_preset(DifficultyPreset::Hard);
        for aspect in Aspect::ALL {
            assert!((profile.multiplier(aspect) - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn custom_preset_clamps_its_base() {
        let mut profile = DifficultyProfile::default();
        profile.apply_preset(DifficultyPreset::Custom(CustomPreset {
            name: "brutal".into(),
            multiplier: 50.0,
            color: [200, 30, 30],
        }));
        assert!((profile.multiplier(Aspect::Damage) - MULTIPLIER_MAX).abs() < 1e-9);
    }

    #[test]
    fn untracked_player_gets_neutral_multiplier() {
        let state = state();
        assert!((state.multiplier(PlayerId::new(), Aspect::Thirst) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recorders_reject_invalid_amounts() {
        let state = state();
        let id = PlayerId::new();
        assert!(state.record_damage(id, f64::INFINITY).is_err());
        assert!(state.record_resources(id, -1.0).is_err());
        assert!(state.record_damage(id, 5.0).is_ok());
    }

    #[test]
    fn zero_score_profile_stays_at_its_preset() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.set_preset(id, DifficultyPreset::Hard);
        let raises =
            state.check_and_apply_dynamic_scaling(id, 0, &config, &config.enabled_aspects);
        assert!(raises.is_empty());
        let profile = state.profile(id).unwrap();
        assert_eq!(profile.scaling_level, 0);
        for aspect in Aspect::ALL {
            assert!((profile.multiplier(aspect) - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn imported_score_scales_on_first_check() {
        // A freshly created profile with a large imported score is raised
        // immediately, cooldown notwithstanding.
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.modify_profile(id, |p| p.deaths = 100);
        let raises =
            state.check_and_apply_dynamic_scaling(id, 0, &config, &config.enabled_aspects);
        assert!(!raises.is_empty());
        assert_eq!(state.profile(id).unwrap().scaling_level, raises.len() as u32);
    }

    #[test]
    fn cooldown_gates_subsequent_raises() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.modify_profile(id, |p| p.deaths = 40);
        let first =
            state.check_and_apply_dynamic_scaling(id, 1_000, &config, &config.enabled_aspects);
        assert!(!first.is_empty());
        state.modify_profile(id, |p| p.deaths = 200);
        let gated =
            state.check_and_apply_dynamic_scaling(id, 2_000, &config, &config.enabled_aspects);
        assert!(gated.is_empty());
        let later = state.check_and_apply_dynamic_scaling(
            id,
            1_000 + config.cooldown_ms,
            &config,
            &config.enabled_aspects,
        );
        assert!(!later.is_empty());
    }

    #[test]
    fn multi_level_jump_applies_each_level_factor() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        // Score of ~35 => target level 3.
        state.modify_profile(id, |p| p.deaths = 70);
        let raises =
            state.check_and_apply_dynamic_scaling(id, 0, &config, &config.enabled_aspects);
        assert_eq!(raises.len(), 3);
        let expected: f64 = (1..=3)
            .map(|level| level_factor(level, &config))
            .product();
        let profile = state.profile(id).unwrap();
        assert!((profile.multiplier(Aspect::Damage) - expected).abs() < 1e-9);
    }

    #[test]
    fn disabled_aspects_are_untouched() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.modify_profile(id, |p| p.deaths = 40);
        let enabled: HashSet<Aspect> = [Aspect::Damage].into_iter().collect();
        state.check_and_apply_dynamic_scaling(id, 0, &config, &enabled);
        let profile = state.profile(id).unwrap();
        assert!(profile.multiplier(Aspect::Damage) > 1.0);
        assert!((profile.multiplier(Aspect::Thirst) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reset_scaling_restores_preset_base() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.set_preset(id, DifficultyPreset::Hard);
        state.modify_profile(id, |p| p.deaths = 40);
        state.check_and_apply_dynamic_scaling(id, 0, &config, &config.enabled_aspects);
        state.reset_scaling(id);
        let profile = state.profile(id).unwrap();
        assert_eq!(profile.scaling_level, 0);
        assert!((profile.multiplier(Aspect::Damage) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn profile_serde_round_trip() {
        let mut profile = DifficultyProfile::default();
        profile.apply_preset(DifficultyPreset::Custom(CustomPreset {
            name: "trek".into(),
            multiplier: 1.2,
            color: [10, 20, 30],
        }));
        profile.playtime_ms = 12_345;
        profile.scaling_level = 2;
        let json = serde_json::to_string(&profile).unwrap();
        let back: DifficultyProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }

    #[test]
    fn restored_profile_scales_on_first_check() {
        let state = state();
        let config = DifficultyConfig::default();
        let id = PlayerId::new();
        state.modify_profile(id, |p| {
            p.deaths = 50;
            p.damage_taken = 5_000.0;
        });
        let json = serde_json::to_string(&state.profile(id).unwrap()).unwrap();

        // Fresh process: the persisted profile comes back over the wire.
        let restored: DifficultyProfile = serde_json::from_str(&json).unwrap();
        let fresh = self::state();
        fresh.restore_profile(id, restored);
        assert_eq!(fresh.profile(id).unwrap().deaths, 50);
        // A never-adjusted profile carrying a large imported score is not
        // held back by the adjustment cooldown.
        let raises =
            fresh.check_and_apply_dynamic_scaling(id, 10, &config, &config.enabled_aspects);
        assert!(!raises.is_empty());
        assert!(fresh.profile(id).unwrap().scaling_level > 0);
    }

    proptest! {
        // More of any counter never lowers the progression score.
        #[test]
        fn score_is_monotone(
            playtime in 0u64..10_000_000,
            damage in 0.0f64..10_000.0,
            extra_deaths in 0u32..50,
        ) {
            let config = DifficultyConfig::default();
            let a = DifficultyProfile {
                playtime_ms: playtime,
                damage_taken: damage,
                ..Default::default()
            };
            let mut b = a.clone();
            b.deaths += extra_deaths;
            b.damage_taken += 1.0;
            prop_assert!(b.progression_score(&config) >= a.progression_score(&config));
        }

        // Multipliers stay inside the clamp bounds through any raise run.
        #[test]
        fn multipliers_stay_clamped(deaths in 0u32..10_000) {
            let state = state();
            let config = DifficultyConfig::default();
            let id = PlayerId::new();
            state.modify_profile(id, |p| p.deaths = deaths);
            state.check_and_apply_dynamic_scaling(id, 0, &config, &config.enabled_aspects);
            let profile = state.profile(id).unwrap();
            for aspect in Aspect::ALL {
                let m = profile.multiplier(aspect);
                prop_assert!((MULTIPLIER_MIN..=MULTIPLIER_MAX).contains(&m));
            }
        }
    }
}
