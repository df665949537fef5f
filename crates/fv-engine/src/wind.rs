//! Regional wind and derived weather.
//!
//! Each region carries a wind record: a horizontal direction, a base
//! strength sampled from the current weather kind's band, and a gust
//! component that chases a target with bounded per-tick steps. The weather
//! kind itself is derived deterministically from host precipitation flags
//! plus the region's cached ambient temperature, so a cold rain becomes a
//! blizzard without any extra host input.

use fv_core::{Block, BlockPos, PlayerId, PlayerSnapshot, Vec3, WorldView};

use crate::config::WindConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::system::System;

/// Derived weather kind for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WeatherKind {
    /// Calm, mild conditions.
    Clear,
    /// Cold, still air with low visibility.
    Foggy,
    /// Extreme heat, almost windless.
    Heatwave,
    /// Ordinary rainfall.
    Rain,
    /// Strong wind without precipitation.
    Windy,
    /// Hot dry wind carrying dust.
    DustStorm,
    /// Rain with lightning and violent wind.
    Thunderstorm,
    /// Freezing storm, the strongest wind band.
    Blizzard,
}

impl WeatherKind {
    /// Derive the weather kind from host precipitation flags and the
    /// region's cached ambient temperature. Same inputs, same answer.
    pub fn classify(raining: bool, thundering: bool, ambient: f64) -> Self {
        if thundering || raining {
            return if ambient <= 0.0 {
                Self::Blizzard
            } else if thundering {
                Self::Thunderstorm
            } else {
                Self::Rain
            };
        }
        if ambient >= 40.0 {
            Self::Heatwave
        } else if ambient >= 33.0 {
            Self::DustStorm
        } else if ambient <= -12.0 {
            Self::Foggy
        } else if ambient <= -2.0 {
            Self::Windy
        } else {
            Self::Clear
        }
    }

    /// Inclusive strength band (in arbitrary wind units) for this kind.
    pub fn strength_range(self) -> (f64, f64) {
        match self {
            Self::Clear => (0.0, 2.0),
            Self::Foggy => (0.0, 1.5),
            Self::Heatwave => (0.0, 1.0),
            Self::Rain => (2.0, 5.0),
            Self::Windy => (4.0, 8.0),
            Self::DustStorm => (6.0, 11.0),
            Self::Thunderstorm => (6.0, 12.0),
            Self::Blizzard => (8.0, 14.0),
        }
    }

    /// Whether this kind counts as a storm for display purposes.
    pub fn is_stormy(self) -> bool {
        matches!(self, Self::DustStorm | Self::Thunderstorm | Self::Blizzard)
    }

    /// How strongly wind of this kind chills an exposed player.
    pub fn chill_factor(self) -> f64 {
        match self {
            Self::Clear | Self::Foggy => 1.0,
            Self::Heatwave => 0.2,
            Self::Rain => 1.15,
            Self::Windy => 1.2,
            Self::DustStorm => 0.8,
            Self::Thunderstorm => 1.3,
            Self::Blizzard => 1.6,
        }
    }
}

impl std::fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Clear => "clear",
            Self::Foggy => "foggy",
            Self::Heatwave => "heatwave",
            Self::Rain => "rain",
            Self::Windy => "windy",
            Self::DustStorm => "dust storm",
            Self::Thunderstorm => "thunderstorm",
            Self::Blizzard => "blizzard",
        };
        f.write_str(name)
    }
}

/// Per-region wind record.
#[derive(Debug, Clone, Copy)]
pub struct RegionWind {
    /// Unit horizontal direction the wind blows toward.
    pub direction: Vec3,
    /// Base strength sampled from the weather kind's band.
    pub base_strength: f64,
    /// Target the gust component is chasing.
    pub gust_target: f64,
    /// Current gust component, stepped toward the target each tick.
    pub gust_strength: f64,
    /// Weather kind derived at the last major update.
    pub weather: WeatherKind,
    /// Administrative override; `None` means derived weather applies.
    pub weather_override: Option<WeatherKind>,
    /// Smoothed ambient temperature for this region, in °C.
    pub cached_ambient: f64,
    /// Whether `cached_ambient` has received its first sample.
    pub ambient_initialized: bool,
    /// When the last major update ran, if ever.
    pub last_major_ms: Option<u64>,
}

impl Default for RegionWind {
    fn default() -> Self {
        Self {
            direction: Vec3::UNIT_X,
            base_strength: 0.0,
            gust_target: 0.0,
            gust_strength: 0.0,
            weather: WeatherKind::Clear,
            weather_override: None,
            cached_ambient: 15.0,
            ambient_initialized: false,
            last_major_ms: None,
        }
    }
}

impl RegionWind {
    /// Total wind strength, never negative.
    pub fn strength(&self) -> f64 {
        (self.base_strength + self.gust_strength).max(0.0)
    }

    /// The weather kind in effect, honoring any override.
    pub fn weather(&self) -> WeatherKind {
        self.weather_override.unwrap_or(self.weather)
    }
}

/// A velocity impulse the host should apply to a player body.
#[derive(Debug, Clone, Copy)]
pub struct WindImpulse {
    /// The player to push.
    pub player: PlayerId,
    /// The velocity delta to apply.
    pub velocity: Vec3,
    /// Whether this impulse includes a gust knockback burst.
    pub knockback: bool,
}

/// Drives regional wind state and applies wind effects to players.
#[derive(Debug)]
pub struct WindSystem {
    config: WindConfig,
}

impl WindSystem {
    /// Create the engine with the given tuning.
    pub fn new(config: WindConfig) -> Self {
        Self { config }
    }

    /// Terrain-adjusted wind force vector at a position.
    ///
    /// `None` if a required world lookup fails.
    pub fn force_at(
        world: &dyn WorldView,
        wind: &RegionWind,
        pos: BlockPos,
    ) -> Option<Vec3> {
        let biome = world.biome_at(pos)?;
        let sea = world.sea_level();
        let mut magnitude = wind.strength();

        let dy = pos.y - sea;
        if dy > 0 {
            magnitude *= (1.0 + f64::from(dy) * 0.008).min(1.8);
        } else if dy < 0 {
            magnitude *= 0.6;
        }
        if biome.is_coastal() {
            magnitude *= 1.25;
        }

        // Exposure: open air above and around raises the force; never fully
        // zero so enclosed spaces still get drafts.
        let mut open_above = 0u32;
        let mut roofed = false;
        for step in 1..=6 {
            let block = world.block_at(pos.offset(0, step, 0));
            if block.is_some_and(Block::is_cover) {
                if step <= 4 {
                    roofed = true;
                }
            } else {
                open_above += 1;
            }
        }
        let ring = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        let mut open_sides = 0u32;
        for (dx, dz) in ring {
            if !world
                .block_at(pos.offset(dx, 1, dz))
                .is_some_and(Block::is_solid)
            {
                open_sides += 1;
            }
        }
        let exposure = 0.15
            + 0.85 * (0.5 * f64::from(open_above) / 6.0 + 0.5 * f64::from(open_sides) / 8.0);
        magnitude *= exposure;
        if roofed {
            magnitude *= 0.4;
        }

        // Upwind obstructions shadow the position.
        let dir = wind.direction.normalized();
        for step in 1..=3 {
            let s = f64::from(step);
            let upwind = BlockPos::new(
                (f64::from(pos.x) - dir.x * s).round() as i32,
                pos.y + 1,
                (f64::from(pos.z) - dir.z * s).round() as i32,
            );
            if world.block_at(upwind).is_some_and(Block::is_solid) {
                magnitude *= 0.75;
            }
        }

        // Canyon funneling: solid walls on both sides perpendicular to the
        // wind accelerate it.
        let perp = dir.rotated_y(std::f64::consts::FRAC_PI_2);
        let side_a = BlockPos::new(
            (f64::from(pos.x) + perp.x * 2.0).round() as i32,
            pos.y + 1,
            (f64::from(pos.z) + perp.z * 2.0).round() as i32,
        );
        let side_b = BlockPos::new(
            (f64::from(pos.x) - perp.x * 2.0).round() as i32,
            pos.y + 1,
            (f64::from(pos.z) - perp.z * 2.0).round() as i32,
        );
        if world.block_at(side_a).is_some_and(Block::is_solid)
            && world.block_at(side_b).is_some_and(Block::is_solid)
        {
            magnitude *= 1.3;
        }

        let mut force = dir.scaled(magnitude);

        // Thermal draft from heat directly below.
        let mut draft = 0.0;
        for below in 1..=2 {
            if let Some(peak) = world
                .block_at(pos.offset(0, -below, 0))
                .and_then(Block::heat_emission)
            {
                draft += peak * 0.1;
            }
        }
        force.y += draft.clamp(-1.0, 1.0);

        if !(force.x.is_finite() && force.y.is_finite() && force.z.is_finite()) {
            return Some(Vec3::ZERO);
        }
        Some(force)
    }

    /// The velocity impulse the force produces on a player, accounting for
    /// stance and armor drag. Callers gate on exposure before calling.
    pub fn impulse_from(&self, snap: &PlayerSnapshot, force: Vec3) -> Vec3 {
        let stance = if snap.airborne() {
            1.8
        } else if snap.sneaking {
            0.5
        } else if snap.sprinting {
            1.1
        } else {
            1.0
        };
        let drag = 0.92f64.powi(snap.armor_pieces() as i32);
        force.scaled(0.01 * stance * drag)
    }

    fn run_major_update(
        &self,
        ctx: &mut SimContext<'_>,
        region: fv_core::RegionId,
        now: u64,
    ) -> RegionWind {
        use rand::Rng;

        let mut wind = ctx.state.modify_region(region, |r| *r);
        let due = wind
            .last_major_ms
            .is_none_or(|t| now.saturating_sub(t) >= self.config.major_interval_ms);
        if due {
            let derived = WeatherKind::classify(
                ctx.world.is_raining(),
                ctx.world.is_thundering(),
                wind.cached_ambient,
            );
            if derived != wind.weather && wind.weather_override.is_none() {
                ctx.emit(
                    SimEventKind::WeatherShifted {
                        region,
                        from: wind.weather,
                        to: derived,
                    },
                    format!("weather in {region} shifted from {} to {derived}", wind.weather),
                );
            }
            wind.weather = derived;

            let (lo, hi) = wind.weather().strength_range();
            wind.base_strength = ctx.rng.random_range(lo..=hi);
            wind.gust_target = ctx.rng.random_range(0.0..=(hi - lo).max(0.5));
            let max_rad = self.config.rotation_max_deg.to_radians();
            let angle = ctx.rng.random_range(-max_rad..=max_rad);
            wind.direction = wind.direction.rotated_y(angle).normalized();
            wind.last_major_ms = Some(now);
        }

        // Gust chases its target with a bounded step every tick, so strength
        // never jumps more than `max_step` between consecutive reads.
        let step = (self.config.gust_alpha * (wind.gust_target - wind.gust_strength))
            .clamp(-self.config.max_step, self.config.max_step);
        wind.gust_strength += step;

        ctx.state.modify_region(region, |r| *r = wind);
        wind
    }

    fn apply_to_player(
        &self,
        ctx: &mut SimContext<'_>,
        snap: &PlayerSnapshot,
        wind: &RegionWind,
    ) {
        use rand::Rng;

        let pos = BlockPos::new(
            snap.position.x.floor() as i32,
            snap.position.y.floor() as i32,
            snap.position.z.floor() as i32,
        );
        let Some(exposed) = ctx.world.sky_visible(pos.offset(0, 1, 0)) else {
            return;
        };
        if !exposed || snap.submerged {
            return;
        }
        let Some(force) = Self::force_at(ctx.world, wind, pos) else {
            return;
        };

        let mut impulse = self.impulse_from(snap, force);
        let strength = wind.strength();
        let mut knockback = false;

        if strength >= self.config.knockback_threshold
            && ctx.rng.random_range(0.0..1.0) < self.config.knockback_chance
        {
            impulse = impulse.plus(wind.direction.scaled(0.3));
            knockback = true;
            ctx.emit(
                SimEventKind::GustKnockback {
                    player: snap.id,
                    strength,
                },
                format!("{} was knocked back by a gust", snap.id),
            );
        }

        if impulse.length() > 1e-6 {
            ctx.state.push_impulse(WindImpulse {
                player: snap.id,
                velocity: impulse,
                knockback,
            });
        }

        // Fighting a headwind is tiring.
        if strength >= self.config.drain_threshold
            && snap.velocity.horizontal().dot(wind.direction) < -0.1
        {
            let drain = self.config.headwind_drain * strength / self.config.drain_threshold;
            ctx.state.modify_player(snap.id, |env| {
                env.stamina = (env.stamina - drain).max(0.0);
            });
        }
    }
}

impl System for WindSystem {
    fn name(&self) -> &str {
        "wind"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let players = ctx.players;

        let mut regions = Vec::new();
        for snap in players {
            let pos = BlockPos::new(
                snap.position.x.floor() as i32,
                snap.position.y.floor() as i32,
                snap.position.z.floor() as i32,
            );
            let region = ctx.world.region_of(pos);
            if !regions.contains(&region) {
                regions.push(region);
            }
        }

        for region in &regions {
            let wind = self.run_major_update(ctx, *region, now);
            for snap in players {
                let pos = BlockPos::new(
                    snap.position.x.floor() as i32,
                    snap.position.y.floor() as i32,
                    snap.position.z.floor() as i32,
                );
                if ctx.world.region_of(pos) == *region {
                    self.apply_to_player(ctx, snap, &wind);
                }
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
    use fv_core::{FlatWorld, RegionId};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::clock::SimClock;
    use crate::config::SimConfig;
    use crate::event::EventLog;
    use crate::state::SurvivalState;

    fn harness<'a>(
        world: &'a FlatWorld,
        clock: &'a SimClock,
        state: &'a SurvivalState,
        events: &'a mut EventLog,
        rng: &'a mut StdRng,
        players: &'a [PlayerSnapshot],
    ) -> SimContext<'a> {
        SimContext {
            world,
            clock,
            state,
            events,
            rng,
            players,
        }
    }

    #[test]
    fn classification_is_deterministic() {
        assert_eq!(WeatherKind::classify(false, false, 20.0), WeatherKind::Clear);
        assert_eq!(WeatherKind::classify(true, false, 12.0), WeatherKind::Rain);
        assert_eq!(
            WeatherKind::classify(true, true, 12.0),
            WeatherKind::Thunderstorm
        );
        assert_eq!(
            WeatherKind::classify(true, false, -5.0),
            WeatherKind::Blizzard
        );
        assert_eq!(
            WeatherKind::classify(true, true, -5.0),
            WeatherKind::Blizzard
        );
        assert_eq!(
            WeatherKind::classify(false, false, 45.0),
            WeatherKind::Heatwave
        );
        assert_eq!(
            WeatherKind::classify(false, false, 35.0),
            WeatherKind::DustStorm
        );
        assert_eq!(WeatherKind::classify(false, false, -20.0), WeatherKind::Foggy);
        assert_eq!(WeatherKind::classify(false, false, -5.0), WeatherKind::Windy);
    }

    #[test]
    fn warm_biome_midday_classifies_clear() {
        // Ambient for a climate-0.8 biome at noon sits in the mild band.
        let world = FlatWorld::new()
            .with_biome(fv_core::Biome::Jungle)
            .with_time(12.0);
        let ambient = crate::temperature::TemperatureSystem::ambient_target(
            &world,
            BlockPos::new(0, 65, 0),
        )
        .unwrap();
        let kind = WeatherKind::classify(false, false, ambient);
        assert_eq!(kind, WeatherKind::Clear);
    }

    #[test]
    fn strength_bands_order_by_severity() {
        let calm = WeatherKind::Clear.strength_range();
        let storm = WeatherKind::Blizzard.strength_range();
        assert!(storm.0 > calm.1);
    }

    #[test]
    fn gust_step_is_bounded() {
        let config = WindConfig::default();
        let system = WindSystem::new(config.clone());
        let world = FlatWorld::new();
        let clock = SimClock::new(50);
        let state = SurvivalState::new(SimConfig::default());
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        let region = RegionId::new(0, 0);
        state.modify_region(region, |r| {
            r.gust_target = 10.0;
            r.last_major_ms = Some(0);
        });
        let mut ctx = harness(&world, &clock, &state, &mut events, &mut rng, &[]);
        let before = state.region_wind(region).unwrap().strength();
        let after = system.run_major_update(&mut ctx, region, 10).strength();
        assert!((after - before).abs() <= config.max_step + 1e-9);
    }

    #[test]
    fn major_update_emits_weather_shift() {
        let system = WindSystem::new(WindConfig::default());
        let world = FlatWorld::new().with_weather(true, false);
        let clock = SimClock::new(50);
        let state = SurvivalState::new(SimConfig::default());
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        let region = RegionId::new(0, 0);
        let mut ctx = harness(&world, &clock, &state, &mut events, &mut rng, &[]);
        let wind = system.run_major_update(&mut ctx, region, 0);
        assert_eq!(wind.weather(), WeatherKind::Rain);
        assert!(matches!(
            events.events()[0].kind,
            SimEventKind::WeatherShifted { .. }
        ));
    }

    #[test]
    fn override_suppresses_derived_weather() {
        let system = WindSystem::new(WindConfig::default());
        let world = FlatWorld::new().with_weather(true, true);
        let clock = SimClock::new(50);
        let state = SurvivalState::new(SimConfig::default());
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        let region = RegionId::new(0, 0);
        state.modify_region(region, |r| r.weather_override = Some(WeatherKind::Clear));
        let mut ctx = harness(&world, &clock, &state, &mut events, &mut rng, &[]);
        let wind = system.run_major_update(&mut ctx, region, 0);
        assert_eq!(wind.weather(), WeatherKind::Clear);
        assert!(events.is_empty());
    }

    #[test]
    fn coast_amplifies_wind() {
        let wind = RegionWind {
            base_strength: 6.0,
            ..Default::default()
        };
        let inland = FlatWorld::new().with_biome(fv_core::Biome::Plains);
        let coast = FlatWorld::new().with_biome(fv_core::Biome::Beach);
        let sea = FlatWorld::new().with_biome(fv_core::Biome::Ocean);
        let pos = BlockPos::new(0, 65, 0);
        let inland_force = WindSystem::force_at(&inland, &wind, pos).unwrap().length();
        let coast_force = WindSystem::force_at(&coast, &wind, pos).unwrap().length();
        let sea_force = WindSystem::force_at(&sea, &wind, pos).unwrap().length();
        assert!(coast_force > inland_force);
        assert!(sea_force > inland_force);
    }

    #[test]
    fn underground_position_feels_less_wind() {
        let mut world = FlatWorld::new();
        // Roof the underground spot.
        world.fill(
            BlockPos::new(-3, 40, -3),
            BlockPos::new(3, 44, 3),
            Block::Solid,
        );
        world.set_block(BlockPos::new(0, 40, 0), Block::Air);
        let wind = RegionWind {
            base_strength: 8.0,
            ..Default::default()
        };
        let surface = WindSystem::force_at(&world, &wind, BlockPos::new(100, 80, 100)).unwrap();
        let buried = WindSystem::force_at(&world, &wind, BlockPos::new(0, 40, 0)).unwrap();
        assert!(buried.length() < surface.length());
    }

    #[test]
    fn sneaking_reduces_impulse_airborne_increases_it() {
        let system = WindSystem::new(WindConfig::default());
        let force = Vec3::new(5.0, 0.0, 0.0);
        let mut standing = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        standing.on_ground = true;
        let mut sneaking = standing.clone();
        sneaking.sneaking = true;
        let mut airborne = standing.clone();
        airborne.on_ground = false;
        let base = system.impulse_from(&standing, force).length();
        assert!(system.impulse_from(&sneaking, force).length() < base);
        assert!(system.impulse_from(&airborne, force).length() > base);
    }

    #[test]
    fn submerged_player_gets_no_impulse() {
        let system = WindSystem::new(WindConfig::default());
        let world = FlatWorld::new();
        let clock = SimClock::new(50);
        let state = SurvivalState::new(SimConfig::default());
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        snap.submerged = true;
        let wind = RegionWind {
            base_strength: 12.0,
            ..Default::default()
        };
        let mut ctx = harness(&world, &clock, &state, &mut events, &mut rng, &[]);
        system.apply_to_player(&mut ctx, &snap, &wind);
        assert!(state.drain_impulses().is_empty());
    }

    #[test]
    fn headwind_drains_stamina() {
        let system = WindSystem::new(WindConfig::default());
        let world = FlatWorld::new();
        let clock = SimClock::new(50);
        let state = SurvivalState::new(SimConfig::default());
        let mut events = EventLog::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut snap = PlayerSnapshot::at(PlayerId::new(), Vec3::new(0.0, 65.0, 0.0));
        snap.on_ground = true;
        snap.velocity = Vec3::new(-1.0, 0.0, 0.0);
        let wind = RegionWind {
            base_strength: 8.0,
            ..Default::default()
        };
        let snaps = [snap.clone()];
        let mut ctx = harness(&world, &clock, &state, &mut events, &mut rng, &snaps);
        system.apply_to_player(&mut ctx, &snap, &wind);
        let env = state.player_env(snap.id).unwrap();
        assert!(env.stamina < 100.0);
    }

    proptest! {
        // Direction stays unit length through arbitrary rotation sequences.
        #[test]
        fn direction_remains_unit(angles in proptest::collection::vec(-0.5f64..0.5, 1..40)) {
            let mut wind = RegionWind::default();
            for a in angles {
                wind.direction = wind.direction.rotated_y(a).normalized();
            }
            prop_assert!((wind.direction.length() - 1.0).abs() < 1e-9);
        }

        // Force never comes back non-finite, whatever the strength.
        #[test]
        fn force_is_always_finite(strength in 0.0f64..50.0, y in 0.0f64..200.0) {
            let world = FlatWorld::new();
            let wind = RegionWind {
                base_strength: strength,
                ..Default::default()
            };
            let force =
                WindSystem::force_at(&world, &wind, BlockPos::new(0, y as i32, 0)).unwrap();
            prop_assert!(force.x.is_finite() && force.y.is_finite() && force.z.is_finite());
        }
    }
}
