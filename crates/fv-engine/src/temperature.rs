//! Body and ambient temperature model.
//!
//! Ambient temperature is a function of biome, realm, time of day, and
//! altitude. Body temperature layers personal terms on top: shelter, sun,
//! precipitation and wetness, wind chill, nearby heat and cold sources,
//! armor insulation, and movement. Results are cached per player and
//! smoothed with an adaptive coefficient so consumers see a stable signal
//! instead of per-tick noise.

use fv_core::{Block, BlockPos, PlayerId, PlayerSnapshot, WorldView};

use crate::config::TemperatureConfig;
use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::state::SurvivalState;
use crate::system::System;
use crate::wind::RegionWind;

/// Lower clamp of every temperature this engine produces, in °C.
pub const TEMP_MIN: f64 = -40.0;
/// Upper clamp of every temperature this engine produces, in °C.
pub const TEMP_MAX: f64 = 1200.0;

/// Stable temperature deep underground, in °C.
const CAVERN_TEMP: f64 = 11.0;
/// Body temperature while inside lava (post-clamp it stays below
/// [`TEMP_MAX`]).
const LAVA_BODY: f64 = 900.0;
/// Body temperature while on fire.
const BURNING_BODY: f64 = 220.0;
/// Body temperature while sunk into powder snow.
const POWDER_SNOW_BODY: f64 = -25.0;
/// Peak solar warmth at solar noon, in °C.
const SOLAR_GAIN_MAX: f64 = 6.0;
/// Width of the solar intensity bell, in hours.
const SOLAR_SIGMA: f64 = 3.5;
/// Cooling while rained on.
const RAIN_PENALTY: f64 = 7.0;
/// Cooling while rained on during a thunderstorm.
const THUNDER_PENALTY: f64 = 11.0;
/// Radiative cooling under a clear night sky.
const NIGHT_RADIATIVE: f64 = 2.5;
/// How far above comfort a wet player's temperature may climb.
const WET_CAP_ABOVE_COMFORT: f64 = 5.0;
/// Warmth added per nearby standing-water block.
const HUMIDITY_PER_BLOCK: f64 = 0.15;
/// Cap on total humidity warmth.
const HUMIDITY_MAX: f64 = 2.5;
/// Movement heat while walking.
const MOVE_HEAT: f64 = 0.6;
/// Movement heat while sprinting.
const SPRINT_HEAT: f64 = 1.8;
/// Source peak at or above which a heat source dries a wet player when
/// within three blocks.
const DRYING_HEAT_PEAK: f64 = 5.0;
/// Solar intensity at or above which direct sun dries a wet player.
const DRYING_SUN_INTENSITY: f64 = 0.75;
/// Horizontal half-extent of the heat/cold source scan, in blocks.
const SOURCE_RADIUS_XZ: i32 = 4;
/// Vertical half-extent of the heat/cold source scan, in blocks.
const SOURCE_RADIUS_Y: i32 = 3;

/// Map a normalized biome climate value into degrees Celsius through a
/// piecewise-linear curve.
///
/// The curve is deliberately not a straight scale: the cold half drops
/// faster than the warm half rises, which matches how biomes feel in play.
pub fn biome_base_celsius(climate: f64) -> f64 {
    const POINTS: [(f64, f64); 5] = [
        (0.0, -22.0),
        (0.25, -8.0),
        (0.5, 12.0),
        (0.75, 22.0),
        (1.0, 40.0),
    ];
    let c = climate.clamp(0.0, 1.0);
    for pair in POINTS.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if c <= x1 {
            return y0 + (c - x0) / (x1 - x0) * (y1 - y0);
        }
    }
    POINTS[POINTS.len() - 1].1
}

/// Smooth time-of-day offset with distinct day and night phases.
///
/// Daytime warms by up to +5 °C peaking mid-afternoon of the phase; night
/// cools by up to −6 °C, so the two phases have different slopes.
fn diurnal_offset(hour: f64) -> f64 {
    let h = hour.rem_euclid(24.0);
    if (6.0..18.0).contains(&h) {
        5.0 * (std::f64::consts::PI * (h - 6.0) / 12.0).sin()
    } else {
        let x = if h >= 18.0 { h - 18.0 } else { h + 6.0 };
        -6.0 * (std::f64::consts::PI * x / 12.0).sin()
    }
}

/// Bell-shaped solar intensity in `[0, 1]`, peaking at solar noon and zero
/// outside daylight hours.
fn solar_intensity(hour: f64) -> f64 {
    let h = hour.rem_euclid(24.0);
    if !(6.0..18.0).contains(&h) {
        return 0.0;
    }
    let x = (h - 12.0) / SOLAR_SIGMA;
    (-x * x).exp()
}

/// Altitude correction: cooling above sea level, gentle geothermal warming
/// well below it.
fn altitude_offset(y: i32, sea_level: i32) -> f64 {
    let dy = y - sea_level;
    if dy > 0 {
        (-0.06 * f64::from(dy)).max(-18.0)
    } else if dy < -10 {
        (0.025 * f64::from(-10 - dy)).min(8.0)
    } else {
        0.0
    }
}

/// How enclosed a position is, in `[0, 1]` (0 = fully exposed, 1 = fully
/// enclosed). Overhead cover weighs more than side cover. Cells that fail
/// to resolve count as open.
pub fn shelter_factor(world: &dyn WorldView, pos: BlockPos) -> f64 {
    let mut above = 0u32;
    for dy in 2..=7 {
        if world
            .block_at(pos.offset(0, dy, 0))
            .is_some_and(Block::is_cover)
        {
            above += 1;
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
    let mut sides = 0u32;
    for (dx, dz) in ring {
        if world
            .block_at(pos.offset(dx, 1, dz))
            .is_some_and(Block::is_solid)
        {
            sides += 1;
        }
    }
    0.6 * f64::from(above) / 6.0 + 0.4 * f64::from(sides) / 8.0
}

struct SourceScan {
    /// Net temperature contribution from all sources.
    delta: f64,
    /// Largest heat-source peak found within drying range.
    strongest_heat: f64,
}

/// Scan the local neighborhood for heat and cold sources with quadratic
/// distance falloff. The falloff divisor `1 + d²` is never zero, so a
/// source in the player's own cell contributes its full peak instead of a
/// NaN.
fn scan_sources(world: &dyn WorldView, pos: BlockPos) -> SourceScan {
    let mut delta = 0.0;
    let mut strongest_heat = 0.0;
    for dx in -SOURCE_RADIUS_XZ..=SOURCE_RADIUS_XZ {
        for dy in -SOURCE_RADIUS_Y..=SOURCE_RADIUS_Y {
            for dz in -SOURCE_RADIUS_XZ..=SOURCE_RADIUS_XZ {
                let p = pos.offset(dx, dy, dz);
                let Some(block) = world.block_at(p) else {
                    continue;
                };
                let d2 = pos.distance_sq(p);
                if let Some(peak) = block.heat_emission() {
                    delta += peak / (1.0 + d2);
                    if d2 <= 9.0 && peak > strongest_heat {
                        strongest_heat = peak;
                    }
                }
                if let Some(peak) = block.cold_emission() {
                    delta -= peak / (1.0 + d2);
                }
            }
        }
    }
    SourceScan {
        delta,
        strongest_heat,
    }
}

/// Humidity warmth from standing water near the position. Applies only
/// outside peak daylight, when evaporative cooling does not cancel it.
fn humidity_offset(world: &dyn WorldView, pos: BlockPos, hour: f64) -> f64 {
    if (10.0..15.0).contains(&hour.rem_euclid(24.0)) {
        return 0.0;
    }
    let mut water = 0u32;
    for dx in -3i32..=3 {
        for dy in -1i32..=1 {
            for dz in -3i32..=3 {
                // Lava is a liquid too, but it registers through the heat
                // source scan, not as humidity.
                let humid = world
                    .block_at(pos.offset(dx, dy, dz))
                    .is_some_and(|b| b.is_liquid() && b.heat_emission().is_none());
                if humid {
                    water += 1;
                }
            }
        }
    }
    (f64::from(water) * HUMIDITY_PER_BLOCK).min(HUMIDITY_MAX)
}

/// One freshly computed body-temperature sample, before smoothing.
#[derive(Debug, Clone, Copy)]
pub struct BodySample {
    /// The clamped temperature value in °C.
    pub value: f64,
    /// Whether precipitation or water contact is soaking the player now.
    pub soaking: bool,
    /// Whether an active drying condition (strong heat source or direct
    /// sun) is present.
    pub drying: bool,
}

/// Computes and caches ambient and body temperature.
#[derive(Debug)]
pub struct TemperatureSystem {
    config: TemperatureConfig,
    last_evict_ms: u64,
}

impl TemperatureSystem {
    /// Create the engine with the given tuning.
    pub fn new(config: TemperatureConfig) -> Self {
        Self {
            config,
            last_evict_ms: 0,
        }
    }

    /// The raw ambient temperature a position is trending toward, before
    /// region smoothing. `None` if the biome cannot be resolved this tick.
    pub fn ambient_target(world: &dyn WorldView, pos: BlockPos) -> Option<f64> {
        if let Some(base) = world.realm().fixed_baseline() {
            return Some(base);
        }
        let biome = world.biome_at(pos)?;
        let mut t = biome_base_celsius(biome.climate());
        t += diurnal_offset(world.time_of_day());
        t += altitude_offset(pos.y, world.sea_level());
        Some(t.clamp(TEMP_MIN, TEMP_MAX))
    }

    /// Update a region's cached ambient temperature toward the target at
    /// `pos`, limited to `ambient_max_step` per update so players moving
    /// between biomes see a drift instead of a jump. Returns the cached
    /// value.
    pub fn refresh_ambient(
        &self,
        world: &dyn WorldView,
        state: &SurvivalState,
        pos: BlockPos,
    ) -> Option<f64> {
        let target = Self::ambient_target(world, pos)?;
        let region = world.region_of(pos);
        let max_step = self.config.ambient_max_step;
        Some(state.modify_region(region, |r: &mut RegionWind| {
            if r.ambient_initialized {
                let step = (target - r.cached_ambient).clamp(-max_step, max_step);
                r.cached_ambient += step;
            } else {
                r.cached_ambient = target;
                r.ambient_initialized = true;
            }
            r.cached_ambient
        }))
    }

    /// Compute a fresh, unsmoothed body-temperature sample.
    ///
    /// Returns `None` when a required world lookup fails, in which case the
    /// caller skips this player for the tick.
    pub fn compute_body_sample(
        &self,
        world: &dyn WorldView,
        snap: &PlayerSnapshot,
        wind: &RegionWind,
        wet: bool,
    ) -> Option<BodySample> {
        // Hard overrides replace the whole model with fixed bands.
        if snap.in_lava {
            return Some(BodySample {
                value: LAVA_BODY.clamp(TEMP_MIN, TEMP_MAX),
                soaking: false,
                drying: true,
            });
        }
        if snap.on_fire {
            return Some(BodySample {
                value: BURNING_BODY,
                soaking: false,
                drying: true,
            });
        }
        if snap.in_powder_snow {
            return Some(BodySample {
                value: POWDER_SNOW_BODY,
                soaking: true,
                drying: false,
            });
        }

        let pos = BlockPos::new(
            snap.position.x.floor() as i32,
            snap.position.y.floor() as i32,
            snap.position.z.floor() as i32,
        );
        let biome = world.biome_at(pos)?;

        if snap.submerged {
            // Water pins body temperature to a biome-tinted band.
            let value = (biome_base_celsius(biome.climate()) * 0.5 + 8.0).clamp(2.0, 26.0);
            return Some(BodySample {
                value,
                soaking: true,
                drying: false,
            });
        }

        let sky = world.sky_visible(pos.offset(0, 1, 0))?;
        let hour = world.time_of_day();
        let sea = world.sea_level();
        let sun = solar_intensity(hour);

        let mut temp = match world.realm().fixed_baseline() {
            Some(base) => base,
            None => biome_base_celsius(biome.climate()) + diurnal_offset(hour),
        };
        temp += altitude_offset(pos.y, sea);

        if !sky {
            // Blend toward the stable cavern band, proportional to depth.
            let depth = f64::from((sea - pos.y).max(0));
            let blend = (depth / 30.0).clamp(0.0, 1.0) * 0.75;
            temp += (CAVERN_TEMP - temp) * blend;
        }

        if sky && sun > 0.0 {
            temp += SOLAR_GAIN_MAX * sun;
        }

        let raining_here = world.is_raining() && sky;
        if raining_here {
            temp -= if world.is_thundering() {
                THUNDER_PENALTY
            } else {
                RAIN_PENALTY
            };
        }

        let shelter = shelter_factor(world, pos);
        let altitude_amp = 1.0 + f64::from((pos.y - sea).max(0)) * 0.004;
        let chill =
            wind.strength() * 0.45 * wind.weather().chill_factor() * altitude_amp * (1.0 - shelter);
        if chill.is_finite() && chill > 0.0 {
            temp -= chill;
        }

        temp += humidity_offset(world, pos, hour);

        let sources = scan_sources(world, pos);
        temp += sources.delta;

        let direct_sun = sky && sun >= DRYING_SUN_INTENSITY;
        let strong_heat = sources.strongest_heat >= DRYING_HEAT_PEAK;
        let drying = direct_sun || strong_heat;
        let soaking = raining_here || snap.in_water;

        if (wet || soaking) && !drying {
            // Wetness caps how warm the player can get until dried.
            temp = temp.min(self.config.comfort + WET_CAP_ABOVE_COMFORT);
        }

        let insulation = snap.armor_insulation().min(self.config.insulation_cap);
        temp += (self.config.comfort - temp) * insulation;

        let mut movement_heat = if snap.sprinting {
            SPRINT_HEAT
        } else if snap.is_moving() {
            MOVE_HEAT
        } else {
            0.0
        };
        if wet || soaking {
            movement_heat *= 0.5;
        }
        temp += movement_heat;

        let night = !(6.0..18.0).contains(&hour.rem_euclid(24.0));
        if sky && night {
            temp -= NIGHT_RADIATIVE;
        }

        if !temp.is_finite() {
            return None;
        }
        Some(BodySample {
            value: temp.clamp(TEMP_MIN, TEMP_MAX),
            soaking,
            drying,
        })
    }

    /// Cache-aware body temperature refresh for one player.
    ///
    /// Recomputes at most once per `recompute_interval_ms`; otherwise the
    /// cached value is returned untouched. On recompute the fresh sample is
    /// blended with the cached value using a coefficient that grows with
    /// the time since the previous sample, bounded to the configured range.
    /// Returns the smoothed value plus any wet/dry transition that occurred.
    pub fn refresh_player(
        &self,
        world: &dyn WorldView,
        state: &SurvivalState,
        snap: &PlayerSnapshot,
        now_ms: u64,
    ) -> Option<(f64, Option<WetTransition>)> {
        let env = state.modify_player(snap.id, |env| *env);
        let fresh_enough = env
            .last_computed_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.config.recompute_interval_ms);
        if fresh_enough {
            return Some((env.body_temperature, None));
        }

        let pos = BlockPos::new(
            snap.position.x.floor() as i32,
            snap.position.y.floor() as i32,
            snap.position.z.floor() as i32,
        );
        let wind = state
            .region_wind(world.region_of(pos))
            .unwrap_or_default();
        let was_wet = env.is_wet(now_ms);
        let sample = self.compute_body_sample(world, snap, &wind, was_wet)?;

        let interval = self.config.recompute_interval_ms;
        let smoothed = match env.last_computed_ms {
            None => sample.value,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last) as f64;
                let alpha = (0.45 * elapsed / interval as f64)
                    .clamp(self.config.smoothing_min, self.config.smoothing_max);
                env.body_temperature + alpha * (sample.value - env.body_temperature)
            }
        };
        let smoothed = smoothed.clamp(TEMP_MIN, TEMP_MAX);

        let mut transition = None;
        let wet_duration = self.config.wet_duration_ms;
        state.modify_player(snap.id, |env| {
            env.temperature_trend = smoothed - env.body_temperature;
            env.body_temperature = smoothed;
            env.last_computed_ms = Some(now_ms);
            let was_wet = env.is_wet(now_ms);
            if sample.soaking {
                env.wet_until = Some(now_ms + wet_duration);
                if !was_wet {
                    transition = Some(WetTransition::Soaked);
                }
            } else if was_wet && sample.drying {
                env.wet_until = None;
                transition = Some(WetTransition::Dried);
            }
        });
        Some((smoothed, transition))
    }
}

/// A wetness state change produced during a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WetTransition {
    /// The player became wet.
    Soaked,
    /// An active drying condition cleared the player's wetness.
    Dried,
}

impl System for TemperatureSystem {
    fn name(&self) -> &str {
        "temperature"
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let now = ctx.now_ms();
        let players = ctx.players;

        // Time-gated eviction sweep, bounding cache memory without a timer
        // thread. Only departed players are eligible.
        if now.saturating_sub(self.last_evict_ms) >= self.config.evict_interval_ms
            && self.last_evict_ms != now
        {
            self.last_evict_ms = now;
            let connected: Vec<PlayerId> = players.iter().map(|snap| snap.id).collect();
            ctx.state
                .evict_stale_players(now, self.config.cache_stale_ms, &connected);
        }

        for snap in players {
            let pos = BlockPos::new(
                snap.position.x.floor() as i32,
                snap.position.y.floor() as i32,
                snap.position.z.floor() as i32,
            );
            let _ = self.refresh_ambient(ctx.world, ctx.state, pos);
            let Some((_, transition)) = self.refresh_player(ctx.world, ctx.state, snap, now)
            else {
                // Transient world-query failure: skip this player this tick.
                continue;
            };
            match transition {
                Some(WetTransition::Soaked) => ctx.emit(
                    SimEventKind::PlayerSoaked { player: snap.id },
                    format!("{} got soaked", snap.id),
                ),
                Some(WetTransition::Dried) => ctx.emit(
                    SimEventKind::PlayerDried { player: snap.id },
                    format!("{} dried off", snap.id),
                ),
                None => {}
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
