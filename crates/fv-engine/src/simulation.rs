//! The top-level simulation orchestrator.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use fv_core::{PlayerId, PlayerSnapshot, WorldView};

use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::difficulty::DifficultySystem;
use crate::error::SimResult;
use crate::event::EventLog;
use crate::stamina::StaminaSystem;
use crate::state::SurvivalState;
use crate::sync::SyncSystem;
use crate::system::System;
use crate::temperature::TemperatureSystem;
use crate::thirst::ThirstSystem;
use crate::wind::WindSystem;

/// The top-level simulation orchestrator.
///
/// Owns the clock, RNG, event log, and registered engines, plus a shared
/// handle to the keyed state. The host owns the world and the player roster
/// and lends both to each tick; the state handle can be cloned out and used
/// from other threads between ticks.
pub struct Simulation {
    clock: SimClock,
    rng: StdRng,
    events: EventLog,
    state: Arc<SurvivalState>,
    systems: Vec<Box<dyn System>>,
    initialized: bool,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.clock.tick())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .field("players", &self.state.player_count())
            .finish()
    }
}

impl Simulation {
    /// Create a new simulation from a configuration, with no engines
    /// registered. Fails if the configuration is out of range.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let clock = SimClock::new(config.millis_per_tick);
        let rng = StdRng::seed_from_u64(config.seed);
        let events = EventLog::new(config.max_events);
        let state = Arc::new(SurvivalState::new(config));
        Ok(Self {
            clock,
            rng,
            events,
            state,
            systems: Vec::new(),
            initialized: false,
        })
    }

    /// Create a simulation with the standard engine set registered in
    /// dependency order: difficulty, temperature, wind, stamina, thirst,
    /// display sync.
    pub fn with_default_systems(config: SimConfig) -> SimResult<Self> {
        let mut sim = Self::new(config)?;
        let config = sim.state.config().clone();
        sim.add_system(DifficultySystem::new(config.difficulty));
        sim.add_system(TemperatureSystem::new(config.temperature));
        sim.add_system(WindSystem::new(config.wind));
        sim.add_system(StaminaSystem::new(config.stamina));
        sim.add_system(ThirstSystem::new(config.thirst));
        sim.add_system(SyncSystem::new(config.sync));
        Ok(sim)
    }

    /// Register an engine. Engines are ticked in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Initialize all registered engines.
    pub fn init(&mut self, world: &dyn WorldView, players: &[PlayerSnapshot]) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                world,
                clock: &self.clock,
                state: &self.state,
                events: &mut self.events,
                rng: &mut self.rng,
                players,
            };
            system.init(&mut ctx)?;
            self.systems[i] = system;
        }
        self.initialized = true;
        Ok(())
    }

    /// Advance the simulation by one tick against the host's current world
    /// view and player roster.
    pub fn tick(&mut self, world: &dyn WorldView, players: &[PlayerSnapshot]) -> SimResult<()> {
        if !self.initialized {
            self.init(world, players)?;
        }

        self.clock.advance();

        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let mut ctx = SimContext {
                world,
                clock: &self.clock,
                state: &self.state,
                events: &mut self.events,
                rng: &mut self.rng,
                players,
            };
            system.tick(&mut ctx)?;
            self.systems[i] = system;
        }
        Ok(())
    }

    /// Advance the simulation by `n` ticks.
    pub fn run(
        &mut self,
        world: &dyn WorldView,
        players: &[PlayerSnapshot],
        n: u64,
    ) -> SimResult<()> {
        for _ in 0..n {
            self.tick(world, players)?;
        }
        Ok(())
    }

    /// Shared handle to the keyed state, usable from other threads.
    pub fn state(&self) -> Arc<SurvivalState> {
        Arc::clone(&self.state)
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drop all state for a disconnected player.
    pub fn remove_player(&self, id: PlayerId) {
        self.state.remove_player(id);
    }

    /// Access an engine by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access an engine mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Current tick number.
    pub fn current_tick(&self) -> u64 {
        self.clock.tick()
    }
}

/// Placeholder engine used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
