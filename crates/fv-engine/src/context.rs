use rand::rngs::StdRng;

use fv_core::{PlayerSnapshot, WorldView};

use crate::clock::SimClock;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::state::SurvivalState;

/// Context passed to each engine during a tick.
pub struct SimContext<'a> {
    /// Read-only view of the host world.
    pub world: &'a dyn WorldView,
    /// The simulation clock.
    pub clock: &'a SimClock,
    /// Shared keyed state for players, regions, and difficulty profiles.
    pub state: &'a SurvivalState,
    /// The event log.
    pub events: &'a mut EventLog,
    /// Seeded RNG for all sampling.
    pub rng: &'a mut StdRng,
    /// Snapshots for every connected player this tick.
    pub players: &'a [PlayerSnapshot],
}

impl SimContext<'_> {
    /// Emit a simulation event at the current tick.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events
            .push(SimEvent::new(self.clock.tick(), kind, description));
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Milliseconds of simulated time elapsed since tick 0.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_millis()
    }
}
