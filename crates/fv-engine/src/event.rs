use fv_core::{PlayerId, RegionId};

use crate::thirst::DehydrationTier;
use crate::wind::WeatherKind;

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Weather / wind
    /// A region's derived weather kind changed.
    WeatherShifted {
        /// The region whose weather changed.
        region: RegionId,
        /// The previous weather kind.
        from: WeatherKind,
        /// The new weather kind.
        to: WeatherKind,
    },
    /// A high-strength gust knocked a player back.
    GustKnockback {
        /// The player who was hit.
        player: PlayerId,
        /// Wind strength at the moment of the gust.
        strength: f64,
    },

    // Temperature
    /// A player became wet from precipitation or water contact.
    PlayerSoaked {
        /// The player who got wet.
        player: PlayerId,
    },
    /// A player dried off (heat source, direct sun, or elapsed time).
    PlayerDried {
        /// The player who dried off.
        player: PlayerId,
    },

    // Stamina
    /// A stamina value was transmitted to display consumers.
    StaminaSynced {
        /// The player whose stamina was pushed.
        player: PlayerId,
        /// The transmitted value.
        value: f64,
    },

    // Thirst
    /// A player crossed into a different dehydration tier.
    DehydrationTierChanged {
        /// The player whose tier changed.
        player: PlayerId,
        /// The tier now in effect.
        tier: DehydrationTier,
    },
    /// Critical dehydration dealt a damage pulse.
    DehydrationDamage {
        /// The player who took damage.
        player: PlayerId,
        /// Damage dealt.
        amount: f64,
    },

    // Difficulty
    /// Dynamic scaling raised a player's scaling level.
    ScalingRaised {
        /// The player whose level rose.
        player: PlayerId,
        /// The level reached.
        level: u32,
        /// The multiplier factor applied to enabled aspects.
        factor: f64,
    },
}

impl SimEventKind {
    /// Check whether a given player is involved in this event.
    pub fn involves(&self, id: PlayerId) -> bool {
        match self {
            Self::WeatherShifted { .. } => false,
            Self::GustKnockback { player, .. }
            | Self::PlayerSoaked { player }
            | Self::PlayerDried { player }
            | Self::StaminaSynced { player, .. }
            | Self::DehydrationTierChanged { player, .. }
            | Self::DehydrationDamage { player, .. }
            | Self::ScalingRaised { player, .. } => *player == id,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its
    /// capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given player.
    pub fn events_for_player(&self, id: PlayerId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soaked(tick: u64, player: PlayerId) -> SimEvent {
        SimEvent::new(tick, SimEventKind::PlayerSoaked { player }, "soaked")
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = PlayerId::new();
        log.push(soaked(1, id));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_for_player(id).len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = PlayerId::new();
        for i in 0..5 {
            log.push(soaked(i, id));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn weather_events_involve_no_player() {
        let kind = SimEventKind::WeatherShifted {
            region: RegionId::new(0, 0),
            from: WeatherKind::Clear,
            to: WeatherKind::Rain,
        };
        assert!(!kind.involves(PlayerId::new()));
    }

    #[test]
    fn player_events_involve_their_player() {
        let id = PlayerId::new();
        let other = PlayerId::new();
        let kind = SimEventKind::ScalingRaised {
            player: id,
            level: 2,
            factor: 1.1,
        };
        assert!(kind.involves(id));
        assert!(!kind.involves(other));
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(soaked(1, PlayerId::new()));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }
}
