/// Tracks simulation time: a monotonic tick counter scaled to milliseconds.
///
/// Every cooldown, cache interval, and sync cadence in the engine reads this
/// clock instead of the wall clock, so tests advance simulated time
/// deterministically by ticking.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    millis_per_tick: u64,
}

impl SimClock {
    /// Create a clock at tick 0 with the given tick duration in milliseconds.
    pub fn new(millis_per_tick: u64) -> Self {
        Self {
            tick: 0,
            millis_per_tick,
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Milliseconds of simulated time elapsed since tick 0.
    pub fn now_millis(&self) -> u64 {
        self.tick * self.millis_per_tick
    }

    /// The configured tick duration in milliseconds.
    pub fn millis_per_tick(&self) -> u64 {
        self.millis_per_tick
    }

    /// Milliseconds elapsed since an earlier timestamp taken from this clock.
    pub fn since(&self, earlier_ms: u64) -> u64 {
        self.now_millis().saturating_sub(earlier_ms)
    }
}
