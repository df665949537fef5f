use crate::context::SimContext;
use crate::error::SimResult;

/// A simulation engine that runs each tick.
///
/// Engines are executed in registration order, which encodes the dependency
/// order: difficulty multipliers are refreshed first, environmental engines
/// (temperature, wind) next, pool engines (stamina, thirst) after, and the
/// display sync last. Each engine receives a context providing the host
/// world view, clock, shared state, RNG, and event log.
///
/// A returned error aborts the tick; per-player problems must instead be
/// handled inside the engine by skipping that player, so one player's
/// missing world data never stalls the rest.
pub trait System: std::fmt::Debug {
    /// Human-readable name for this engine.
    fn name(&self) -> &str;

    /// Called once per tick.
    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()>;

    /// Called once when the engine is first registered. Optional setup hook.
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Support downcasting to concrete types for host access.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types for host access.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
