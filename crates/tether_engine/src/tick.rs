//! Tick orchestration for Tether.
//!
//! A tick is the fundamental unit of simulation time. Each tick:
//! 1. Tags linked entities that are not tagged yet
//! 2. Sweeps destroyed linked entities, reverting their owners
//! 3. Advances the world's tick counter

use tether_foundation::Result;
use tether_storage::World;
use tracing::debug;

use crate::config::LinkConfig;
use crate::lifecycle::{MaintenancePass, TagLinkedEntities, UnlinkOnDestroy};

// =============================================================================
// Tick Report
// =============================================================================

/// What one tick's maintenance did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number that was completed.
    pub tick: u64,
    /// Entities given the participation tag.
    pub tagged: usize,
    /// Destroyed linked entities swept and finalized.
    pub swept: usize,
    /// Owner payloads reverted by the sweep.
    pub reverted: usize,
    /// Sweep records skipped because the owner was gone.
    pub skipped: usize,
}

// =============================================================================
// Tick Executor
// =============================================================================

/// Runs the maintenance passes, in order, once per tick.
#[derive(Clone, Debug, Default)]
pub struct TickExecutor {
    tagging: TagLinkedEntities,
    cleanup: UnlinkOnDestroy,
}

impl TickExecutor {
    /// Creates an executor with the default link configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor whose sweep reverts owners under `config`.
    #[must_use]
    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            tagging: TagLinkedEntities,
            cleanup: UnlinkOnDestroy::new(config),
        }
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// A pass error aborts the tick; the tick counter is not advanced.
    pub fn tick(&mut self, world: &mut World) -> Result<TickReport> {
        let tagged = self.tagging.run(world)?;
        let swept = self.cleanup.run(world)?;

        let report = TickReport {
            tick: world.tick(),
            tagged: tagged.entities,
            swept: swept.entities,
            reverted: swept.reverted,
            skipped: swept.skipped,
        };
        world.advance_tick();
        debug!(
            tick = report.tick,
            tagged = report.tagged,
            swept = report.swept,
            "tick complete"
        );
        Ok(report)
    }
}
