//! Lifecycle maintenance passes.
//!
//! Two passes run once per tick, tagging before sweeping:
//!
//! 1. [`TagLinkedEntities`] tags every live entity that has a link list but
//!    no participation tag. Deferred list creation cannot tag at record
//!    time; this pass closes that gap before the sweep relies on the tag.
//! 2. [`UnlinkOnDestroy`] finds destroyed entities still holding a link list
//!    (list present, tag gone) and reverts each owner's payload, then
//!    removes the list, which completes the destruction. A list is only
//!    removed once its reverts have been applied; an entity whose reverts
//!    fail keeps its list and is retried next tick.

use tether_foundation::{EntityId, KeywordId, Result, Value};
use tether_storage::{CommandBuffer, LinkRecord, Query, World};
use tracing::{debug, trace};

use crate::config::LinkConfig;
use crate::registry::LinkRegistry;
use crate::sink::{Deferred, EffectSink};

/// What a pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Entities the pass selected.
    pub entities: usize,
    /// Owner payloads reverted.
    pub reverted: usize,
    /// Records whose owner no longer existed.
    pub skipped: usize,
}

/// A pass run over the world once per tick.
pub trait MaintenancePass {
    /// Name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Runs the pass.
    ///
    /// # Errors
    ///
    /// Any store error; the tick should be treated as failed.
    fn run(&mut self, world: &mut World) -> Result<PassReport>;
}

/// Adds the participation tag to live entities with a link list.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagLinkedEntities;

impl TagLinkedEntities {
    fn query() -> Query {
        Query::new()
            .with(KeywordId::LINK_LIST)
            .without(KeywordId::LINKED)
    }
}

impl MaintenancePass for TagLinkedEntities {
    fn name(&self) -> &'static str {
        "tag_linked_entities"
    }

    fn run(&mut self, world: &mut World) -> Result<PassReport> {
        let untagged = world.query(&Self::query());
        for &entity in &untagged {
            world
                .add(entity, KeywordId::LINKED, Value::Bool(true))
                .map_err(|e| e.in_operation(self.name()))?;
            trace!(?entity, "tagged linked entity");
        }
        if !untagged.is_empty() {
            debug!(tagged = untagged.len(), "tagging pass");
        }
        Ok(PassReport {
            entities: untagged.len(),
            ..PassReport::default()
        })
    }
}

/// Reverts owner payloads for destroyed linked entities and discards their
/// lists.
#[derive(Clone, Debug, Default)]
pub struct UnlinkOnDestroy {
    registry: LinkRegistry,
}

impl UnlinkOnDestroy {
    /// Creates the pass with the registry settings it reverts owners under.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            registry: LinkRegistry::new(config),
        }
    }

    fn query() -> Query {
        Query::new()
            .with(KeywordId::LINK_LIST)
            .without(KeywordId::LINKED)
            .pending()
    }

    fn sweep(&self, world: &mut World) -> Result<PassReport> {
        let dying = world.query(&Self::query());
        let mut report = PassReport::default();
        let mut failure = None;

        for &linked in &dying {
            match self.sweep_one(world, linked) {
                Ok((reverted, skipped)) => {
                    report.entities += 1;
                    report.reverted += reverted;
                    report.skipped += skipped;
                }
                Err(e) => {
                    debug!(?linked, error = %e, "sweep failed, list kept");
                    failure.get_or_insert(e);
                }
            }
        }

        if report.entities > 0 {
            debug!(
                swept = report.entities,
                reverted = report.reverted,
                skipped = report.skipped,
                "destruction sweep"
            );
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Reverts the owners recorded by `linked`, then removes its list.
    fn sweep_one(&self, world: &mut World, linked: EntityId) -> Result<(usize, usize)> {
        let records: Vec<LinkRecord> = world
            .link_list(linked)
            .map(|list| list.iter().copied().collect())
            .unwrap_or_default();
        let (mut reverted, mut skipped) = (0, 0);

        let mut buffer = CommandBuffer::new();
        let mut sink = Deferred::new(world, &mut buffer);
        for record in records {
            if sink.store().exists(record.owner) {
                self.registry.unlink_record(&mut sink, record)?;
                reverted += 1;
            } else {
                trace!(owner = ?record.owner, ?linked, "owner already gone");
                skipped += 1;
            }
        }

        buffer.playback(world)?;
        world.remove_link_list(linked)?;
        Ok((reverted, skipped))
    }
}

impl MaintenancePass for UnlinkOnDestroy {
    fn name(&self) -> &'static str {
        "unlink_on_destroy"
    }

    fn run(&mut self, world: &mut World) -> Result<PassReport> {
        self.sweep(world).map_err(|e| e.in_operation(self.name()))
    }
}
