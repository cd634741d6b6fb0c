//! The link registry.
//!
//! An owner carries a payload because of a linked entity. Linking attaches
//! the payload to the owner and appends a [`LinkRecord`] to the linked
//! entity's list; unlinking removes the record and reverts the payload, by
//! stripping it (removable) or resetting it to its schema default.
//!
//! Each operation takes an [`EffectSink`], so the same code serves immediate
//! calls and deferred batches.

use tether_foundation::{EntityId, Error, ErrorKind, KeywordId, Result, Value};
use tether_storage::{Command, LinkIdentity, LinkKey, LinkList, LinkRecord};
use tracing::debug;

use crate::config::LinkConfig;
use crate::sink::EffectSink;

/// Proof that a linked entity's list was resolved.
///
/// Obtained from [`LinkRegistry::resolve`] or
/// [`LinkRegistry::prepare_for_linking`] and passed to the `*_in` methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkListHandle {
    linked: EntityId,
}

impl LinkListHandle {
    /// The entity carrying the list.
    #[must_use]
    pub const fn linked(self) -> EntityId {
        self.linked
    }
}

/// Establishes and severs links.
#[derive(Clone, Debug, Default)]
pub struct LinkRegistry {
    config: LinkConfig,
}

impl LinkRegistry {
    /// Creates a registry with the given configuration.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// The registry configuration.
    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    // --- Lists ---

    /// Gives `linked` a link list if it has none.
    ///
    /// On an immediate sink the participation tag is added too. A deferred
    /// sink cannot observe the list before playback, so the tag is left to
    /// [`crate::TagLinkedEntities`].
    ///
    /// # Errors
    ///
    /// Fails if `linked` is not live, or with the store's error.
    pub fn prepare_for_linking<S: EffectSink>(
        &self,
        sink: &mut S,
        linked: EntityId,
    ) -> Result<LinkListHandle> {
        self.prepare(sink, linked)
            .map_err(|e| e.in_operation("prepare_for_linking"))
    }

    fn prepare<S: EffectSink>(&self, sink: &mut S, linked: EntityId) -> Result<LinkListHandle> {
        sink.store().validate(linked)?;
        if !sink.has_link_list(linked) {
            sink.submit(Command::CreateLinkList {
                entity: linked,
                capacity: self.config.list_capacity,
            })?;
        }
        if !sink.is_deferred() {
            sink.submit(Command::AddDefault {
                entity: linked,
                component: KeywordId::LINKED,
            })?;
        }
        Ok(LinkListHandle { linked })
    }

    /// Resolves the link list of `linked`.
    ///
    /// # Errors
    ///
    /// `LinkListMissing` if `linked` has no list and none is pending in the
    /// sink.
    pub fn resolve<S: EffectSink>(&self, sink: &S, linked: EntityId) -> Result<LinkListHandle> {
        if sink.has_link_list(linked) {
            Ok(LinkListHandle { linked })
        } else {
            Err(Error::link_list_missing(linked).in_operation("resolve"))
        }
    }

    // --- Registration ---

    /// Appends a record for `owner` to a resolved list.
    ///
    /// # Errors
    ///
    /// Checked mode: `OwnerNotFound` if `owner` is not live,
    /// `UnknownComponent` if `kind` has no schema, `DuplicateLink` if
    /// composite identity already has this owner and kind.
    pub fn register_link_in<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        list: LinkListHandle,
        removable: bool,
    ) -> Result<()> {
        self.register(sink, owner, kind, list.linked, removable)
            .map(|_| ())
            .map_err(|e| e.in_operation("register_link"))
    }

    /// Appends a record for `owner` to the list of `linked`.
    ///
    /// An immediate sink creates and tags the list if missing. A deferred
    /// sink requires the list to exist, or to be prepared earlier in the
    /// same batch; trusted mode leaves that to playback.
    ///
    /// # Errors
    ///
    /// As [`Self::register_link_in`], plus `LinkListMissing` on a checked
    /// deferred call without a list.
    pub fn register_link<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        linked: EntityId,
        removable: bool,
    ) -> Result<LinkListHandle> {
        self.register(sink, owner, kind, linked, removable)
            .map_err(|e| e.in_operation("register_link"))
    }

    fn register<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        linked: EntityId,
        removable: bool,
    ) -> Result<LinkListHandle> {
        self.check_link(sink, owner, kind, linked)?;
        let list = self.list_for_registration(sink, linked)?;
        self.append(sink, owner, kind, linked, removable)?;
        Ok(list)
    }

    /// Fails if the list of `linked` cannot be had for a registration,
    /// without changing anything.
    fn check_list_target<S: EffectSink>(&self, sink: &S, linked: EntityId) -> Result<()> {
        if sink.has_link_list(linked) {
            Ok(())
        } else if !sink.is_deferred() {
            sink.store().validate(linked)
        } else if self.config.is_checked() {
            Err(Error::link_list_missing(linked))
        } else {
            Ok(())
        }
    }

    fn list_for_registration<S: EffectSink>(
        &self,
        sink: &mut S,
        linked: EntityId,
    ) -> Result<LinkListHandle> {
        self.check_list_target(sink, linked)?;
        if !sink.has_link_list(linked) && !sink.is_deferred() {
            return self.prepare(sink, linked);
        }
        Ok(LinkListHandle { linked })
    }

    fn append<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        linked: EntityId,
        removable: bool,
    ) -> Result<()> {
        sink.submit(Command::AppendLink {
            linked,
            record: LinkRecord::new(owner, kind, removable),
        })?;
        debug!(
            ?owner,
            ?linked,
            ?kind,
            removable,
            deferred = sink.is_deferred(),
            "registered link"
        );
        Ok(())
    }

    /// Checked-mode contract for a new record: live owner, known kind, and
    /// no duplicate under composite identity.
    fn check_link<S: EffectSink>(
        &self,
        sink: &S,
        owner: EntityId,
        kind: KeywordId,
        linked: EntityId,
    ) -> Result<()> {
        if !self.config.is_checked() {
            return Ok(());
        }
        let store = sink.store();
        if !store.exists(owner) {
            return Err(Error::owner_not_found(owner, linked));
        }
        if store.schema(kind).is_none() {
            return Err(Error::new(ErrorKind::UnknownComponent(kind)));
        }
        if self.config.identity == LinkIdentity::OwnerAndKind
            && store
                .link_list(linked)
                .is_some_and(|list| list.contains(LinkKey::with_kind(owner, kind), self.config.identity))
        {
            return Err(Error::new(ErrorKind::DuplicateLink {
                owner,
                linked,
                component: kind,
            }));
        }
        Ok(())
    }

    // --- Link (payload + registration) ---

    /// Adds `payload` to `owner` as component `kind`, then registers the
    /// link in a resolved list.
    ///
    /// # Errors
    ///
    /// `PayloadAlreadyPresent` from the store if `owner` has `kind`, plus
    /// the errors of [`Self::register_link_in`].
    pub fn add_link_in<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        payload: Value,
        list: LinkListHandle,
        removable: bool,
    ) -> Result<()> {
        self.link(sink, owner, kind, payload, list.linked, removable, false)
            .map(|_| ())
            .map_err(|e| e.in_operation("add_link"))
    }

    /// Adds `payload` to `owner` as component `kind`, then registers the
    /// link with `linked`.
    ///
    /// On an immediate sink a failed attach leaves `linked` untouched: the
    /// list is only created once the payload is on the owner.
    ///
    /// # Errors
    ///
    /// `PayloadAlreadyPresent` from the store if `owner` has `kind`, plus
    /// the errors of [`Self::register_link`].
    pub fn add_link<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        payload: Value,
        linked: EntityId,
        removable: bool,
    ) -> Result<LinkListHandle> {
        self.link(sink, owner, kind, payload, linked, removable, false)
            .map_err(|e| e.in_operation("add_link"))
    }

    /// Overwrites `owner`'s existing `kind` component with `payload`, then
    /// registers the link in a resolved list.
    ///
    /// # Errors
    ///
    /// `PayloadAbsent` from the store if `owner` lacks `kind`, plus the
    /// errors of [`Self::register_link_in`].
    pub fn set_link_in<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        payload: Value,
        list: LinkListHandle,
        removable: bool,
    ) -> Result<()> {
        self.link(sink, owner, kind, payload, list.linked, removable, true)
            .map(|_| ())
            .map_err(|e| e.in_operation("set_link"))
    }

    /// Overwrites `owner`'s existing `kind` component with `payload`, then
    /// registers the link with `linked`.
    ///
    /// # Errors
    ///
    /// `PayloadAbsent` from the store if `owner` lacks `kind`, plus the
    /// errors of [`Self::register_link`].
    pub fn set_link<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        payload: Value,
        linked: EntityId,
        removable: bool,
    ) -> Result<LinkListHandle> {
        self.link(sink, owner, kind, payload, linked, removable, true)
            .map_err(|e| e.in_operation("set_link"))
    }

    // Attach goes first so an immediate store error leaves nothing behind.
    #[allow(clippy::too_many_arguments)]
    fn link<S: EffectSink>(
        &self,
        sink: &mut S,
        owner: EntityId,
        kind: KeywordId,
        payload: Value,
        linked: EntityId,
        removable: bool,
        overwrite: bool,
    ) -> Result<LinkListHandle> {
        self.check_link(sink, owner, kind, linked)?;
        self.check_list_target(sink, linked)?;

        let attach = if overwrite {
            Command::SetComponent {
                entity: owner,
                component: kind,
                value: payload,
            }
        } else {
            Command::AddComponent {
                entity: owner,
                component: kind,
                value: payload,
            }
        };
        sink.submit(attach)?;

        let list = self.list_for_registration(sink, linked)?;
        self.append(sink, owner, kind, linked, removable)?;
        Ok(list)
    }

    // --- Lookup ---

    /// Finds the record matching `key` in a list, with its index.
    ///
    /// `linked` is the entity carrying `list`; it names the list in errors.
    ///
    /// # Errors
    ///
    /// `LinkRecordNotFound`, or `AmbiguousLink` under composite identity.
    pub fn find_record(
        &self,
        list: &LinkList,
        key: impl Into<LinkKey>,
        linked: EntityId,
    ) -> Result<(usize, LinkRecord)> {
        list.find(key.into(), self.config.identity, linked)
            .map_err(|e| e.in_operation("find_record"))
    }

    // --- Severing ---

    /// Removes the record matching `key` from a resolved list and reverts
    /// the owner's payload.
    ///
    /// The list changes at once; the owner effect goes through the sink.
    /// A record whose owner is already gone is still removed.
    ///
    /// # Errors
    ///
    /// `LinkListMissing` if the list does not exist yet, `LinkRecordNotFound`
    /// or `AmbiguousLink` on lookup; nothing is changed in those cases.
    /// Checked mode returns `OwnerNotFound` after removing a record whose
    /// owner is gone, with no owner effect issued.
    pub fn unlink_in<S: EffectSink>(
        &self,
        sink: &mut S,
        list: LinkListHandle,
        key: impl Into<LinkKey>,
    ) -> Result<LinkRecord> {
        self.sever(sink, list.linked, key.into())
            .map_err(|e| e.in_operation("unlink"))
    }

    /// Removes the record matching `key` from the list of `linked` and
    /// reverts the owner's payload.
    ///
    /// # Errors
    ///
    /// `LinkListMissing` if `linked` has no list, plus the errors of
    /// [`Self::unlink_in`].
    pub fn unlink<S: EffectSink>(
        &self,
        sink: &mut S,
        key: impl Into<LinkKey>,
        linked: EntityId,
    ) -> Result<LinkRecord> {
        let key = key.into();
        let list = self
            .resolve(sink, linked)
            .map_err(|e| e.in_operation("unlink"))?;
        self.unlink_in(sink, list, key)
    }

    fn sever<S: EffectSink>(&self, sink: &mut S, linked: EntityId, key: LinkKey) -> Result<LinkRecord> {
        let identity = self.config.identity;
        let (index, record) = sink
            .store()
            .link_list(linked)
            .ok_or_else(|| Error::link_list_missing(linked))?
            .find(key, identity, linked)?;

        sink.link_list_mut(linked)
            .and_then(|list| list.remove(index))
            .ok_or_else(|| Error::link_record_not_found(key.owner, linked))?;
        debug!(
            owner = ?record.owner,
            ?linked,
            kind = ?record.kind,
            removable = record.removable,
            "severed link"
        );

        if self.config.is_checked() && !sink.store().exists(record.owner) {
            return Err(Error::owner_not_found(record.owner, linked));
        }
        self.revert(sink, record)?;
        Ok(record)
    }

    /// Reverts the owner side of `record` without touching any list.
    ///
    /// A removable payload is stripped. Otherwise it is removed and re-added
    /// at its default, so the owner keeps the component in a neutral state.
    ///
    /// # Errors
    ///
    /// Checked mode: `OwnerNotFound` if the owner is not live. An immediate
    /// sink also returns the store's error.
    pub fn unlink_record<S: EffectSink>(&self, sink: &mut S, record: LinkRecord) -> Result<()> {
        if self.config.is_checked() && !sink.store().exists(record.owner) {
            return Err(
                Error::owner_not_found(record.owner, EntityId::null()).in_operation("unlink_record")
            );
        }
        self.revert(sink, record)
            .map_err(|e| e.in_operation("unlink_record"))
    }

    fn revert<S: EffectSink>(&self, sink: &mut S, record: LinkRecord) -> Result<()> {
        sink.submit(Command::RemoveComponent {
            entity: record.owner,
            component: record.kind,
        })?;
        if !record.removable {
            sink.submit(Command::AddDefault {
                entity: record.owner,
                component: record.kind,
            })?;
        }
        Ok(())
    }
}
