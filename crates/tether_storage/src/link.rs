//! Link records and the per-entity link list.
//!
//! A linked entity carries one [`LinkList`]; each [`LinkRecord`] in it names
//! an owner whose payload depends on the linked entity.

use tether_foundation::{EntityId, Error, ErrorKind, KeywordId, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One owner's dependency on a linked entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkRecord {
    /// Payload kind attached to the owner.
    pub kind: KeywordId,
    /// Entity holding the payload.
    pub owner: EntityId,
    /// Strip the payload on unlink (`true`) or reset it to its default (`false`).
    pub removable: bool,
}

impl LinkRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(owner: EntityId, kind: KeywordId, removable: bool) -> Self {
        Self {
            kind,
            owner,
            removable,
        }
    }
}

/// How records are matched during lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkIdentity {
    /// A record is identified by its owner alone; the first match wins.
    #[default]
    Owner,
    /// A record is identified by owner and payload kind.
    OwnerAndKind,
}

/// Lookup key for a record in a link list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey {
    /// Owner to match.
    pub owner: EntityId,
    /// Payload kind to match; ignored under [`LinkIdentity::Owner`].
    pub kind: Option<KeywordId>,
}

impl LinkKey {
    /// Key matching any record of `owner`.
    #[must_use]
    pub const fn owner(owner: EntityId) -> Self {
        Self { owner, kind: None }
    }

    /// Key matching `owner` through a specific payload kind.
    #[must_use]
    pub const fn with_kind(owner: EntityId, kind: KeywordId) -> Self {
        Self {
            owner,
            kind: Some(kind),
        }
    }

    /// The key that identifies `record` under composite identity.
    #[must_use]
    pub const fn of(record: &LinkRecord) -> Self {
        Self::with_kind(record.owner, record.kind)
    }

    fn matches(&self, record: &LinkRecord, identity: LinkIdentity) -> bool {
        if record.owner != self.owner {
            return false;
        }
        match (identity, self.kind) {
            (LinkIdentity::OwnerAndKind, Some(kind)) => record.kind == kind,
            _ => true,
        }
    }
}

impl From<EntityId> for LinkKey {
    fn from(owner: EntityId) -> Self {
        Self::owner(owner)
    }
}

/// Ordered list of link records carried by a linked entity.
///
/// Order is append order; removal is by index and preserves the order of
/// the remaining records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkList {
    records: Vec<LinkRecord>,
}

impl LinkList {
    /// Creates an empty list with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, record: LinkRecord) {
        self.records.push(record);
    }

    /// Removes and returns the record at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<LinkRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Gets the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LinkRecord> {
        self.records.get(index)
    }

    /// Iterates records in append order.
    pub fn iter(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the list has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if any record matches `key`.
    #[must_use]
    pub fn contains(&self, key: LinkKey, identity: LinkIdentity) -> bool {
        self.records.iter().any(|r| key.matches(r, identity))
    }

    /// Finds the record matching `key`, returning its index.
    ///
    /// `linked` is the entity carrying this list and only names it in errors.
    ///
    /// # Errors
    ///
    /// `LinkRecordNotFound` when nothing matches. Under
    /// [`LinkIdentity::OwnerAndKind`], an owner-only key matching more than
    /// one record fails with `AmbiguousLink`.
    pub fn find(
        &self,
        key: LinkKey,
        identity: LinkIdentity,
        linked: EntityId,
    ) -> Result<(usize, LinkRecord)> {
        let mut matches = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| key.matches(r, identity));

        let Some((index, record)) = matches.next() else {
            return Err(Error::link_record_not_found(key.owner, linked));
        };

        if identity == LinkIdentity::OwnerAndKind && key.kind.is_none() {
            let extra = matches.count();
            if extra > 0 {
                return Err(Error::new(ErrorKind::AmbiguousLink {
                    owner: key.owner,
                    linked,
                    count: extra + 1,
                }));
            }
        }
        Ok((index, *record))
    }
}

impl<'a> IntoIterator for &'a LinkList {
    type Item = &'a LinkRecord;
    type IntoIter = std::slice::Iter<'a, LinkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
