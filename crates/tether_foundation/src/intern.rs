//! Interned component kind names.
//!
//! Every component kind (payload types, tags, the link list itself) is named
//! by a keyword. Keywords are interned so kind comparison is an integer
//! comparison.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned keyword identifier naming a component kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeywordId(pub(crate) u32);

impl KeywordId {
    /// Returns the raw index of this keyword.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    // =========================================================================
    // Reserved Keywords
    // =========================================================================
    // Interned by every `Interner` at these fixed indices.

    /// Per-entity link list component: `:link/list`
    pub const LINK_LIST: KeywordId = KeywordId(0);

    /// Participation tag for entities that own a link list: `:link/linked`
    pub const LINKED: KeywordId = KeywordId(1);

    /// Generic single-field name: `:value`
    pub const VALUE: KeywordId = KeywordId(2);
}

impl fmt::Debug for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeywordId({})", self.0)
    }
}

/// Bidirectional keyword table.
///
/// Not thread-safe; worlds hold it behind an `Arc` and copy on write.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interner {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, KeywordId>,
}

impl Interner {
    const RESERVED_KEYWORDS: &'static [&'static str] = &[
        "link/list",   // KeywordId(0) = LINK_LIST
        "link/linked", // KeywordId(1) = LINKED
        "value",       // KeywordId(2) = VALUE
    ];

    /// Creates an interner with the reserved keywords already present.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self::default();
        for (i, &name) in Self::RESERVED_KEYWORDS.iter().enumerate() {
            let id = interner.intern_keyword(name);
            debug_assert_eq!(id.0 as usize, i, "reserved keyword '{name}' out of place");
        }
        interner
    }

    /// Interns a keyword, returning the existing id if already known.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` keywords are interned.
    pub fn intern_keyword(&mut self, name: &str) -> KeywordId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = KeywordId(u32::try_from(self.names.len()).expect("too many interned keywords"));
        let name: Arc<str> = name.into();
        self.names.push(Arc::clone(&name));
        self.ids.insert(name, id);
        id
    }

    /// Looks up a keyword by name without interning it.
    #[must_use]
    pub fn lookup_keyword(&self, name: &str) -> Option<KeywordId> {
        self.ids.get(name).copied()
    }

    /// Returns the name of an interned keyword.
    #[must_use]
    pub fn get_keyword(&self, id: KeywordId) -> Option<&str> {
        self.names.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Number of interned keywords, reserved ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: reserved keywords are interned on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
