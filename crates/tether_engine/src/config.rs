//! Configuration for the link registry.

use tether_storage::LinkIdentity;

/// Whether registry operations check their contracts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Verify owner existence, list presence and duplicate links; violations
    /// return errors naming the entities and the operation.
    #[default]
    Checked,
    /// Skip the extra checks. The caller guarantees the contracts; a
    /// violation surfaces as whatever the store reports, if anything.
    Trusted,
}

/// Configuration for a [`crate::LinkRegistry`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    /// Contract checking.
    pub validation: ValidationMode,

    /// How link records are matched on lookup and unlink.
    pub identity: LinkIdentity,

    /// Capacity hint for newly created link lists.
    pub list_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Checked,
            identity: LinkIdentity::Owner,
            list_capacity: 1,
        }
    }
}

impl LinkConfig {
    /// Checked contracts, owner identity.
    #[must_use]
    pub fn checked() -> Self {
        Self::default()
    }

    /// Trusted caller, owner identity.
    #[must_use]
    pub fn trusted() -> Self {
        Self {
            validation: ValidationMode::Trusted,
            ..Self::default()
        }
    }

    /// Checked contracts with records identified by owner and payload kind.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            identity: LinkIdentity::OwnerAndKind,
            ..Self::default()
        }
    }

    /// Builder method to set the validation mode.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Builder method to set record identity.
    #[must_use]
    pub fn with_identity(mut self, identity: LinkIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Builder method to set the list capacity hint.
    #[must_use]
    pub fn with_list_capacity(mut self, capacity: usize) -> Self {
        self.list_capacity = capacity.max(1);
        self
    }

    /// Returns true if contracts are checked.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.validation == ValidationMode::Checked
    }
}
