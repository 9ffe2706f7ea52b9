//! Ownership-token registry seam.
//!
//! Registering a model mints an ownership token for its creator. The token is
//! a side notification only: nothing in the marketplace consults it for
//! access decisions.

use std::collections::BTreeMap;

use mart_core::{ModelId, Principal};
use parking_lot::RwLock;
use tracing::info;

/// External registry that records who owns a model.
pub trait OwnershipRegistry: Send + Sync {
    /// Mints an ownership token for `model_id` to `owner`. Fire-and-forget.
    fn mint_ownership_token(&self, owner: &Principal, model_id: ModelId);
}

/// Simulated registry that remembers every minted token.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipRegistry {
    tokens: RwLock<BTreeMap<ModelId, Principal>>,
}

impl InMemoryOwnershipRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of the token minted for `model_id`, if any.
    #[must_use]
    pub fn owner_of(&self, model_id: ModelId) -> Option<Principal> {
        self.tokens.read().get(&model_id).cloned()
    }

    /// Number of tokens minted.
    #[must_use]
    pub fn minted(&self) -> usize {
        self.tokens.read().len()
    }
}

impl OwnershipRegistry for InMemoryOwnershipRegistry {
    fn mint_ownership_token(&self, owner: &Principal, model_id: ModelId) {
        self.tokens.write().insert(model_id, owner.clone());
        info!(owner = %owner, model_id = %model_id, "ownership token minted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_records_owner() {
        let registry = InMemoryOwnershipRegistry::new();
        assert_eq!(registry.minted(), 0);

        registry.mint_ownership_token(&Principal::new("creator"), ModelId::new(1));

        assert_eq!(registry.minted(), 1);
        assert_eq!(registry.owner_of(ModelId::new(1)), Some(Principal::new("creator")));
        assert_eq!(registry.owner_of(ModelId::new(2)), None);
    }
}
