//! Model registry: append-only storage of model listings.

use std::collections::HashMap;

use mart_core::{ModelId, Principal};
use tracing::debug;

use crate::error::{MarketError, Result};
use crate::model::{AIModel, Category, ModelListing};

/// Stores every registered model, indexed by id.
///
/// Ids are dense: model `n` lives in slot `n - 1`, so the next id is always
/// `len + 1` and no id is ever reused.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<AIModel>,
    by_creator: HashMap<Principal, Vec<ModelId>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry (and its creator index) from stored models.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if ids are not exactly `1..=n` in
    /// order or a model has a null creator.
    pub fn from_models(models: Vec<AIModel>) -> Result<Self> {
        let mut registry = Self::new();
        for model in models {
            let expected = registry.next_id();
            if model.id != expected {
                return Err(MarketError::invalid_input(format!(
                    "model ids must be dense: expected {expected}, found {}",
                    model.id
                )));
            }
            if model.creator.is_null() {
                return Err(MarketError::invalid_input(format!(
                    "{} has no creator",
                    model.id
                )));
            }
            registry.insert(model);
        }
        debug!(models = registry.len(), "rebuilt model registry");
        Ok(registry)
    }

    /// Validates `listing` and stores it under the next id.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` for a null creator or an invalid
    /// listing; nothing is stored in that case.
    pub fn register(&mut self, creator: &Principal, listing: ModelListing) -> Result<ModelId> {
        if creator.is_null() {
            return Err(MarketError::invalid_input("creator must not be empty"));
        }
        listing.validate()?;

        let id = self.next_id();
        self.insert(AIModel::from_listing(id, creator.clone(), listing));
        Ok(id)
    }

    fn insert(&mut self, model: AIModel) {
        self.by_creator
            .entry(model.creator.clone())
            .or_default()
            .push(model.id);
        self.models.push(model);
    }

    /// The id the next registration will receive.
    #[must_use]
    pub fn next_id(&self) -> ModelId {
        ModelId::new(self.last_id() + 1)
    }

    /// The most recently allocated id (0 if none).
    #[must_use]
    pub fn last_id(&self) -> u64 {
        self.models.len() as u64
    }

    fn slot(&self, id: ModelId) -> Option<usize> {
        let index = usize::try_from(id.value().checked_sub(1)?).ok()?;
        (index < self.models.len()).then_some(index)
    }

    /// True iff `1 <= id <= last_id` and the slot has a creator.
    #[must_use]
    pub fn exists(&self, id: ModelId) -> bool {
        self.get(id).is_some_and(|m| !m.creator.is_null())
    }

    /// Looks up a model.
    #[must_use]
    pub fn get(&self, id: ModelId) -> Option<&AIModel> {
        self.slot(id).map(|i| &self.models[i])
    }

    /// Looks up a model, failing with `ModelNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::ModelNotFound` if the model does not exist.
    pub fn require(&self, id: ModelId) -> Result<&AIModel> {
        self.get(id)
            .filter(|m| !m.creator.is_null())
            .ok_or(MarketError::ModelNotFound(id))
    }

    pub(crate) fn require_mut(&mut self, id: ModelId) -> Result<&mut AIModel> {
        let index = self.slot(id).ok_or(MarketError::ModelNotFound(id))?;
        Ok(&mut self.models[index])
    }

    /// Active models in `category`, ascending by id.
    #[must_use]
    pub fn list_by_category(&self, category: Category) -> Vec<ModelId> {
        self.models
            .iter()
            .filter(|m| m.is_active && m.category == category)
            .map(|m| m.id)
            .collect()
    }

    /// Models registered by `creator`, in registration order.
    #[must_use]
    pub fn by_creator(&self, creator: &Principal) -> Vec<ModelId> {
        self.by_creator.get(creator).cloned().unwrap_or_default()
    }

    /// All models, ascending by id.
    #[must_use]
    pub fn models(&self) -> &[AIModel] {
        &self.models
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no model has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
