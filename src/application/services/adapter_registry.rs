use super::entity_adapter::{EntityAdapter, TypedAdapter};
use crate::domain::entities::SyncEntity;
use crate::domain::entities::business::{
    Appointment, Customer, Employee, Expense, Note, Payment, Service, Transaction, WorkingHours,
};
use crate::domain::value_objects::EntityType;
use crate::shared::error::AppError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entity type tag to adapter. Built once at startup and shared read-only.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<EntityType, Arc<dyn EntityAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_business_entities() -> Self {
        let mut registry = Self::new();
        registry
            .register::<Appointment>()
            .register::<Customer>()
            .register::<Employee>()
            .register::<Expense>()
            .register::<Note>()
            .register::<Payment>()
            .register::<Service>()
            .register::<Transaction>()
            .register::<WorkingHours>();
        registry
    }

    pub fn register<T: SyncEntity>(&mut self) -> &mut Self {
        self.register_adapter(Arc::new(TypedAdapter::<T>::new()))
    }

    /// Replaces any adapter already registered under the same tag.
    pub fn register_adapter(&mut self, adapter: Arc<dyn EntityAdapter>) -> &mut Self {
        let entity_type = adapter.entity_type();
        if self.adapters.insert(entity_type.clone(), adapter).is_some() {
            tracing::debug!(target: "sync::adapter", %entity_type, "adapter replaced");
        }
        self
    }

    pub fn get(&self, entity_type: &EntityType) -> Result<Arc<dyn EntityAdapter>, AppError> {
        self.adapters
            .get(entity_type)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No adapter registered for {entity_type}")))
    }

    pub fn entity_types(&self) -> Vec<EntityType> {
        self.adapters.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
