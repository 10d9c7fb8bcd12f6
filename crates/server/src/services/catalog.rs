//! Create, fetch, list and link for every node kind

use std::marker::PhantomData;

use aegis_core::{CatalogEntity, ClinicalError, Relation};
use uuid::Uuid;

use crate::db::SharedStore;

/// Generic entity service; `T` picks the node kind
pub struct CatalogService<T> {
    store: SharedStore,
    _kind: PhantomData<T>,
}

impl<T: CatalogEntity> CatalogService<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Validate, assign a fresh id, and persist
    pub async fn create(&self, new: T::New) -> Result<T, ClinicalError> {
        let entity = T::from_new(Uuid::new_v4().to_string(), new)?;
        let stored = self.store.create_node(entity.into_node()).await?;
        let created = T::from_node(stored).ok_or_else(|| {
            ClinicalError::InvalidData(format!("store returned a node that is not a {}", T::KIND.label()))
        })?;
        tracing::info!(kind = T::KIND.label(), id = %created.id(), "Node created");
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<T, ClinicalError> {
        self.store
            .get_node(T::KIND, id)
            .await?
            .and_then(T::from_node)
            .ok_or_else(|| ClinicalError::not_found(T::KIND.noun(), id))
    }

    /// Every node of this kind, ordered by name then id
    pub async fn list(&self) -> Result<Vec<T>, ClinicalError> {
        Ok(self
            .store
            .list_nodes(T::KIND)
            .await?
            .into_iter()
            .filter_map(T::from_node)
            .collect())
    }

    /// Idempotently link this entity to a target; either endpoint missing is `NotFound`
    pub async fn link(&self, relation: Relation, id: &str, target_id: &str) -> Result<(), ClinicalError> {
        if relation.source() != T::KIND {
            return Err(ClinicalError::Validation(format!(
                "{} does not start at {}",
                relation.rel_type(),
                T::KIND.label()
            )));
        }
        if self.store.link(relation, id, target_id).await? {
            tracing::info!(relation = relation.rel_type(), from = %id, to = %target_id, "Linked");
            Ok(())
        } else {
            Err(ClinicalError::NotFound(format!(
                "{} {} or {} {} not found",
                T::KIND.noun(),
                id,
                relation.target().noun().to_lowercase(),
                target_id
            )))
        }
    }
}
