//! The lifecycle contract shared by the entity services.
//!
//! [`EntityService`] covers create, list and get. [`MutableService`] adds update and
//! delete and is only implemented by services whose entities may change, so an
//! append-only family cannot be asked to mutate at compile time.

mod class;

pub use class::{Classify, ErrorClass};

use crate::store::{Record, RowId, StoreClient, StoreError};
use async_trait::async_trait;

/// Trait for entity services to inherit the standard read operations.
///
/// Implementors supply `create` (validation rules differ per entity); `list` and `get`
/// come for free.
#[async_trait]
pub trait EntityService: Clone + Send + Sync + 'static {
    type Entity: Record;

    /// The raw inbound creation payload.
    type Create: Send + 'static;

    /// The entity-specific error type.
    type Error: std::error::Error + Classify + From<StoreError> + Send + Sync + 'static;

    /// Access the store handle.
    fn store(&self) -> &StoreClient;

    async fn create(&self, payload: Self::Create) -> Result<Self::Entity, Self::Error>;

    /// All entities in ascending id order.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Self::Entity>, Self::Error> {
        tracing::debug!("Sending request");
        let session = self.store().session().await?;
        Ok(session.list::<Self::Entity>().await?)
    }

    /// Fetch an entity by id. A nonexistent id is `Ok(None)`.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: RowId) -> Result<Option<Self::Entity>, Self::Error> {
        tracing::debug!("Sending request");
        let session = self.store().session().await?;
        Ok(session.get::<Self::Entity>(id).await?)
    }
}

/// Update and delete, for entity families that allow them.
#[async_trait]
pub trait MutableService: EntityService {
    /// The raw inbound partial update.
    type Update: Send + 'static;

    /// Apply the supplied fields. `Ok(None)` if the id does not exist.
    async fn update(
        &self,
        id: RowId,
        payload: Self::Update,
    ) -> Result<Option<Self::Entity>, Self::Error>;

    /// Delete by id. Deleting an absent id succeeds.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: RowId) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        let mut session = self.store().session().await?;
        let mut tx = session.begin();
        tx.delete::<Self::Entity>(id);
        tx.commit().await?;
        Ok(())
    }
}
