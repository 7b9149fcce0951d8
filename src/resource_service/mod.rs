//! Resource lifecycle: create, list, get, update and delete.
//!
//! Structurally the same as the incident service, with its own field rules.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::{Resource, ResourceCreate, ResourceUpdate};
use crate::service::{EntityService, MutableService};
use crate::store::{RowId, StoreClient, StoreError};
use crate::validation::Validate;
use async_trait::async_trait;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ResourceService {
    store: StoreClient,
}

impl ResourceService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntityService for ResourceService {
    type Entity = Resource;
    type Create = ResourceCreate;
    type Error = ResourceError;

    fn store(&self) -> &StoreClient {
        &self.store
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: ResourceCreate) -> Result<Resource, ResourceError> {
        debug!(?payload, "Creating resource");
        let draft = payload.validate()?;

        let mut session = self.store.session().await?;
        let mut tx = session.begin();
        tx.insert::<Resource>(draft);
        let resource: Resource = tx.commit_returning().await?;

        info!(id = resource.id, kind = %resource.kind, "Resource created");
        Ok(resource)
    }
}

#[async_trait]
impl MutableService for ResourceService {
    type Update = ResourceUpdate;

    #[tracing::instrument(skip(self, payload))]
    async fn update(
        &self,
        id: RowId,
        payload: ResourceUpdate,
    ) -> Result<Option<Resource>, ResourceError> {
        debug!(?payload, "Updating resource");
        let patch = payload.validate()?;

        let mut session = self.store.session().await?;
        let Some(mut resource) = session.get::<Resource>(id).await? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(resource));
        }

        resource.merge(patch);
        let mut tx = session.begin();
        tx.update(resource);
        match tx.commit_returning::<Resource>().await {
            Ok(updated) => {
                info!(id, status = updated.status.as_str(), "Resource updated");
                Ok(Some(updated))
            }
            Err(StoreError::RowNotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
