//! Incident lifecycle: create, list, get, update and delete.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::{Incident, IncidentCreate, IncidentUpdate};
use crate::service::{EntityService, MutableService};
use crate::store::{RowId, StoreClient, StoreError};
use crate::validation::{required, Validate};
use async_trait::async_trait;
use tracing::{debug, info};

#[derive(Clone)]
pub struct IncidentService {
    store: StoreClient,
}

impl IncidentService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntityService for IncidentService {
    type Entity = Incident;
    type Create = IncidentCreate;
    type Error = IncidentError;

    fn store(&self) -> &StoreClient {
        &self.store
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: IncidentCreate) -> Result<Incident, IncidentError> {
        debug!(?payload, "Creating incident");
        // Presence is checked ahead of the field rules.
        required("title", &payload.title)?;
        required("description", &payload.description)?;
        let draft = payload.validate()?;

        let mut session = self.store.session().await?;
        let mut tx = session.begin();
        tx.insert::<Incident>(draft);
        let incident: Incident = tx.commit_returning().await?;

        info!(id = incident.id, status = incident.status.as_str(), "Incident created");
        Ok(incident)
    }
}

#[async_trait]
impl MutableService for IncidentService {
    type Update = IncidentUpdate;

    #[tracing::instrument(skip(self, payload))]
    async fn update(
        &self,
        id: RowId,
        payload: IncidentUpdate,
    ) -> Result<Option<Incident>, IncidentError> {
        debug!(?payload, "Updating incident");
        let patch = payload.validate()?;

        let mut session = self.store.session().await?;
        let Some(mut incident) = session.get::<Incident>(id).await? else {
            debug!("Incident not found");
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(incident));
        }

        incident.merge(patch);
        let mut tx = session.begin();
        tx.update(incident);
        match tx.commit_returning::<Incident>().await {
            Ok(updated) => {
                info!(id, status = updated.status.as_str(), "Incident updated");
                Ok(Some(updated))
            }
            // Deleted between the read and the commit.
            Err(StoreError::RowNotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
