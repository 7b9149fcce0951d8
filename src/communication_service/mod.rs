//! Communication log: create, list and get.
//!
//! Communications are append-only, so this service implements [`EntityService`] only.
//! There is no update or delete to call.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::{Communication, CommunicationCreate, Incident};
use crate::service::EntityService;
use crate::store::StoreClient;
use crate::validation::Validate;
use async_trait::async_trait;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct CommunicationService {
    store: StoreClient,
}

impl CommunicationService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntityService for CommunicationService {
    type Entity = Communication;
    type Create = CommunicationCreate;
    type Error = CommunicationError;

    fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Logs a communication against an existing incident.
    ///
    /// The incident is looked up first; the store checks the reference again inside the
    /// commit, and a failure there is reported the same way.
    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: CommunicationCreate) -> Result<Communication, CommunicationError> {
        debug!(?payload, "Creating communication");
        let draft = payload.validate()?;
        let incident_id = draft.incident_id;

        let mut session = self.store.session().await?;
        if session.get::<Incident>(incident_id).await?.is_none() {
            warn!(incident_id, "Unknown incident");
            return Err(CommunicationError::UnknownIncident { incident_id });
        }

        let mut tx = session.begin();
        tx.insert::<Communication>(draft);
        let communication: Communication = tx.commit_returning().await?;

        info!(
            id = communication.id,
            incident_id,
            channel = communication.channel.as_str(),
            "Communication logged"
        );
        Ok(communication)
    }
}
