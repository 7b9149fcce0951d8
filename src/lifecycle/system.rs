use crate::api::EmergencyApi;
use crate::communication_service::CommunicationService;
use crate::config::StoreConfig;
use crate::incident_service::IncidentService;
use crate::resource_service::ResourceService;
use crate::store::{StoreActor, StoreClient, StoreError};
use tracing::{error, info};

/// The runtime orchestrator for the emergency records backend.
///
/// `EmergencySystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the store actor
/// - **Dependency Wiring**: Handing each service and the api facade a store handle
///
/// # Example
///
/// ```ignore
/// let system = EmergencySystem::new(StoreConfig::default()).await?;
///
/// let incident = system.api.create_incident(payload).await?;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct EmergencySystem {
    pub incidents: IncidentService,
    pub resources: ResourceService,
    pub communications: CommunicationService,

    /// Request surface over the three services.
    pub api: EmergencyApi,

    store: StoreClient,

    /// Task handles for running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl EmergencySystem {
    /// Opens the database, spawns the store actor and wires the services to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn new(config: StoreConfig) -> Result<Self, StoreError> {
        info!(?config, "Starting emergency system");
        let (store_actor, store) = StoreActor::connect(&config).await.map_err(|e| {
            error!(database_url = %config.database_url, error = %e, "Failed to open store");
            e
        })?;
        let store_handle = tokio::spawn(store_actor.run());

        let incidents = IncidentService::new(store.clone());
        let resources = ResourceService::new(store.clone());
        let communications = CommunicationService::new(store.clone());
        let api = EmergencyApi::new(incidents.clone(), resources.clone(), communications.clone());

        Ok(Self {
            incidents,
            resources,
            communications,
            api,
            store,
            handles: vec![store_handle],
        })
    }

    /// A raw store handle, for callers that need sessions directly.
    pub fn store(&self) -> StoreClient {
        self.store.clone()
    }

    /// Gracefully shuts down the system.
    ///
    /// Drops every handle held here, then waits for the store actor to drain its channel,
    /// close the database and exit. Handles cloned out of the system keep the store alive until they are
    /// dropped too.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all actors shut down cleanly
    /// - `Err(String)` if any actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.api);
        drop(self.incidents);
        drop(self.resources);
        drop(self.communications);
        drop(self.store);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
