//! Demo binary: starts the system, runs the flood scenario through the api, shuts down.
//!
//! Every flag can also be set through its `EMERGENCY_*` environment variable.

use clap::Parser;
use emergency_records::config::{DeletePolicy, StoreConfig, DEFAULT_DATABASE_URL};
use emergency_records::lifecycle::{setup_tracing, EmergencySystem};
use emergency_records::model::{CommunicationCreate, IncidentCreate, ResourceCreate, ResourceUpdate};
use tracing::{info, Instrument};

#[derive(Debug, Parser)]
#[command(name = "emergency-records", about = "Emergency records backend demo")]
struct Cli {
    /// SQLite database to keep the records in; created if missing.
    #[arg(long, env = "EMERGENCY_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Capacity of the store request channel.
    #[arg(long, env = "EMERGENCY_CHANNEL_CAPACITY", default_value_t = 32)]
    channel_capacity: usize,

    /// Maximum number of concurrently open store sessions.
    #[arg(long, env = "EMERGENCY_MAX_SESSIONS", default_value_t = 16)]
    max_sessions: usize,

    #[arg(long, env = "EMERGENCY_ACQUIRE_TIMEOUT_MS", default_value_t = 5_000)]
    acquire_timeout_ms: u64,

    #[arg(long, env = "EMERGENCY_REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    request_timeout_ms: u64,

    /// What deleting an incident does to its communications: restrict, cascade or orphan.
    #[arg(long, env = "EMERGENCY_INCIDENT_DELETE", default_value = "restrict")]
    incident_delete: DeletePolicy,
}

impl From<Cli> for StoreConfig {
    fn from(cli: Cli) -> Self {
        StoreConfig {
            database_url: cli.database_url,
            channel_capacity: cli.channel_capacity,
            max_sessions: cli.max_sessions,
            acquire_timeout_ms: cli.acquire_timeout_ms,
            request_timeout_ms: cli.request_timeout_ms,
            incident_delete: cli.incident_delete,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let config = StoreConfig::from(Cli::parse());

    info!("Starting emergency records demo");
    let system = EmergencySystem::new(config)
        .await
        .map_err(|e| e.to_string())?;
    let api = system.api.clone();

    let health = api.health().await.map_err(|e| e.to_string())?;
    info!(status = health.body.status, "Health check");

    let span = tracing::info_span!("flood_scenario");
    async {
        let incident = api
            .create_incident(IncidentCreate {
                title: "Flood".to_string(),
                description: "River overflow reported near the east bank".to_string(),
                location: Some("East bank".to_string()),
                status: None,
            })
            .await
            .map_err(|e| e.to_string())?;
        info!(
            code = incident.status.code(),
            id = incident.body.id,
            "Incident reported"
        );

        let boat = api
            .create_resource(ResourceCreate {
                kind: "rescue boat".to_string(),
                name: Some("Boat 2".to_string()),
                status: None,
                location: Some("Harbour".to_string()),
            })
            .await
            .map_err(|e| e.to_string())?;
        let boat = api
            .update_resource(
                boat.body.id,
                ResourceUpdate {
                    status: Some("deployed".to_string()),
                    location: Some("East bank".to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        info!(id = boat.body.id, status = boat.body.status.as_str(), "Resource deployed");

        let message = api
            .create_communication(CommunicationCreate {
                incident_id: incident.body.id,
                message: "Dispatch team A".to_string(),
                channel: "sms".to_string(),
            })
            .await
            .map_err(|e| e.to_string())?;
        info!(id = message.body.id, "Communication logged");

        match api.delete_incident(incident.body.id).await {
            Ok(reply) => info!(code = reply.status.code(), "Incident deleted"),
            Err(e) => info!(code = e.status, detail = %e.detail, "Incident delete refused"),
        }

        match api.get_communication(message.body.id).await {
            Ok(logged) => info!(
                id = logged.body.id,
                incident_id = logged.body.incident_id,
                "Communication still readable"
            ),
            Err(e) => info!(code = e.status, "Communication removed with its incident"),
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    drop(api);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
