//! # Transport Boundary
//!
//! [`EmergencyApi`] names every logical operation a transport would route to, and turns
//! service results into HTTP-equivalent replies: a status code plus either a body or an
//! error detail.
//!
//! Each call runs as its own Tokio task inside a `request` span. Storage failures and
//! panicking tasks are logged here with their full cause and answered with a generic
//! 500; client errors carry their message through.

use crate::communication_service::CommunicationService;
use crate::incident_service::IncidentService;
use crate::model::{
    Communication, CommunicationCreate, Incident, IncidentCreate, IncidentUpdate, Resource,
    ResourceCreate, ResourceUpdate,
};
use crate::resource_service::ResourceService;
use crate::service::{Classify, EntityService, ErrorClass, MutableService};
use crate::store::RowId;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use tracing::{error, warn, Instrument};

/// Success status of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    NoContent,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: Status,
    pub body: T,
}

impl<T> Reply<T> {
    fn ok(body: T) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }

    fn created(body: T) -> Self {
        Self {
            status: Status::Created,
            body,
        }
    }
}

impl Reply<()> {
    fn no_content() -> Self {
        Self {
            status: Status::NoContent,
            body: (),
        }
    }
}

/// A failed request as a transport would render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    fn not_found(entity: &str) -> Self {
        Self {
            status: ErrorClass::NotFound.status(),
            detail: format!("{} not found", entity),
        }
    }

    fn internal() -> Self {
        Self {
            status: ErrorClass::Storage.status(),
            detail: "Internal server error".to_string(),
        }
    }
}

pub type ApiResult<T> = Result<Reply<T>, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Health {
    pub status: &'static str,
}

fn reject<E: Classify + Display>(e: E) -> ApiError {
    let class = e.class();
    if class.is_client_error() {
        warn!(status = class.status(), error = %e, "Request rejected");
        ApiError {
            status: class.status(),
            detail: e.to_string(),
        }
    } else {
        error!(error = %e, "Request failed");
        ApiError::internal()
    }
}

/// Runs one request as an independent task.
async fn dispatch<T, F>(operation: &'static str, request: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: Future<Output = ApiResult<T>> + Send + 'static,
{
    let span = tracing::info_span!("request", operation);
    match tokio::spawn(request.instrument(span)).await {
        Ok(result) => result,
        Err(e) => {
            error!(operation, error = %e, "Request task failed");
            Err(ApiError::internal())
        }
    }
}

async fn create<S: EntityService>(service: S, payload: S::Create) -> ApiResult<S::Entity> {
    service.create(payload).await.map(Reply::created).map_err(reject)
}

async fn list<S: EntityService>(service: S) -> ApiResult<Vec<S::Entity>> {
    service.list().await.map(Reply::ok).map_err(reject)
}

async fn get<S: EntityService>(service: S, id: RowId, entity: &'static str) -> ApiResult<S::Entity> {
    match service.get(id).await.map_err(reject)? {
        Some(found) => Ok(Reply::ok(found)),
        None => Err(ApiError::not_found(entity)),
    }
}

async fn update<S: MutableService>(
    service: S,
    id: RowId,
    payload: S::Update,
    entity: &'static str,
) -> ApiResult<S::Entity> {
    match service.update(id, payload).await.map_err(reject)? {
        Some(updated) => Ok(Reply::ok(updated)),
        None => Err(ApiError::not_found(entity)),
    }
}

// The service delete is idempotent; the boundary reports a missing id as 404.
async fn delete<S: MutableService>(service: S, id: RowId, entity: &'static str) -> ApiResult<()> {
    if service.get(id).await.map_err(reject)?.is_none() {
        return Err(ApiError::not_found(entity));
    }
    service.delete(id).await.map_err(reject)?;
    Ok(Reply::no_content())
}

/// The in-process request surface.
#[derive(Clone)]
pub struct EmergencyApi {
    incidents: IncidentService,
    resources: ResourceService,
    communications: CommunicationService,
}

impl EmergencyApi {
    pub fn new(
        incidents: IncidentService,
        resources: ResourceService,
        communications: CommunicationService,
    ) -> Self {
        Self {
            incidents,
            resources,
            communications,
        }
    }

    pub async fn health(&self) -> ApiResult<Health> {
        Ok(Reply::ok(Health { status: "healthy" }))
    }

    // --- Incidents ---

    pub async fn create_incident(&self, payload: IncidentCreate) -> ApiResult<Incident> {
        dispatch("create_incident", create(self.incidents.clone(), payload)).await
    }

    pub async fn list_incidents(&self) -> ApiResult<Vec<Incident>> {
        dispatch("list_incidents", list(self.incidents.clone())).await
    }

    pub async fn get_incident(&self, id: RowId) -> ApiResult<Incident> {
        dispatch("get_incident", get(self.incidents.clone(), id, "Incident")).await
    }

    pub async fn update_incident(&self, id: RowId, payload: IncidentUpdate) -> ApiResult<Incident> {
        dispatch(
            "update_incident",
            update(self.incidents.clone(), id, payload, "Incident"),
        )
        .await
    }

    pub async fn delete_incident(&self, id: RowId) -> ApiResult<()> {
        dispatch("delete_incident", delete(self.incidents.clone(), id, "Incident")).await
    }

    // --- Resources ---

    pub async fn create_resource(&self, payload: ResourceCreate) -> ApiResult<Resource> {
        dispatch("create_resource", create(self.resources.clone(), payload)).await
    }

    pub async fn list_resources(&self) -> ApiResult<Vec<Resource>> {
        dispatch("list_resources", list(self.resources.clone())).await
    }

    pub async fn get_resource(&self, id: RowId) -> ApiResult<Resource> {
        dispatch("get_resource", get(self.resources.clone(), id, "Resource")).await
    }

    pub async fn update_resource(&self, id: RowId, payload: ResourceUpdate) -> ApiResult<Resource> {
        dispatch(
            "update_resource",
            update(self.resources.clone(), id, payload, "Resource"),
        )
        .await
    }

    pub async fn delete_resource(&self, id: RowId) -> ApiResult<()> {
        dispatch("delete_resource", delete(self.resources.clone(), id, "Resource")).await
    }

    // --- Communications ---

    pub async fn create_communication(&self, payload: CommunicationCreate) -> ApiResult<Communication> {
        dispatch(
            "create_communication",
            create(self.communications.clone(), payload),
        )
        .await
    }

    pub async fn list_communications(&self) -> ApiResult<Vec<Communication>> {
        dispatch("list_communications", list(self.communications.clone())).await
    }

    pub async fn get_communication(&self, id: RowId) -> ApiResult<Communication> {
        dispatch(
            "get_communication",
            get(self.communications.clone(), id, "Communication"),
        )
        .await
    }
}
