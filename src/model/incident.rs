use crate::store::RowId;
use crate::validation::Choice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An emergency event being tracked.
///
/// # Store
/// This struct implements the [`Record`](crate::store::Record) trait (see
/// `incident_service::entity`), so it is stored in the `incidents` table with:
/// - Creation payload [`NewIncident`], produced by validating an [`IncidentCreate`]
/// - Partial updates through [`IncidentPatch`], produced by validating an [`IncidentUpdate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: RowId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Open,
    Closed,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::Closed => "closed",
            IncidentStatus::Resolved => "resolved",
        }
    }
}

impl Choice for IncidentStatus {
    const NAMES: &'static [&'static str] = &["open", "closed", "resolved"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "open" => Some(IncidentStatus::Open),
            "closed" => Some(IncidentStatus::Closed),
            "resolved" => Some(IncidentStatus::Resolved),
            _ => None,
        }
    }
}

/// Inbound payload for creating an incident, as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Inbound partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated incident that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: IncidentStatus,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<IncidentStatus>,
}

impl IncidentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.status.is_none()
    }
}
