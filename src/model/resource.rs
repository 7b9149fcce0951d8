use crate::store::RowId;
use crate::validation::Choice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of response capacity (vehicle, team, equipment).
///
/// Independent of incidents: nothing in the store links the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: RowId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub status: ResourceStatus,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    #[default]
    Available,
    Unavailable,
    Deployed,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Unavailable => "unavailable",
            ResourceStatus::Deployed => "deployed",
        }
    }
}

impl Choice for ResourceStatus {
    const NAMES: &'static [&'static str] = &["available", "unavailable", "deployed"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "available" => Some(ResourceStatus::Available),
            "unavailable" => Some(ResourceStatus::Unavailable),
            "deployed" => Some(ResourceStatus::Deployed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCreate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceUpdate {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub kind: String,
    pub name: Option<String>,
    pub status: ResourceStatus,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePatch {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub status: Option<ResourceStatus>,
    pub location: Option<String>,
}

impl ResourcePatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.name.is_none() && self.status.is_none() && self.location.is_none()
    }
}
