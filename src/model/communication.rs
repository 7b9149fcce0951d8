use crate::store::RowId;
use crate::validation::Choice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message logged against an incident. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Communication {
    pub id: RowId,
    pub incident_id: RowId,
    pub message: String,
    pub channel: Channel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Phone,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Phone => "phone",
        }
    }
}

impl Choice for Channel {
    const NAMES: &'static [&'static str] = &["email", "sms", "phone"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Channel::Email),
            "sms" => Some(Channel::Sms),
            "phone" => Some(Channel::Phone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunicationCreate {
    pub incident_id: i64,
    pub message: String,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCommunication {
    pub incident_id: RowId,
    pub message: String,
    pub channel: Channel,
}
