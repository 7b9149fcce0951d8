//! Per-entity validation of inbound payloads.
//!
//! Each field has one rule function, used by both the create and the update path. Create
//! applies every rule; update applies a rule only to the fields that are present. Fields
//! are checked in declaration order and the first violation is returned.

use crate::model::{
    Channel, CommunicationCreate, IncidentCreate, IncidentPatch, IncidentStatus, IncidentUpdate,
    NewCommunication, NewIncident, NewResource, ResourceCreate, ResourcePatch, ResourceStatus,
    ResourceUpdate,
};
use crate::store::RowId;
use crate::validation::error::ValidationError;
use crate::validation::rules::{at_least, length, min_length, one_of, optional};

/// Turns a raw payload into its validated form.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

// --- Incident -----------------------------------------------------------------

fn incident_title(value: String) -> Result<String, ValidationError> {
    length("title", value, 3, 100)
}

fn incident_description(value: String) -> Result<String, ValidationError> {
    min_length("description", value, 10)
}

fn incident_status(value: String) -> Result<IncidentStatus, ValidationError> {
    one_of("status", &value)
}

impl Validate for IncidentCreate {
    type Output = NewIncident;

    fn validate(self) -> Result<NewIncident, ValidationError> {
        Ok(NewIncident {
            title: incident_title(self.title)?,
            description: incident_description(self.description)?,
            location: self.location,
            status: optional(self.status, incident_status)?.unwrap_or_default(),
        })
    }
}

impl Validate for IncidentUpdate {
    type Output = IncidentPatch;

    fn validate(self) -> Result<IncidentPatch, ValidationError> {
        Ok(IncidentPatch {
            title: optional(self.title, incident_title)?,
            description: optional(self.description, incident_description)?,
            location: self.location,
            status: optional(self.status, incident_status)?,
        })
    }
}

// --- Resource -----------------------------------------------------------------

fn resource_type(value: String) -> Result<String, ValidationError> {
    length("type", value, 2, 50)
}

fn resource_status(value: String) -> Result<ResourceStatus, ValidationError> {
    one_of("status", &value)
}

impl Validate for ResourceCreate {
    type Output = NewResource;

    fn validate(self) -> Result<NewResource, ValidationError> {
        Ok(NewResource {
            kind: resource_type(self.kind)?,
            name: self.name,
            status: optional(self.status, resource_status)?.unwrap_or_default(),
            location: self.location,
        })
    }
}

impl Validate for ResourceUpdate {
    type Output = ResourcePatch;

    fn validate(self) -> Result<ResourcePatch, ValidationError> {
        Ok(ResourcePatch {
            kind: optional(self.kind, resource_type)?,
            name: self.name,
            status: optional(self.status, resource_status)?,
            location: self.location,
        })
    }
}

// --- Communication ------------------------------------------------------------

fn communication_incident(value: i64) -> Result<RowId, ValidationError> {
    at_least("incident_id", value, 1)
}

fn communication_message(value: String) -> Result<String, ValidationError> {
    length("message", value, 1, 500)
}

fn communication_channel(value: String) -> Result<Channel, ValidationError> {
    one_of("channel", &value)
}

impl Validate for CommunicationCreate {
    type Output = NewCommunication;

    fn validate(self) -> Result<NewCommunication, ValidationError> {
        Ok(NewCommunication {
            incident_id: communication_incident(self.incident_id)?,
            message: communication_message(self.message)?,
            channel: communication_channel(self.channel)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Constraint;

    fn incident(title: &str, description: &str) -> IncidentCreate {
        IncidentCreate {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_incident_title_bounds() {
        let err = incident("ab", "long enough text").validate().unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.constraint, Constraint::Length { min: 3, max: 100 });

        let ok = incident("abc", "0123456789").validate().unwrap();
        assert_eq!(ok.title, "abc");
        assert_eq!(ok.status, IncidentStatus::Open);
    }

    #[test]
    fn test_incident_first_violation_wins() {
        let err = incident("ab", "short").validate().unwrap_err();
        assert_eq!(err.field, "title");

        let err = incident("abc", "short").validate().unwrap_err();
        assert_eq!(err.to_string(), "description must be at least 10 characters");
    }

    #[test]
    fn test_incident_status_must_be_known() {
        let mut payload = incident("Flood", "River overflow reported");
        payload.status = Some("pending".into());
        let err = payload.validate().unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        let patch = IncidentUpdate {
            status: Some("resolved".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.status, Some(IncidentStatus::Resolved));
        assert!(patch.title.is_none());

        let err = IncidentUpdate {
            title: Some("x".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "title");

        assert!(IncidentUpdate::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_resource_status_defaults_and_rejects_unknown() {
        let ok = ResourceCreate {
            kind: "ambulance".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(ok.status, ResourceStatus::Available);

        let err = ResourceCreate {
            kind: "ambulance".into(),
            status: Some("broken".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(
            err.to_string(),
            "status must be one of: available, unavailable, deployed"
        );
    }

    #[test]
    fn test_resource_type_bounds() {
        let long = "x".repeat(51);
        for kind in ["a", long.as_str()] {
            let err = ResourceUpdate {
                kind: Some(kind.to_string()),
                ..Default::default()
            }
            .validate()
            .unwrap_err();
            assert_eq!(err.field, "type");
        }
    }

    #[test]
    fn test_communication_rules() {
        let valid = CommunicationCreate {
            incident_id: 1,
            message: "Dispatch team A".into(),
            channel: "sms".into(),
        };
        assert_eq!(valid.clone().validate().unwrap().channel, Channel::Sms);

        let err = CommunicationCreate {
            incident_id: 0,
            ..valid.clone()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.constraint, Constraint::AtLeast { min: 1 });

        let err = CommunicationCreate {
            message: "x".repeat(501),
            ..valid.clone()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "message");

        let err = CommunicationCreate {
            channel: "pigeon".into(),
            ..valid
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field, "channel");
    }
}
