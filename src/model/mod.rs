//! Pure data structures: the stored entities, their raw inbound payloads, and the
//! validated values the [`validation`](crate::validation) layer turns those payloads into.

pub mod communication;
pub mod incident;
pub mod resource;

pub use communication::*;
pub use incident::*;
pub use resource::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_resource_kind_is_named_type_on_the_wire() {
        let now = Utc::now();
        let resource = Resource {
            id: 3,
            kind: "ambulance".to_string(),
            name: Some("Unit 7".to_string()),
            status: ResourceStatus::Deployed,
            location: None,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["type"], "ambulance");
        assert_eq!(value["status"], "deployed");
        assert!(value.get("kind").is_none());

        let back: Resource = serde_json::from_value(value).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_payloads_read_type_and_skip_absent_fields() {
        let create: ResourceCreate =
            serde_json::from_value(json!({ "type": "helicopter" })).unwrap();
        assert_eq!(create.kind, "helicopter");
        assert_eq!(create.status, None);

        let update: ResourceUpdate = serde_json::from_value(json!({ "status": "unavailable" })).unwrap();
        assert_eq!(update.kind, None);
        assert_eq!(update.status.as_deref(), Some("unavailable"));
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_value(IncidentStatus::Resolved).unwrap(), json!("resolved"));
        assert_eq!(serde_json::to_value(ResourceStatus::Available).unwrap(), json!("available"));
        assert_eq!(serde_json::to_value(Channel::Sms).unwrap(), json!("sms"));
        assert_eq!(
            serde_json::from_value::<Channel>(json!("phone")).unwrap(),
            Channel::Phone
        );
        assert!(serde_json::from_value::<IncidentStatus>(json!("Open")).is_err());
    }
}
