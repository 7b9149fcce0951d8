//! Services against a scripted store.
//!
//! Pattern: real service, mocked store. Each test scripts the exact store traffic the
//! operation should produce, injects failures where needed, and `verify()`s that nothing
//! else was sent.

use chrono::Utc;
use emergency_records::communication_service::{CommunicationError, CommunicationService};
use emergency_records::incident_service::{IncidentError, IncidentService};
use emergency_records::model::{
    CommunicationCreate, Incident, IncidentCreate, IncidentStatus, IncidentUpdate, ResourceCreate,
};
use emergency_records::resource_service::{ResourceError, ResourceService};
use emergency_records::service::{Classify, EntityService, ErrorClass, MutableService};
use emergency_records::store::mock::MockStore;
use emergency_records::store::{Record, StoreError, Table, Write};

fn stored_incident(id: i64) -> Incident {
    let now = Utc::now();
    Incident {
        id,
        title: "Flood".to_string(),
        description: "River overflow reported".to_string(),
        location: None,
        status: IncidentStatus::Open,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_validation_failure_sends_nothing() {
    let mock = MockStore::new();
    let service = IncidentService::new(mock.client());

    let err = service
        .create(IncidentCreate {
            title: "Flood".to_string(),
            description: "short".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    let err = service
        .update(
            1,
            IncidentUpdate {
                status: Some("pending".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    mock.verify();
}

#[tokio::test]
async fn test_commit_failure_is_a_storage_error() {
    let mock = MockStore::new();
    mock.expect_commit()
        .return_err(StoreError::Backend("disk full".to_string()));

    let service = ResourceService::new(mock.client());
    let err = service
        .create(ResourceCreate {
            kind: "ambulance".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err, ResourceError::Storage(StoreError::Backend("disk full".to_string())));
    assert_eq!(err.class(), ErrorClass::Storage);
    mock.verify();
}

#[tokio::test]
async fn test_update_sends_merged_row() {
    let mock = MockStore::new();
    let current = stored_incident(4);
    let mut expected = current.clone();
    expected.status = IncidentStatus::Closed;

    mock.expect_get(Table::Incidents)
        .return_ok(Some(current.clone().into_row()));
    mock.expect_commit().return_ok(vec![expected.clone().into_row()]);

    let service = IncidentService::new(mock.client());
    let updated = service
        .update(
            4,
            IncidentUpdate {
                status: Some("closed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, Some(expected.clone()));

    assert_eq!(
        mock.committed(),
        vec![vec![Write::Update(expected.into_row())]]
    );
    mock.verify();
}

#[tokio::test]
async fn test_update_of_row_deleted_before_commit_is_not_found() {
    let mock = MockStore::new();
    mock.expect_get(Table::Incidents)
        .return_ok(Some(stored_incident(9).into_row()));
    mock.expect_commit().return_err(StoreError::RowNotFound {
        table: Table::Incidents,
        id: 9,
    });

    let service = IncidentService::new(mock.client());
    let result = service
        .update(
            9,
            IncidentUpdate {
                title: Some("Flash flood".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(result, Ok(None));
    mock.verify();
}

#[tokio::test]
async fn test_restrict_violation_maps_to_referenced() {
    let mock = MockStore::new();
    mock.expect_commit().return_err(StoreError::RestrictViolation {
        table: Table::Incidents,
        id: 2,
        referenced_by: Table::Communications,
        count: 3,
    });

    let service = IncidentService::new(mock.client());
    let err = service.delete(2).await.unwrap_err();
    assert_eq!(err, IncidentError::Referenced { id: 2, count: 3 });
    assert_eq!(err.class(), ErrorClass::ReferentialIntegrity);
    mock.verify();
}

/// The incident exists at lookup time but is gone when the insert commits.
#[tokio::test]
async fn test_foreign_key_race_is_referential() {
    let mock = MockStore::new();
    mock.expect_get(Table::Incidents)
        .return_ok(Some(stored_incident(5).into_row()));
    mock.expect_commit().return_err(StoreError::ForeignKeyViolation {
        table: Table::Communications,
        column: "incident_id",
        value: 5,
    });

    let service = CommunicationService::new(mock.client());
    let err = service
        .create(CommunicationCreate {
            incident_id: 5,
            message: "Evacuate sector 3".to_string(),
            channel: "phone".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, CommunicationError::UnknownIncident { incident_id: 5 });
    mock.verify();
}

#[tokio::test]
async fn test_read_failure_surfaces_as_storage() {
    let mock = MockStore::new();
    mock.expect_list(Table::Communications)
        .return_err(StoreError::Timeout(std::time::Duration::from_secs(5)));

    let service = CommunicationService::new(mock.client());
    let err = service.list().await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Storage);
    mock.verify();
}
