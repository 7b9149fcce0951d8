use crate::model::{Incident, IncidentPatch, NewIncident};
use crate::store::{Draft, Record, Row, RowMeta, Table};

impl Record for Incident {
    const TABLE: Table = Table::Incidents;
    type Draft = NewIncident;

    fn from_draft(meta: RowMeta, draft: NewIncident) -> Self {
        Self {
            id: meta.id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            status: draft.status,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }

    fn meta(&self) -> RowMeta {
        RowMeta {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn set_meta(&mut self, meta: RowMeta) {
        self.id = meta.id;
        self.created_at = meta.created_at;
        self.updated_at = meta.updated_at;
    }

    fn into_row(self) -> Row {
        Row::Incident(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Incident(incident) => Some(incident),
            _ => None,
        }
    }

    fn wrap_draft(draft: NewIncident) -> Draft {
        Draft::Incident(draft)
    }
}

impl Incident {
    /// Applies the fields present in `patch`; absent fields keep their current value.
    ///
    /// Store-assigned columns are never touched here.
    pub fn merge(&mut self, patch: IncidentPatch) {
        let IncidentPatch {
            title,
            description,
            location,
            status,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(location) = location {
            self.location = Some(location);
        }
        if let Some(status) = status {
            self.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IncidentStatus;
    use chrono::Utc;

    fn incident() -> Incident {
        let now = Utc::now();
        Incident::from_draft(
            RowMeta {
                id: 3,
                created_at: now,
                updated_at: now,
            },
            NewIncident {
                title: "Flood".into(),
                description: "River overflow reported".into(),
                location: None,
                status: IncidentStatus::Open,
            },
        )
    }

    #[test]
    fn test_merge_applies_only_present_fields() {
        let mut merged = incident();
        merged.merge(IncidentPatch {
            status: Some(IncidentStatus::Closed),
            location: Some("North bridge".into()),
            ..Default::default()
        });

        let original = incident();
        assert_eq!(merged.status, IncidentStatus::Closed);
        assert_eq!(merged.location.as_deref(), Some("North bridge"));
        assert_eq!(merged.title, original.title);
        assert_eq!(merged.description, original.description);
        assert_eq!(merged.id, 3);
    }

    #[test]
    fn test_row_round_trip_keeps_table() {
        let row = incident().into_row();
        assert_eq!(row.table(), Table::Incidents);
        assert!(crate::model::Resource::from_row(row.clone()).is_none());
        assert_eq!(Incident::from_row(row).map(|i| i.id), Some(3));
    }
}
