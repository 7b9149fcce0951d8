use crate::model::{Communication, NewCommunication};
use crate::store::{Draft, Record, Row, RowMeta, Table};

impl Record for Communication {
    const TABLE: Table = Table::Communications;
    type Draft = NewCommunication;

    fn from_draft(meta: RowMeta, draft: NewCommunication) -> Self {
        Self {
            id: meta.id,
            incident_id: draft.incident_id,
            message: draft.message,
            channel: draft.channel,
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
        Row::Communication(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Communication(communication) => Some(communication),
            _ => None,
        }
    }

    fn wrap_draft(draft: NewCommunication) -> Draft {
        Draft::Communication(draft)
    }
}
