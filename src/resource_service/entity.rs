use crate::model::{NewResource, Resource, ResourcePatch};
use crate::store::{Draft, Record, Row, RowMeta, Table};

impl Record for Resource {
    const TABLE: Table = Table::Resources;
    type Draft = NewResource;

    fn from_draft(meta: RowMeta, draft: NewResource) -> Self {
        Self {
            id: meta.id,
            kind: draft.kind,
            name: draft.name,
            status: draft.status,
            location: draft.location,
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
        Row::Resource(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    fn wrap_draft(draft: NewResource) -> Draft {
        Draft::Resource(draft)
    }
}

impl Resource {
    pub fn merge(&mut self, patch: ResourcePatch) {
        let ResourcePatch {
            kind,
            name,
            status,
            location,
        } = patch;

        if let Some(kind) = kind {
            self.kind = kind;
        }
        if let Some(name) = name {
            self.name = Some(name);
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(location) = location {
            self.location = Some(location);
        }
    }
}
