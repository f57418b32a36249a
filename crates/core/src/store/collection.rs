//! In-memory collection shared by the store backends

use uuid::Uuid;

use super::{Document, StoredRecord};

/// Ordered set of records belonging to one collection
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    records: Vec<StoredRecord>,
}

impl Collection {
    pub(crate) fn from_records(records: Vec<StoredRecord>) -> Self {
        Self { records }
    }

    pub(crate) fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub(crate) fn insert(&mut self, doc: Document) -> StoredRecord {
        let record = StoredRecord {
            id: Uuid::new_v4().to_string(),
            doc,
        };
        self.records.push(record.clone());
        record
    }

    pub(crate) fn get(&self, id: &str) -> Option<&StoredRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn replace(&mut self, id: &str, doc: Document) -> Option<StoredRecord> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.doc = doc;
        Some(record.clone())
    }

    pub(crate) fn merge(&mut self, id: &str, fields: Document) -> Option<StoredRecord> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        for (key, value) in fields {
            record.doc.insert(key, value);
        }
        Some(record.clone())
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<StoredRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }
}
