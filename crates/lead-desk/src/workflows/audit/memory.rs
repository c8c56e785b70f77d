use std::sync::{Arc, Mutex};

use super::domain::{AuditError, AuditKind, AuditLog, AuditRecord};

/// Process-local audit trail. Cloning shares the same record list.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn of_kind(&self, kind: AuditKind) -> Vec<AuditRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.kind == kind)
            .collect()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, record: AuditRecord) -> Result<(), AuditError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AuditError::Unavailable("audit mutex poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }
}
