use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use super::domain::{AuditError, AuditLog, AuditRecord};
use crate::workflows::notifications::NotificationAttempt;

/// Append-only CSV audit file. Every append is flushed before it returns.
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl CsvAuditLog {
    /// Open or create the file. The header row is written only into an empty file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let is_empty = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);

        tracing::debug!(path = %path.display(), fresh = is_empty, "csv audit log opened");
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for CsvAuditLog {
    fn append(&self, record: AuditRecord) -> Result<(), AuditError> {
        let row = AuditRow::try_from(&record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AuditError::Unavailable("audit writer mutex poisoned".to_string()))?;
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct AuditRow {
    recorded_at: String,
    kind: &'static str,
    contact_name: String,
    contact_phone: String,
    contact_email: String,
    zip: String,
    source: String,
    campaign: String,
    landing_page: String,
    score: Option<u8>,
    tier: &'static str,
    summary: String,
    notifications: String,
    payload: String,
}

impl TryFrom<&AuditRecord> for AuditRow {
    type Error = AuditError;

    fn try_from(record: &AuditRecord) -> Result<Self, Self::Error> {
        let tracking = record.tracking.clone().unwrap_or_default();
        Ok(Self {
            recorded_at: record.recorded_at.to_rfc3339(),
            kind: record.kind.label(),
            contact_name: record.contact.name.clone(),
            contact_phone: record.contact.phone.clone().unwrap_or_default(),
            contact_email: record.contact.email.clone().unwrap_or_default(),
            zip: record.contact.zip.clone().unwrap_or_default(),
            source: tracking.source.unwrap_or_default(),
            campaign: tracking.campaign.unwrap_or_default(),
            landing_page: tracking.landing_page.unwrap_or_default(),
            score: record.score,
            tier: record.tier.map_or("", |tier| tier.label()),
            summary: record.summary.clone(),
            notifications: summarize_attempts(&record.notifications),
            payload: serde_json::to_string(&record.payload)?,
        })
    }
}

/// `crm_webhook=sent;sms=failed` style column.
fn summarize_attempts(attempts: &[NotificationAttempt]) -> String {
    attempts
        .iter()
        .map(|attempt| format!("{}={}", attempt.channel.label(), attempt.status.label()))
        .collect::<Vec<_>>()
        .join(";")
}
