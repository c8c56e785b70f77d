use lead_desk::config::{AppConfig, AuditConfig};
use lead_desk::error::AppError;
use lead_desk::workflows::audit::{
    AuditError, AuditLog, AuditRecord, CsvAuditLog, InMemoryAuditLog,
};
use lead_desk::workflows::intake::LeadDeskService;
use lead_desk::workflows::notifications::NotificationRouter;
use lead_desk::workflows::scheduling::{
    Crew, CrewId, InMemoryCalendar, Scheduler, ZipCentroidTravel,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type AppService = LeadDeskService<InMemoryCalendar, ConfiguredAuditLog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Audit sink chosen at startup from `AUDIT_LOG_PATH`.
#[derive(Debug)]
pub(crate) enum ConfiguredAuditLog {
    Memory(InMemoryAuditLog),
    Csv(CsvAuditLog),
}

impl ConfiguredAuditLog {
    pub(crate) fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        match &config.log_path {
            Some(path) => Ok(Self::Csv(CsvAuditLog::open(path)?)),
            None => Ok(Self::Memory(InMemoryAuditLog::new())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "in-memory".to_string(),
            Self::Csv(log) => format!("csv:{}", log.path().display()),
        }
    }
}

impl AuditLog for ConfiguredAuditLog {
    fn append(&self, record: AuditRecord) -> Result<(), AuditError> {
        match self {
            Self::Memory(log) => log.append(record),
            Self::Csv(log) => log.append(record),
        }
    }
}

/// Field crews the process starts with until a persistent calendar backs the service.
pub(crate) fn seeded_crews() -> Vec<Crew> {
    vec![
        Crew {
            id: CrewId("crew-north".to_string()),
            name: "North Crew".to_string(),
            home_zip: "78759".to_string(),
            services: Vec::new(),
        },
        Crew {
            id: CrewId("crew-central".to_string()),
            name: "Central Crew".to_string(),
            home_zip: "78701".to_string(),
            services: vec![
                "panel upgrade".to_string(),
                "ev charger".to_string(),
                "service call".to_string(),
            ],
        },
        Crew {
            id: CrewId("crew-south".to_string()),
            name: "South Crew".to_string(),
            home_zip: "78745".to_string(),
            services: vec!["panel upgrade".to_string(), "generator".to_string()],
        },
    ]
}

pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<AppService>, AppError> {
    let calendar = Arc::new(InMemoryCalendar::new(seeded_crews()));
    let scheduler = Scheduler::new(
        calendar,
        Arc::new(ZipCentroidTravel::standard()),
        config.scheduling,
    );
    let notifier = NotificationRouter::from_settings(&config.notifications)?;
    let audit = Arc::new(ConfiguredAuditLog::from_config(&config.audit)?);
    tracing::info!(audit = %audit.describe(), ?notifier, "lead desk wired");

    Ok(Arc::new(LeadDeskService::new(scheduler, notifier, audit)))
}
