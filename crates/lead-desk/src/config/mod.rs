use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::workflows::notifications::NotificationSettings;
use crate::workflows::scheduling::SchedulingPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scheduling: SchedulingPolicy,
    pub notifications: NotificationSettings,
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scheduling: load_scheduling_policy()?,
            notifications: load_notification_settings()?,
            audit: AuditConfig {
                log_path: optional_var("AUDIT_LOG_PATH").map(PathBuf::from),
            },
        })
    }
}

fn load_scheduling_policy() -> Result<SchedulingPolicy, ConfigError> {
    let defaults = SchedulingPolicy::default();
    let policy = SchedulingPolicy {
        buffer_before_minutes: numeric_var(
            "SCHEDULE_BUFFER_BEFORE_MINUTES",
            defaults.buffer_before_minutes,
        )?,
        buffer_after_minutes: numeric_var(
            "SCHEDULE_BUFFER_AFTER_MINUTES",
            defaults.buffer_after_minutes,
        )?,
        horizon_days: numeric_var("SCHEDULE_HORIZON_DAYS", defaults.horizon_days)?,
        workday_start_hour: numeric_var(
            "SCHEDULE_WORKDAY_START_HOUR",
            defaults.workday_start_hour,
        )?,
        workday_end_hour: numeric_var("SCHEDULE_WORKDAY_END_HOUR", defaults.workday_end_hour)?,
        slot_step_minutes: numeric_var("SCHEDULE_SLOT_STEP_MINUTES", defaults.slot_step_minutes)?,
    };

    if policy.workday_start_hour >= policy.workday_end_hour || policy.workday_end_hour > 24 {
        return Err(ConfigError::InvalidWorkday {
            start: policy.workday_start_hour,
            end: policy.workday_end_hour,
        });
    }
    if policy.horizon_days == 0 {
        return Err(ConfigError::InvalidNumber {
            key: "SCHEDULE_HORIZON_DAYS",
            value: "0".to_string(),
        });
    }

    Ok(policy)
}

fn load_notification_settings() -> Result<NotificationSettings, ConfigError> {
    let defaults = NotificationSettings::default();
    let channel_timeout_ms = numeric_var(
        "NOTIFY_CHANNEL_TIMEOUT_MS",
        defaults.channel_timeout.as_millis() as u64,
    )?;
    let deadline_ms = numeric_var("NOTIFY_DEADLINE_MS", defaults.deadline.as_millis() as u64)?;

    Ok(NotificationSettings {
        crm_webhook_url: optional_var("NOTIFY_CRM_WEBHOOK_URL"),
        sms_gateway_url: optional_var("NOTIFY_SMS_GATEWAY_URL"),
        sms_api_key: optional_var("NOTIFY_SMS_API_KEY"),
        sms_sender: optional_var("NOTIFY_SMS_SENDER"),
        staff_phone: optional_var("NOTIFY_STAFF_PHONE"),
        email_api_url: optional_var("NOTIFY_EMAIL_API_URL"),
        email_api_key: optional_var("NOTIFY_EMAIL_API_KEY"),
        email_sender: optional_var("NOTIFY_EMAIL_SENDER"),
        channel_timeout: Duration::from_millis(channel_timeout_ms),
        deadline: Duration::from_millis(deadline_ms),
    })
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn numeric_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where audit records land. `None` keeps them in process memory.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    pub log_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidWorkday { start: u32, end: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
            ConfigError::InvalidWorkday { start, end } => write!(
                f,
                "workday start hour {start} must be before end hour {end} (max 24)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidWorkday { .. } => None,
        }
    }
}
