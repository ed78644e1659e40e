use std::env;

use crate::error::AppError;

/// No-show fee per notice tier, in minor currency units. Shorter notice
/// costs more; amounts are monotonic non-increasing as notice grows.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    pub under_6h_minor: i64,
    pub h6_to_24_minor: i64,
    pub h24_to_48_minor: i64,
    pub over_48h_minor: i64,
    pub fallback_minor: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub public_base_url: String,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub session_ttl_hours: i64,
    pub smtp_url: Option<String>,
    pub mail_from: String,
    pub admin_notify_email: Option<String>,
    pub fees: FeeSchedule,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            session_ttl_hours: parse_or_default("SESSION_TTL_HOURS", 12)?,
            smtp_url: env::var("SMTP_URL").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Driverpool <noreply@driverpool.example>".to_string()),
            admin_notify_email: env::var("ADMIN_NOTIFY_EMAIL").ok(),
            fees: FeeSchedule {
                under_6h_minor: parse_or_default("FEE_UNDER_6H_MINOR", 12_000)?,
                h6_to_24_minor: parse_or_default("FEE_6_TO_24H_MINOR", 8_000)?,
                h24_to_48_minor: parse_or_default("FEE_24_TO_48H_MINOR", 4_000)?,
                over_48h_minor: parse_or_default("FEE_OVER_48H_MINOR", 0)?,
                fallback_minor: parse_or_default("FEE_FALLBACK_MINOR", 8_000)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
