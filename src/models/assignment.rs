use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Hourly,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub rate_type: RateType,
    pub amount_minor: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Completed,
    NoShow,
}

/// Notice-period tier recorded when an admin marks a no-show. Once written it
/// is a historical judgment and is never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    #[serde(rename = "<6h")]
    Under6h,
    #[serde(rename = "6-24h")]
    H6To24,
    #[serde(rename = "24-48h")]
    H24To48,
    #[serde(rename = ">=48h")]
    Over48h,
    #[serde(rename = "override")]
    Override,
    #[serde(rename = "fallback")]
    Fallback,
}

impl FeeTier {
    pub fn as_str(self) -> &'static str {
        match self {
            FeeTier::Under6h => "<6h",
            FeeTier::H6To24 => "6-24h",
            FeeTier::H24To48 => "24-48h",
            FeeTier::Over48h => ">=48h",
            FeeTier::Override => "override",
            FeeTier::Fallback => "fallback",
        }
    }
}

/// Keyed by job id in the store, which is what enforces "at most one active
/// assignment per job".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub job_id: Uuid,
    pub driver_id: Uuid,
    pub rate: Option<Rate>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub no_show_tier: Option<FeeTier>,
    pub no_show_fee_minor: Option<i64>,
}

impl Assignment {
    pub fn new(job_id: Uuid, driver_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            driver_id,
            rate: None,
            starts_at: None,
            ends_at: None,
            status: AssignmentStatus::Active,
            assigned_at: now,
            no_show_tier: None,
            no_show_fee_minor: None,
        }
    }
}
