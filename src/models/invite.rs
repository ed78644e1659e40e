use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INVITE_TTL_HOURS: i64 = 48;

/// 32 alphanumeric characters, ~190 bits of entropy. The token is the
/// authorization: accept/decline links embed it, never the job id alone.
pub fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    Failed { detail: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub token: String,
    pub job_id: Uuid,
    pub driver_id: Uuid,
    pub status: InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub delivery: Option<DeliveryOutcome>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(job_id: Uuid, driver_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            token: new_token(),
            job_id,
            driver_id,
            status: InviteStatus::Pending,
            expires_at: now + chrono::Duration::hours(INVITE_TTL_HOURS),
            delivery: None,
            responded_at: None,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
