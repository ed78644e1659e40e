use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Pending,
    Approved,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_class: String,
    pub vehicle_types: Vec<String>,
    pub region: Option<String>,
    pub status: DriverStatus,
    pub email_opt_out: bool,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn is_broadcast_eligible(&self) -> bool {
        self.status == DriverStatus::Approved && !self.email_opt_out
    }
}
