use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a customer's request for a driver. The status field is the
/// sole lifecycle driver; every mutation goes through `can_transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Approved,
    Sent,
    Rejected,
    Assigned,
    Accepted,
    Declined,
    Completed,
}

impl JobStatus {
    pub fn can_transition(self, to: JobStatus) -> bool {
        use JobStatus::*;

        matches!(
            (self, to),
            (Open, Approved)
                | (Open, Rejected)
                | (Open, Assigned)
                | (Approved, Sent)
                | (Approved, Rejected)
                | (Approved, Assigned)
                | (Sent, Assigned)
                | (Assigned, Accepted)
                | (Assigned, Declined)
                | (Assigned, Completed)
                | (Declined, Assigned)
                | (Accepted, Completed)
        )
    }

    /// States in which a broadcast invite may still claim the job.
    /// `Approved` is included because invites can be live while the job
    /// stayed at `Approved` after a partially failed broadcast.
    pub fn accepts_invite(self) -> bool {
        matches!(self, JobStatus::Open | JobStatus::Approved | JobStatus::Sent)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Rejected | JobStatus::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub company: Option<String>,
    pub location: String,
    pub period: String,
    pub vehicle_type: String,
    pub license_class: String,
    pub special_requirements: Option<String>,
    pub message: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::JobStatus::*;

    #[test]
    fn rejected_is_terminal() {
        for to in [Open, Approved, Sent, Assigned, Accepted, Declined, Completed] {
            assert!(!Rejected.can_transition(to));
        }
    }

    #[test]
    fn sent_only_moves_to_assigned() {
        assert!(Sent.can_transition(Assigned));
        for to in [Open, Approved, Rejected, Accepted, Declined, Completed] {
            assert!(!Sent.can_transition(to));
        }
    }

    #[test]
    fn declined_job_can_be_reassigned() {
        assert!(Declined.can_transition(Assigned));
    }
}
