//! Admin-initiated assignment of a specific driver to a job, used when the
//! admin places a driver directly instead of waiting for broadcast responses.
//! The driver confirms or declines through the same tokenized respond path
//! as broadcast invites.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::mailer::templates;
use crate::models::assignment::{Assignment, Rate};
use crate::models::invite::Invite;
use crate::models::job::JobStatus;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct AssignInput {
    pub driver_id: Uuid,
    pub rate: Option<Rate>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignResult {
    pub assignment: Assignment,
    pub confirmation_sent: bool,
}

pub async fn assign_driver(
    state: &AppState,
    job_id: Uuid,
    input: AssignInput,
    admin: &str,
) -> Result<AssignResult, AppError> {
    let driver = state
        .drivers
        .get(&input.driver_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", input.driver_id)))?;

    let now = Utc::now();

    let (assignment, job) = {
        let mut job = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        if !job.status.can_transition(JobStatus::Assigned) {
            return Err(AppError::Conflict(
                "job cannot be assigned in its current state".to_string(),
            ));
        }

        match state.assignments.entry(job_id) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(
                    "job already has an active assignment".to_string(),
                ));
            }
            Entry::Vacant(slot) => {
                job.status = JobStatus::Assigned;
                job.updated_at = now;

                let mut assignment = Assignment::new(job_id, driver.id, now);
                assignment.rate = input.rate;
                assignment.starts_at = input.starts_at;
                assignment.ends_at = input.ends_at;
                slot.insert(assignment.clone());
                (assignment, job.clone())
            }
        }
    };

    state.record_audit(admin, "assign driver", Some(job_id));
    info!(job_id = %job_id, driver_id = %driver.id, admin = %admin, "driver assigned manually");

    // Confirmation invite: the driver accepts or declines through the same
    // transition as broadcast responses.
    let invite = Invite::new(job_id, driver.id, now);
    let base_url = state.config.public_base_url.trim_end_matches('/');
    let accept_url = format!("{base_url}/respond/{}/accept", invite.token);
    let decline_url = format!("{base_url}/respond/{}/decline", invite.token);
    state.invites.insert(invite.token.clone(), invite);

    let mail = templates::job_invite(&driver.email, &driver.name, &job, &accept_url, &decline_url);
    let confirmation_sent = match state.mailer.send(mail).await {
        Ok(()) => true,
        Err(err) => {
            warn!(job_id = %job_id, error = %err, "confirmation email failed");
            false
        }
    };

    Ok(AssignResult {
        assignment,
        confirmation_sent,
    })
}
