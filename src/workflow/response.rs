//! The single authoritative driver-response transition. Both call paths
//! (tokenized email links and the JSON action endpoint) land here; there is
//! no second validation pathway.

use std::str::FromStr;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::mailer::templates;
use crate::models::assignment::{Assignment, AssignmentStatus};
use crate::models::invite::InviteStatus;
use crate::models::job::{JobRequest, JobStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
    Accept,
    Decline,
}

impl FromStr for RespondAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(RespondAction::Accept),
            "decline" => Ok(RespondAction::Decline),
            other => Err(AppError::Validation(format!(
                "unknown response action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RespondOutcome {
    Accepted { job_id: Uuid },
    Declined { job_id: Uuid },
    /// The token was consumed earlier; this echoes the recorded outcome and
    /// triggers no side effects.
    AlreadyResponded { original: InviteStatus },
    Expired,
}

/// Consumes an invite token. A token is valid for exactly one use: replays
/// return the originally recorded outcome, expiry is checked here at use
/// time, and losing the race for the job is an expected conflict with a
/// user-legible message, not a server error.
pub async fn respond(
    state: &AppState,
    token: &str,
    action: RespondAction,
) -> Result<RespondOutcome, AppError> {
    let now = Utc::now();

    let mut invite = state
        .invites
        .get_mut(token)
        .ok_or_else(|| AppError::NotFound("unknown invite token".to_string()))?;

    if invite.status != InviteStatus::Pending {
        state
            .metrics
            .driver_responses_total
            .with_label_values(&["already_responded"])
            .inc();
        return Ok(RespondOutcome::AlreadyResponded {
            original: invite.status,
        });
    }

    if invite.is_expired(now) {
        invite.status = InviteStatus::Expired;
        state
            .metrics
            .driver_responses_total
            .with_label_values(&["expired"])
            .inc();
        return Ok(RespondOutcome::Expired);
    }

    let job_id = invite.job_id;
    let driver_id = invite.driver_id;

    match action {
        RespondAction::Decline => {
            // Declining a pending broadcast invite touches nothing but the
            // invite; other drivers' invites stay live. Declining one's own
            // confirmed assignment releases the job back to the admin.
            let released = release_if_own_assignment(state, job_id, driver_id, now);
            if released {
                state.assignments.remove(&job_id);
            }

            invite.status = InviteStatus::Declined;
            invite.responded_at = Some(now);
            state
                .metrics
                .driver_responses_total
                .with_label_values(&["declined"])
                .inc();
            info!(job_id = %job_id, driver_id = %driver_id, released, "driver declined");
            Ok(RespondOutcome::Declined { job_id })
        }
        RespondAction::Accept => {
            let job_snapshot = {
                let mut job = state.jobs.get_mut(&job_id).ok_or_else(|| {
                    AppError::NotFound(format!("job {job_id} no longer exists"))
                })?;

                if job.status.accepts_invite() {
                    // The claim: status check-and-set plus assignment-row
                    // insert under the store locks. Exactly one concurrent
                    // accept can pass; the rest land in the conflict arm.
                    match state.assignments.entry(job_id) {
                        Entry::Occupied(_) => {
                            state
                                .metrics
                                .driver_responses_total
                                .with_label_values(&["conflict"])
                                .inc();
                            return Err(AppError::Conflict(
                                "this job has already been assigned to someone else".to_string(),
                            ));
                        }
                        Entry::Vacant(slot) => {
                            job.status = JobStatus::Assigned;
                            job.updated_at = now;
                            slot.insert(Assignment::new(job_id, driver_id, now));
                        }
                    }
                } else if job.status == JobStatus::Assigned
                    && active_assignment_driver(state, job_id) == Some(driver_id)
                {
                    // Confirmation of a manual assignment.
                    job.status = JobStatus::Accepted;
                    job.updated_at = now;
                } else {
                    state
                        .metrics
                        .driver_responses_total
                        .with_label_values(&["conflict"])
                        .inc();
                    return Err(AppError::Conflict(
                        "this job has already been assigned to someone else".to_string(),
                    ));
                }

                job.clone()
            };

            invite.status = InviteStatus::Accepted;
            invite.responded_at = Some(now);
            drop(invite);

            state
                .metrics
                .driver_responses_total
                .with_label_values(&["accepted"])
                .inc();
            info!(job_id = %job_id, driver_id = %driver_id, "driver accepted job");

            notify_assignment(state, &job_snapshot, driver_id).await;

            Ok(RespondOutcome::Accepted { job_id })
        }
    }
}

/// The assignment's driver, but only while the assignment is still `Active`.
/// A no-show or completed assignment is a recorded historical judgment: a
/// late invite response must neither release nor re-accept it.
fn active_assignment_driver(state: &AppState, job_id: Uuid) -> Option<Uuid> {
    state.assignments.get(&job_id).and_then(|entry| {
        let assignment = entry.value();
        (assignment.status == AssignmentStatus::Active).then_some(assignment.driver_id)
    })
}

fn release_if_own_assignment(
    state: &AppState,
    job_id: Uuid,
    driver_id: Uuid,
    now: chrono::DateTime<Utc>,
) -> bool {
    let Some(mut job) = state.jobs.get_mut(&job_id) else {
        return false;
    };

    if job.status != JobStatus::Assigned
        || active_assignment_driver(state, job_id) != Some(driver_id)
    {
        return false;
    }

    job.status = JobStatus::Declined;
    job.updated_at = now;
    true
}

/// Confirmation mails are independent effects: a delivery failure is logged
/// and never rolls back the assignment.
async fn notify_assignment(state: &AppState, job: &JobRequest, driver_id: Uuid) {
    let driver_name = state
        .drivers
        .get(&driver_id)
        .map(|entry| entry.value().name.clone())
        .unwrap_or_else(|| "a driver".to_string());

    if let Some(admin_email) = state.config.admin_notify_email.as_deref() {
        let mail = templates::assignment_confirmed(admin_email, job, &driver_name);
        if let Err(err) = state.mailer.send(mail).await {
            warn!(job_id = %job.id, error = %err, "admin assignment notification failed");
        }
    }

    let mail = templates::assignment_confirmed(&job.customer_email, job, &driver_name);
    if let Err(err) = state.mailer.send(mail).await {
        warn!(job_id = %job.id, error = %err, "customer assignment notification failed");
    }
}
