use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::JobStatus;
use crate::state::AppState;
use crate::workflow::broadcast::{broadcast_job, BroadcastCounts, BroadcastOutcome};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BroadcastReport {
    NoRecipients,
    Dispatched {
        targeted: usize,
        sent: usize,
        failed: usize,
    },
    /// Every delivery failed: the job stays at `approved` and the admin sees
    /// this partial-failure state instead of a silent success.
    Failed { targeted: usize, failed: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveResult {
    pub status: JobStatus,
    pub already_sent: bool,
    pub broadcast: Option<BroadcastReport>,
}

/// Approves a job and synchronously triggers the broadcast. Approving a job
/// that is already `sent` is the one idempotency guard in the system: it
/// returns success with `already_sent` set and dispatches nothing, so a
/// duplicate admin click or retried request can never double-broadcast.
pub async fn approve_job(
    state: &AppState,
    job_id: Uuid,
    admin: &str,
) -> Result<ApproveResult, AppError> {
    let job = {
        let mut entry = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

        match entry.status {
            JobStatus::Sent => {
                info!(job_id = %job_id, admin = %admin, "approve replay, job already sent");
                return Ok(ApproveResult {
                    status: JobStatus::Sent,
                    already_sent: true,
                    broadcast: None,
                });
            }
            // Approved is re-approvable so the admin can retry a broadcast
            // that found no recipients or failed entirely.
            JobStatus::Open | JobStatus::Approved => {
                entry.status = JobStatus::Approved;
                entry.updated_at = Utc::now();
                entry.clone()
            }
            JobStatus::Rejected => {
                return Err(AppError::Conflict("job has been rejected".to_string()))
            }
            JobStatus::Assigned | JobStatus::Accepted | JobStatus::Declined => {
                return Err(AppError::Conflict(
                    "job already has an assigned driver".to_string(),
                ))
            }
            JobStatus::Completed => {
                return Err(AppError::Conflict("job is already completed".to_string()))
            }
        }
    };

    state.record_audit(admin, "approve job", Some(job_id));

    match broadcast_job(state, &job).await {
        BroadcastOutcome::NoRecipients => {
            state
                .metrics
                .broadcasts_total
                .with_label_values(&["no_recipients"])
                .inc();
            warn!(job_id = %job_id, "job approved but no eligible drivers to notify");
            Ok(ApproveResult {
                status: JobStatus::Approved,
                already_sent: false,
                broadcast: Some(BroadcastReport::NoRecipients),
            })
        }
        BroadcastOutcome::Dispatched(BroadcastCounts {
            targeted,
            sent: 0,
            failed,
        }) => {
            state
                .metrics
                .broadcasts_total
                .with_label_values(&["failed"])
                .inc();
            warn!(job_id = %job_id, targeted, "job approved but broadcast failed entirely");
            Ok(ApproveResult {
                status: JobStatus::Approved,
                already_sent: false,
                broadcast: Some(BroadcastReport::Failed { targeted, failed }),
            })
        }
        BroadcastOutcome::Dispatched(counts) => {
            state
                .metrics
                .broadcasts_total
                .with_label_values(&["dispatched"])
                .inc();
            // A driver can accept mid-broadcast; report whatever state the
            // job is actually in rather than assuming `sent`.
            let status = match state.jobs.get_mut(&job_id) {
                Some(mut entry) => {
                    if entry.status.can_transition(JobStatus::Sent) {
                        entry.status = JobStatus::Sent;
                        entry.updated_at = Utc::now();
                    }
                    entry.status
                }
                None => JobStatus::Sent,
            };
            info!(
                job_id = %job_id,
                targeted = counts.targeted,
                sent = counts.sent,
                failed = counts.failed,
                "job broadcast to drivers"
            );
            Ok(ApproveResult {
                status,
                already_sent: false,
                broadcast: Some(BroadcastReport::Dispatched {
                    targeted: counts.targeted,
                    sent: counts.sent,
                    failed: counts.failed,
                }),
            })
        }
    }
}

/// Rejection is terminal: no transition ever leads out of `rejected`.
pub fn reject_job(state: &AppState, job_id: Uuid, admin: &str) -> Result<JobStatus, AppError> {
    let mut entry = state
        .jobs
        .get_mut(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("job {job_id} not found")))?;

    if !entry.status.can_transition(JobStatus::Rejected) {
        return Err(AppError::Conflict(
            "job cannot be rejected in its current state".to_string(),
        ));
    }

    entry.status = JobStatus::Rejected;
    entry.updated_at = Utc::now();
    drop(entry);

    state.record_audit(admin, "reject job", Some(job_id));
    info!(job_id = %job_id, admin = %admin, "job rejected");

    Ok(JobStatus::Rejected)
}
