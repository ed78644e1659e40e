use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::mailer::templates;
use crate::models::driver::Driver;
use crate::models::invite::{DeliveryOutcome, Invite};
use crate::models::job::JobRequest;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BroadcastCounts {
    pub targeted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// "No recipients" is a distinct outcome, never a dispatch with count 0, so
/// the approval gate can surface it to the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    NoRecipients,
    Dispatched(BroadcastCounts),
}

/// Fans one approved job out to every eligible driver: one single-use token
/// and one email per driver. Deliveries run concurrently and independently;
/// a failure for one recipient never aborts the rest.
pub async fn broadcast_job(state: &AppState, job: &JobRequest) -> BroadcastOutcome {
    let eligible: Vec<Driver> = state
        .drivers
        .iter()
        .filter(|entry| entry.value().is_broadcast_eligible())
        .map(|entry| entry.value().clone())
        .collect();

    if eligible.is_empty() {
        return BroadcastOutcome::NoRecipients;
    }

    let now = Utc::now();
    let base_url = state.config.public_base_url.trim_end_matches('/');

    let mut deliveries = Vec::with_capacity(eligible.len());
    for driver in &eligible {
        let invite = Invite::new(job.id, driver.id, now);
        let accept_url = format!("{base_url}/respond/{}/accept", invite.token);
        let decline_url = format!("{base_url}/respond/{}/decline", invite.token);
        let mail = templates::job_invite(&driver.email, &driver.name, job, &accept_url, &decline_url);

        state.invites.insert(invite.token.clone(), invite.clone());
        deliveries.push((invite.token, mail));
    }

    let sends = deliveries.into_iter().map(|(token, mail)| {
        let mailer = state.mailer.clone();
        async move { (token, mailer.send(mail).await) }
    });

    let results = join_all(sends).await;

    let targeted = results.len();
    let mut sent = 0;
    let mut failed = 0;

    for (token, result) in results {
        let delivery = match result {
            Ok(()) => {
                sent += 1;
                state
                    .metrics
                    .invite_emails_total
                    .with_label_values(&["sent"])
                    .inc();
                DeliveryOutcome::Sent
            }
            Err(err) => {
                failed += 1;
                state
                    .metrics
                    .invite_emails_total
                    .with_label_values(&["failed"])
                    .inc();
                warn!(job_id = %job.id, error = %err, "invite email delivery failed");
                DeliveryOutcome::Failed {
                    detail: err.to_string(),
                }
            }
        };

        if let Some(mut invite) = state.invites.get_mut(&token) {
            invite.delivery = Some(delivery);
        }
    }

    BroadcastOutcome::Dispatched(BroadcastCounts {
        targeted,
        sent,
        failed,
    })
}
