use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::FeeSchedule;
use crate::error::AppError;
use crate::models::assignment::{AssignmentStatus, FeeTier};
use crate::models::job::JobStatus;
use crate::state::AppState;

/// Notice tier from the time remaining before the scheduled start. Lower
/// bounds are inclusive: exactly 6h of notice lands in `6-24h`, exactly 48h
/// in `>=48h`. A start already in the past counts as shortest notice.
pub fn fee_tier(notice: Duration) -> FeeTier {
    if notice < Duration::hours(6) {
        FeeTier::Under6h
    } else if notice < Duration::hours(24) {
        FeeTier::H6To24
    } else if notice < Duration::hours(48) {
        FeeTier::H24To48
    } else {
        FeeTier::Over48h
    }
}

pub fn tier_amount(schedule: &FeeSchedule, tier: FeeTier) -> i64 {
    match tier {
        FeeTier::Under6h => schedule.under_6h_minor,
        FeeTier::H6To24 => schedule.h6_to_24_minor,
        FeeTier::H24To48 => schedule.h24_to_48_minor,
        FeeTier::Over48h => schedule.over_48h_minor,
        // Override amounts come from the admin, fallback from config.
        FeeTier::Override | FeeTier::Fallback => schedule.fallback_minor,
    }
}

/// Computes `(tier, fee)` at the decision moment. A positive admin override
/// wins outright; a missing start time falls back to the default fee so the
/// no-show record is never blocked on fee precision.
pub fn compute_fee(
    schedule: &FeeSchedule,
    starts_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    override_minor: Option<i64>,
) -> (FeeTier, i64) {
    if let Some(amount) = override_minor {
        if amount > 0 {
            return (FeeTier::Override, amount);
        }
    }

    match starts_at {
        Some(start) => {
            let tier = fee_tier(start - now);
            (tier, tier_amount(schedule, tier))
        }
        None => (FeeTier::Fallback, schedule.fallback_minor),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NoShowInput {
    pub starts_at: Option<DateTime<Utc>>,
    pub override_fee_minor: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoShowRecord {
    pub job_id: Uuid,
    pub tier: FeeTier,
    pub fee_minor: i64,
    pub customer_notified: bool,
}

/// Marks the job's assignment as a no-show and records the fee once,
/// immutably. The customer notice is an independent effect: its failure is
/// reported but never rolls back the record.
pub async fn mark_no_show(
    state: &AppState,
    job_id: Uuid,
    admin: &str,
    input: NoShowInput,
) -> Result<NoShowRecord, AppError> {
    let (tier, fee_minor) = {
        let mut assignment = state
            .assignments
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("no assignment for job {job_id}")))?;

        if assignment.status == AssignmentStatus::NoShow {
            return Err(AppError::Conflict(
                "no-show already recorded for this job".to_string(),
            ));
        }

        if input.starts_at.is_some() {
            assignment.starts_at = input.starts_at;
        }

        let (tier, fee_minor) = compute_fee(
            &state.config.fees,
            assignment.starts_at,
            Utc::now(),
            input.override_fee_minor,
        );

        assignment.status = AssignmentStatus::NoShow;
        assignment.no_show_tier = Some(tier);
        assignment.no_show_fee_minor = Some(fee_minor);

        (tier, fee_minor)
    };

    state
        .metrics
        .no_show_fees_total
        .with_label_values(&[tier.as_str()])
        .inc();
    state.record_audit(admin, "mark no-show", Some(job_id));
    info!(job_id = %job_id, tier = tier.as_str(), fee_minor, "no-show recorded");

    let job = state.jobs.get(&job_id).map(|entry| entry.value().clone());
    let customer_notified = match job {
        Some(job) => {
            let mail =
                crate::mailer::templates::no_show_notice(&job.customer_email, &job, tier, fee_minor);
            match state.mailer.send(mail).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(job_id = %job_id, error = %err, "no-show customer notice failed");
                    false
                }
            }
        }
        None => false,
    };

    Ok(NoShowRecord {
        job_id,
        tier,
        fee_minor,
        customer_notified,
    })
}

pub fn complete_assignment(state: &AppState, job_id: Uuid, admin: &str) -> Result<(), AppError> {
    {
        let mut assignment = state
            .assignments
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("no assignment for job {job_id}")))?;

        if assignment.status != AssignmentStatus::Active {
            return Err(AppError::Conflict(
                "assignment is not active".to_string(),
            ));
        }

        assignment.status = AssignmentStatus::Completed;
    }

    if let Some(mut job) = state.jobs.get_mut(&job_id) {
        if job.status.can_transition(JobStatus::Completed) {
            job.status = JobStatus::Completed;
            job.updated_at = Utc::now();
        }
    }

    state.record_audit(admin, "complete assignment", Some(job_id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{compute_fee, fee_tier};
    use crate::config::FeeSchedule;
    use crate::models::assignment::FeeTier;

    fn schedule() -> FeeSchedule {
        FeeSchedule {
            under_6h_minor: 12_000,
            h6_to_24_minor: 8_000,
            h24_to_48_minor: 4_000,
            over_48h_minor: 0,
            fallback_minor: 8_000,
        }
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_the_lower_side() {
        assert_eq!(
            fee_tier(Duration::hours(5) + Duration::minutes(59)),
            FeeTier::Under6h
        );
        assert_eq!(fee_tier(Duration::hours(6)), FeeTier::H6To24);
        assert_eq!(
            fee_tier(Duration::hours(23) + Duration::minutes(59)),
            FeeTier::H6To24
        );
        assert_eq!(fee_tier(Duration::hours(24)), FeeTier::H24To48);
        assert_eq!(fee_tier(Duration::hours(48)), FeeTier::Over48h);
    }

    #[test]
    fn start_in_the_past_is_shortest_notice() {
        assert_eq!(fee_tier(Duration::hours(-3)), FeeTier::Under6h);
    }

    #[test]
    fn fees_are_monotonic_non_increasing_in_notice() {
        let s = schedule();
        assert!(s.under_6h_minor >= s.h6_to_24_minor);
        assert!(s.h6_to_24_minor >= s.h24_to_48_minor);
        assert!(s.h24_to_48_minor >= s.over_48h_minor);
    }

    #[test]
    fn positive_override_replaces_computed_fee() {
        let now = Utc::now();
        let (tier, fee) = compute_fee(
            &schedule(),
            Some(now + Duration::hours(30)),
            now,
            Some(9_900),
        );
        assert_eq!(tier, FeeTier::Override);
        assert_eq!(fee, 9_900);
    }

    #[test]
    fn non_positive_override_is_ignored() {
        let now = Utc::now();
        let (tier, fee) = compute_fee(&schedule(), Some(now + Duration::hours(30)), now, Some(0));
        assert_eq!(tier, FeeTier::H24To48);
        assert_eq!(fee, 4_000);
    }

    #[test]
    fn missing_start_time_falls_back_to_default_fee() {
        let (tier, fee) = compute_fee(&schedule(), None, Utc::now(), None);
        assert_eq!(tier, FeeTier::Fallback);
        assert_eq!(fee, 8_000);
    }
}
