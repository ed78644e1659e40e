use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::job::{JobRequest, JobStatus};
use crate::newsletter::looks_like_email;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/:id", get(get_job))
}

#[derive(Deserialize)]
pub struct SubmitJobRequest {
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
}

async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitJobRequest>,
) -> Result<Json<JobRequest>, AppError> {
    for (field, value) in [
        ("customer_name", &payload.customer_name),
        ("customer_email", &payload.customer_email),
        ("customer_phone", &payload.customer_phone),
        ("location", &payload.location),
        ("period", &payload.period),
        ("vehicle_type", &payload.vehicle_type),
        ("license_class", &payload.license_class),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    if !looks_like_email(payload.customer_email.trim()) {
        return Err(AppError::Validation(
            "customer_email is not a valid email address".to_string(),
        ));
    }

    let now = Utc::now();
    let job = JobRequest {
        id: Uuid::new_v4(),
        customer_name: payload.customer_name,
        customer_email: payload.customer_email.trim().to_string(),
        customer_phone: payload.customer_phone,
        company: payload.company,
        location: payload.location,
        period: payload.period,
        vehicle_type: payload.vehicle_type,
        license_class: payload.license_class,
        special_requirements: payload.special_requirements,
        message: payload.message,
        status: JobStatus::Open,
        created_at: now,
        updated_at: now,
    };

    state.jobs.insert(job.id, job.clone());
    state.metrics.jobs_submitted_total.inc();
    tracing::info!(job_id = %job.id, location = %job.location, "job request submitted");

    Ok(Json(job))
}

async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRequest>, AppError> {
    let job = state
        .jobs
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("job {} not found", id)))?;

    Ok(Json(job.value().clone()))
}
