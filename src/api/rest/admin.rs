use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{login, AdminIdentity};
use crate::error::AppError;
use crate::models::driver::DriverStatus;
use crate::models::job::JobRequest;
use crate::newsletter::send_newsletter;
use crate::state::AppState;
use crate::workflow::approval::{approve_job, reject_job};
use crate::workflow::assign::{assign_driver, AssignInput};
use crate::workflow::no_show::{complete_assignment, mark_no_show, NoShowInput};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/jobs", get(list_jobs))
        .route("/admin/jobs/:id/approve", post(approve))
        .route("/admin/jobs/:id/reject", post(reject))
        .route("/admin/jobs/:id/assign", post(assign))
        .route("/admin/assignments/:job_id/no-show", post(no_show))
        .route("/admin/assignments/:job_id/complete", post(complete))
        .route("/admin/drivers/:id/approve", post(approve_driver))
        .route("/admin/drivers/:id/opt-out", post(opt_out_driver))
        .route("/admin/newsletter", post(newsletter))
        .route("/admin/audit", get(audit_log))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let session = login(&state, &payload.username, &payload.password)?;
    Ok(Json(json!({
        "success": true,
        "token": session.token,
        "expires_at": session.expires_at,
    })))
}

async fn list_jobs(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<JobRequest>> {
    let mut jobs: Vec<JobRequest> = state
        .jobs
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    jobs.sort_by_key(|job| job.created_at);
    Json(jobs)
}

async fn approve(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let result = approve_job(&state, id, &admin).await?;
    Ok(Json(json!({
        "success": true,
        "status": result.status,
        "already_sent": result.already_sent,
        "broadcast": result.broadcast,
    })))
}

async fn reject(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let status = reject_job(&state, id, &admin)?;
    Ok(Json(json!({ "success": true, "status": status })))
}

async fn assign(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignInput>,
) -> Result<Json<Value>, AppError> {
    let result = assign_driver(&state, id, payload, &admin).await?;
    Ok(Json(json!({
        "success": true,
        "assignment": result.assignment,
        "confirmation_sent": result.confirmation_sent,
    })))
}

async fn no_show(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
    payload: Option<Json<NoShowInput>>,
) -> Result<Json<Value>, AppError> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    let record = mark_no_show(&state, job_id, &admin, input).await?;
    Ok(Json(json!({
        "success": true,
        "tier": record.tier,
        "fee_minor": record.fee_minor,
        "customer_notified": record.customer_notified,
    })))
}

async fn complete(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    complete_assignment(&state, job_id, &admin)?;
    Ok(Json(json!({ "success": true })))
}

async fn approve_driver(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", id)))?;

    driver.status = DriverStatus::Approved;
    drop(driver);

    state.record_audit(&admin, "approve driver", Some(id));
    Ok(Json(json!({ "success": true, "status": DriverStatus::Approved })))
}

async fn opt_out_driver(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut driver = state
        .drivers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("driver {} not found", id)))?;

    driver.email_opt_out = true;
    drop(driver);

    state.record_audit(&admin, "opt out driver", Some(id));
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct NewsletterRequest {
    pub subject: String,
    pub body_html: String,
    pub csv: String,
}

async fn newsletter(
    AdminIdentity(admin): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewsletterRequest>,
) -> Result<Json<Value>, AppError> {
    if payload.subject.trim().is_empty() {
        return Err(AppError::Validation("subject is required".to_string()));
    }

    let summary = send_newsletter(&state, &payload.subject, &payload.body_html, &payload.csv).await;
    state.record_audit(&admin, "send newsletter", None);

    Ok(Json(json!({
        "success": true,
        "targeted": summary.targeted,
        "sent": summary.sent,
        "failed": summary.failed,
        "dropped_rows": summary.dropped_rows,
    })))
}

async fn audit_log(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
) -> Json<Value> {
    Json(json!({ "entries": state.audit_entries() }))
}
