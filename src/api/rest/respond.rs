use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;
use crate::workflow::response::{respond, RespondAction, RespondOutcome};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // GET because these are the links embedded in invite emails.
        .route("/respond/:token/:action", get(respond_via_link))
        .route("/driver/respond", post(respond_via_post))
}

async fn respond_via_link(
    State(state): State<Arc<AppState>>,
    Path((token, action)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let action: RespondAction = action.parse()?;
    let outcome = respond(&state, &token, action).await?;
    Ok(Json(outcome_body(outcome)))
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub token: String,
    pub action: RespondAction,
}

async fn respond_via_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RespondRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = respond(&state, &payload.token, payload.action).await?;
    Ok(Json(outcome_body(outcome)))
}

fn outcome_body(outcome: RespondOutcome) -> Value {
    match outcome {
        RespondOutcome::Accepted { job_id } => {
            json!({ "success": true, "outcome": "accepted", "job_id": job_id })
        }
        RespondOutcome::Declined { job_id } => {
            json!({ "success": true, "outcome": "declined", "job_id": job_id })
        }
        RespondOutcome::AlreadyResponded { original } => {
            json!({ "success": true, "outcome": "already_responded", "original": original })
        }
        RespondOutcome::Expired => json!({ "success": false, "outcome": "expired" }),
    }
}
