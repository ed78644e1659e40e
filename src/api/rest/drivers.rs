use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AdminIdentity;
use crate::error::AppError;
use crate::models::driver::{Driver, DriverStatus};
use crate::newsletter::looks_like_email;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/drivers", post(register_driver).get(list_drivers))
}

#[derive(Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_class: String,
    #[serde(default)]
    pub vehicle_types: Vec<String>,
    pub region: Option<String>,
}

/// Public marketplace registration. New drivers start as `pending` and only
/// receive broadcasts after admin approval.
async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if payload.license_class.trim().is_empty() {
        return Err(AppError::Validation("license_class is required".to_string()));
    }
    if !looks_like_email(payload.email.trim()) {
        return Err(AppError::Validation(
            "email is not a valid email address".to_string(),
        ));
    }

    let driver = Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email.trim().to_string(),
        phone: payload.phone,
        license_class: payload.license_class,
        vehicle_types: payload.vehicle_types,
        region: payload.region,
        status: DriverStatus::Pending,
        email_opt_out: false,
        created_at: Utc::now(),
    };

    state.drivers.insert(driver.id, driver.clone());
    tracing::info!(driver_id = %driver.id, "driver registered");

    Ok(Json(driver))
}

async fn list_drivers(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<Driver>> {
    let drivers = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(drivers)
}
