//! Admin login and per-request session validation. Sessions are
//! server-issued random bearer tokens; nothing the client stores is trusted
//! beyond presenting the token back.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub token: String,
    pub admin: String,
    pub expires_at: DateTime<Utc>,
}

/// Append-only record of admin actions; the job rows themselves are never
/// deleted, so this is the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub admin: String,
    pub action: String,
    pub subject: Option<Uuid>,
}

fn new_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn login(state: &AppState, username: &str, password: &str) -> Result<AdminSession, AppError> {
    let Some(expected_password) = state.config.admin_password.as_deref() else {
        tracing::warn!("admin login attempted but ADMIN_PASSWORD is not configured");
        return Err(AppError::Unauthorized);
    };

    if username != state.config.admin_username || password != expected_password {
        return Err(AppError::Unauthorized);
    }

    let session = AdminSession {
        token: new_session_token(),
        admin: username.to_string(),
        expires_at: Utc::now() + Duration::hours(state.config.session_ttl_hours),
    };

    state
        .sessions
        .insert(session.token.clone(), session.clone());
    state.record_audit(username, "login", None);

    Ok(session)
}

/// Extractor for admin-only routes: validates the bearer token against the
/// session store on every request.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        // Clone out of the map guard before any removal to keep the shard
        // lock short-lived.
        let session = match state.sessions.get(token) {
            Some(entry) => entry.value().clone(),
            None => return Err(AppError::Unauthorized),
        };

        if session.expires_at <= Utc::now() {
            state.sessions.remove(token);
            return Err(AppError::Unauthorized);
        }

        Ok(AdminIdentity(session.admin))
    }
}
