use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::{AdminSession, AuditEntry};
use crate::config::Config;
use crate::mailer::Mailer;
use crate::models::assignment::Assignment;
use crate::models::driver::Driver;
use crate::models::invite::Invite;
use crate::models::job::JobRequest;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub config: Config,
    pub jobs: DashMap<Uuid, JobRequest>,
    pub drivers: DashMap<Uuid, Driver>,
    /// Keyed by the invite token; the token is the only handle a driver has.
    pub invites: DashMap<String, Invite>,
    /// Keyed by job id: the map key is the uniqueness constraint behind
    /// "at most one active assignment per job".
    pub assignments: DashMap<Uuid, Assignment>,
    pub sessions: DashMap<String, AdminSession>,
    pub audit_log: DashMap<Uuid, AuditEntry>,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            jobs: DashMap::new(),
            drivers: DashMap::new(),
            invites: DashMap::new(),
            assignments: DashMap::new(),
            sessions: DashMap::new(),
            audit_log: DashMap::new(),
            mailer,
            metrics: Metrics::new(),
        }
    }

    pub fn record_audit(&self, admin: &str, action: &str, subject: Option<Uuid>) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            at: Utc::now(),
            admin: admin.to_string(),
            action: action.to_string(),
            subject,
        };
        self.audit_log.insert(entry.id, entry);
    }

    /// Audit entries ordered oldest first.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        let mut entries: Vec<AuditEntry> = self
            .audit_log
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.at);
        entries
    }
}
