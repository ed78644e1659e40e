pub mod memory;
pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Delivery backend. Production uses SMTP via lettre; tests and unconfigured
/// deployments use the in-memory backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
}
