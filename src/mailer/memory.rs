use std::sync::Mutex;

use async_trait::async_trait;

use crate::mailer::{MailError, Mailer, OutboundMail};

/// Records outbound mail instead of delivering it. Used by tests and as the
/// backend when no SMTP_URL is configured. Addresses listed in
/// `fail_addresses` are rejected, to exercise per-recipient failure paths.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutboundMail>>,
    fail_addresses: Vec<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_addresses: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn mails(&self) -> Vec<OutboundMail> {
        self.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<OutboundMail>> {
        match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        if self.fail_addresses.contains(&mail.to) {
            return Err(MailError::Transport(format!(
                "simulated delivery failure for {}",
                mail.to
            )));
        }

        self.lock().push(mail);
        Ok(())
    }
}
