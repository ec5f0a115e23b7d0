//! In-memory mailer for tests.

use std::sync::{Arc, Mutex};

use crate::{MailError, MailReceipt, Mailer, OutgoingEmail};

/// Records every message instead of delivering it. Can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        let mailer = Self::default();
        mailer.set_failure(Some(reason));
        mailer
    }

    pub fn set_failure(&self, reason: Option<&str>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = reason.map(str::to_string);
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<MailReceipt, MailError> {
        // Attempts are recorded even when delivery is set to fail.
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(email);

        if let Some(reason) = self.fail_with.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(MailError::Smtp(reason));
        }

        Ok(MailReceipt {
            response: "250 OK (recorded)".to_string(),
        })
    }

    fn transport_name(&self) -> &str {
        "recording"
    }
}
