//! Email delivery for team invitations.
//!
//! [`Mailer`] is the seam the API layer talks to; [`SmtpMailer`] delivers
//! through an SMTP relay with `lettre`, and [`InvitationEmail`] renders the
//! message a prospective member receives.

mod invitation;
mod smtp;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use invitation::InvitationEmail;
pub use smtp::SmtpMailer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),
}

/// A rendered message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

/// What the transport reported after accepting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub response: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<MailReceipt, MailError>;

    /// Human-readable name for this transport (e.g. "smtp").
    fn transport_name(&self) -> &str;
}
