//! SMTP delivery via `lettre`.

use aeos_config::MailConfig;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info};

use crate::{MailError, MailReceipt, Mailer, OutgoingEmail};

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from configuration. Port 465 (or `implicit_tls`)
    /// wraps the connection in TLS from the start; anything else upgrades
    /// with STARTTLS. Credentials are attached only when both halves exist.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;

        let mut builder = if config.implicit_tls || config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Config(e.to_string()))?
        .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let to = match &email.to_name {
            Some(name) => Mailbox::new(Some(name.clone()), parse_address(&email.to)?),
            None => parse_mailbox(&email.to)?,
        };

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .body(email.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<MailReceipt, MailError> {
        let message = self.build_message(&email)?;

        match self.transport.send(message).await {
            Ok(response) => {
                let response = response.message().collect::<Vec<_>>().join(" ");
                info!(channel = "email", subject = %email.subject, %response, "email sent");
                Ok(MailReceipt { response })
            }
            Err(e) => {
                error!(channel = "email", subject = %email.subject, error = %e, "error sending email");
                Err(MailError::Smtp(e.to_string()))
            }
        }
    }

    fn transport_name(&self) -> &str {
        "smtp"
    }
}

fn parse_mailbox(value: &str) -> Result<Mailbox, MailError> {
    value
        .parse()
        .map_err(|e: lettre::address::AddressError| MailError::Address {
            address: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_address(value: &str) -> Result<lettre::Address, MailError> {
    value
        .parse()
        .map_err(|e: lettre::address::AddressError| MailError::Address {
            address: value.to_string(),
            reason: e.to_string(),
        })
}
