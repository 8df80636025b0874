//! Admin email alerting for suspicious transactions.
//!
//! Sends a plain-text alert to the configured admin address over SMTP with
//! implicit TLS. Alerting is best-effort: the fraud check endpoint spawns the
//! send and never waits on or surfaces delivery failures.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::models::FraudLog;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Errors that can occur while building or sending an alert email.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Sender or recipient address failed to parse.
    #[error("invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The message could not be assembled.
    #[error("failed to build alert message: {0}")]
    Message(#[from] lettre::error::Error),
    /// SMTP connection, authentication, or submission failed.
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// SMTP transport plus the addresses used for admin alerts.
pub struct AlertMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    admin: String,
}

impl AlertMailer {
    /// Builds a mailer from environment configuration.
    ///
    /// Requires `EMAIL_SENDER`, `EMAIL_PASSWORD`, and `ADMIN_EMAIL`; `SMTP_HOST`
    /// defaults to `smtp.gmail.com`. Returns `None` when any required variable
    /// is missing, which disables alerting.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let sender = std::env::var("EMAIL_SENDER").ok()?;
        let password = std::env::var("EMAIL_PASSWORD").ok()?;
        let admin = std::env::var("ADMIN_EMAIL").ok()?;

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(builder) => builder
                .credentials(Credentials::new(sender.clone(), password))
                .build(),
            Err(e) => {
                tracing::error!(host = %host, error = %e, "Failed to build SMTP transport");
                return None;
            }
        };

        Some(Self {
            transport,
            sender,
            admin,
        })
    }

    /// Constructs a mailer from explicit parts.
    pub fn new(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        sender: impl Into<String>,
        admin: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sender: sender.into(),
            admin: admin.into(),
        }
    }

    /// Sends the suspicious-transaction alert for a fraud-check record.
    pub async fn send_suspicious_alert(&self, log: &FraudLog) -> Result<(), AlertError> {
        let email = Message::builder()
            .from(self.sender.parse()?)
            .to(self.admin.parse()?)
            .subject("Suspicious Transaction Alert")
            .header(ContentType::TEXT_PLAIN)
            .body(alert_body(log))?;

        self.transport.send(email).await?;
        tracing::info!(admin = %self.admin, "Alert email sent to admin");
        Ok(())
    }
}

fn alert_body(log: &FraudLog) -> String {
    format!(
        "Suspicious transaction detected.\n\n\
         Details:\n\
         - Amount: {}\n\
         - Customer Age: {}\n\
         - Login Attempts: {}\n\
         - Account Balance: {}\n\
         - Message: {}\n\n\
         Please review this transaction immediately.\n",
        log.amount, log.customer_age, log.login_attempts, log.account_balance, log.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn alert_body_lists_all_features() {
        let log = FraudLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: 42_000.0,
            customer_age: 21,
            login_attempts: 17,
            account_balance: 55.5,
            is_suspicious: true,
            message: "Suspicious transaction detected!".to_string(),
            checked_at: Utc::now(),
        };

        let body = alert_body(&log);
        assert!(body.contains("42000"));
        assert!(body.contains("Customer Age: 21"));
        assert!(body.contains("Login Attempts: 17"));
        assert!(body.contains("55.5"));
        assert!(body.contains("review this transaction"));
    }
}
