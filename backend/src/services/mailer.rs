//! SMTP mail adapter

use crate::config::SmtpConfig;
use crate::services::http::require;
use crate::services::{MailSender, ServiceError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutgoingMail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl OutgoingMail {
    /// Build the RFC 5322 message sent from `from`
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` for blank fields or unparseable addresses.
    pub fn to_message(&self, from: &str) -> Result<Message, ServiceError> {
        require(&self.to, "recipient")?;
        require(&self.subject, "subject")?;

        let from: Mailbox = from
            .parse()
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid sender address: {}", e)))?;
        let to: Mailbox = self
            .to
            .trim()
            .parse()
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid recipient address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid message: {}", e)))
    }
}

/// STARTTLS relay client
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Build a mailer from config, `None` when no relay host is set
    ///
    /// # Errors
    /// Returns `ServiceError::NotConfigured` if a host is set without a sender,
    /// or `ServiceError::Mail` if the relay cannot be set up.
    pub fn from_config(config: &SmtpConfig) -> Result<Option<Self>, ServiceError> {
        let Some(host) = config.host.as_deref() else {
            return Ok(None);
        };
        let from = config
            .from
            .clone()
            .or_else(|| config.username.clone())
            .ok_or(ServiceError::NotConfigured("SMTP sender address"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| ServiceError::Mail(e.to_string()))?
            .port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ServiceError> {
        let message = mail.to_message(&self.from)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| ServiceError::Mail(e.to_string()))?;
        tracing::info!(to = %mail.to, subject = %mail.subject, "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Welcome".to_string(),
            body: "Your folder is ready.".to_string(),
        }
    }

    #[test]
    fn test_message_builds() {
        let message = mail("ana@example.com")
            .to_message("Ledgerline <office@example.com>")
            .unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("Subject: Welcome"));
        assert!(rendered.contains("To: ana@example.com"));
    }

    #[test]
    fn test_invalid_recipient() {
        let err = mail("not-an-address").to_message("office@example.com").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn test_unconfigured_host() {
        let config = SmtpConfig {
            host: None,
            port: 587,
            username: None,
            password: None,
            from: None,
        };
        assert!(SmtpMailer::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_host_without_sender() {
        let config = SmtpConfig {
            host: Some("smtp.example.com".to_string()),
            port: 587,
            username: None,
            password: None,
            from: None,
        };
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(ServiceError::NotConfigured(_))
        ));
    }
}
