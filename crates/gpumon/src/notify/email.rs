//! Email notification delivery via SMTP.
//!
//! [`EmailNotifier`] sends one plain-text mail per notification batch over an
//! implicit-TLS SMTP connection, authenticated as the sender.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use super::Notifier;
use super::NotifyError;
use crate::config::EmailArgs;
use crate::monitor::gpu_list;

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub password: Option<String>,
}

impl From<&EmailArgs> for EmailConfig {
    fn from(args: &EmailArgs) -> Self {
        Self {
            smtp_host: args.smtp_host.clone(),
            smtp_port: args.smtp_port,
            sender: args.sender_email.clone(),
            receiver: args.receiver_email.clone(),
            password: args.email_password.clone(),
        }
    }
}

impl EmailConfig {
    /// Sender, receiver and password, or `None` if any of them is unset or empty.
    fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        Some((
            non_empty(&self.sender)?,
            non_empty(&self.receiver)?,
            non_empty(&self.password)?,
        ))
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }
}

pub fn subject(device_ids: &[u32]) -> String {
    format!("GPU {} Available", gpu_list(device_ids))
}

/// Assembles the UTF-8 plain-text mail for one batch.
pub fn build_message(
    sender: &str,
    receiver: &str,
    device_ids: &[u32],
    body: &str,
) -> Result<Message, NotifyError> {
    Ok(Message::builder()
        .from(sender.parse()?)
        .to(receiver.parse()?)
        .subject(subject(device_ids))
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?)
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, device_ids: &[u32], message: &str) -> Result<(), NotifyError> {
        let (sender, receiver, password) = self
            .config
            .credentials()
            .ok_or(NotifyError::MissingCredentials)?;

        let email = build_message(sender, receiver, device_ids, message)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();
        mailer.send(email).await.map_err(NotifyError::from_smtp)?;

        tracing::debug!(to = receiver, "SMTP server accepted notification");
        Ok(())
    }
}
