//! Delivery of availability notifications

pub mod email;

use async_trait::async_trait;
use lettre::transport::smtp::response::Code;
use thiserror::Error;

pub use email::EmailConfig;
pub use email::EmailNotifier;

/// SMTP replies that mean the server rejected the sender's credentials.
const AUTH_FAILURE_CODES: [&str; 2] = ["534", "535"];

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Email credentials are not set in environment variables")]
    MissingCredentials,

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("SMTP authentication error: {reason}")]
    Auth { reason: String },
}

/// Whether an SMTP reply code means the server refused the sender's credentials.
pub fn is_auth_code(code: Code) -> bool {
    AUTH_FAILURE_CODES.contains(&code.to_string().as_str())
}

impl NotifyError {
    /// Classifies a failed SMTP exchange, singling out rejected credentials.
    pub fn from_smtp(err: lettre::transport::smtp::Error) -> Self {
        if err.status().is_some_and(is_auth_code) {
            Self::Auth {
                reason: err.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }

    /// Whether the SMTP server refused to authenticate the sender.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one message announcing `device_ids`.
    async fn notify(&self, device_ids: &[u32], message: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, device_ids: &[u32], message: &str) -> Result<(), NotifyError> {
        (**self).notify(device_ids, message).await
    }
}
