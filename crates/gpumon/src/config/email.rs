use std::fmt;

use clap::Args;

/// SMTP delivery settings. Credentials stay optional here so a missing one
/// surfaces as a delivery error instead of a startup failure.
#[derive(Args, Clone)]
pub struct EmailArgs {
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    #[arg(
        long,
        env = "SMTP_PORT",
        default_value_t = 465,
        help = "SMTP port, spoken with implicit TLS"
    )]
    pub smtp_port: u16,

    #[arg(long, env = "SENDER_EMAIL", help = "Address notifications are sent from")]
    pub sender_email: Option<String>,

    #[arg(long, env = "RECEIVER_EMAIL", help = "Address notifications are sent to")]
    pub receiver_email: Option<String>,

    #[arg(
        long,
        env = "EMAIL_PASSWORD",
        hide_env_values = true,
        help = "Password or app password of the sender account"
    )]
    pub email_password: Option<String>,
}

impl fmt::Debug for EmailArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailArgs")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("receiver_email", &self.receiver_email)
            .field(
                "email_password",
                &self.email_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
