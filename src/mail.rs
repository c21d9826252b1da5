//! Send emails to user for important updates.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Mail;
use crate::error::{Result, ServerError};

const DEFAULT_SUBJECT_PREFIX: &str = "[Agenda]";

/// Mail templates list.
#[derive(Clone, Copy, Debug)]
pub enum Template {
    /// Account confirmation link.
    Confirm,
    /// Password reset link.
    Reset,
    /// Email change link.
    ChangeEmail,
}

impl Template {
    fn subject(self) -> &'static str {
        match self {
            Template::Confirm => "Confirm Your Account",
            Template::Reset => "Reset Your Password",
            Template::ChangeEmail => "Confirm Your Email Address",
        }
    }

    fn body(self, username: &str, token: &str) -> String {
        match self {
            Template::Confirm => format!(
                "Dear {username},\n\nWelcome to Agenda! To confirm your \
                 account, use the following code:\n\n{token}\n\nThe code \
                 expires in one hour."
            ),
            Template::Reset => format!(
                "Dear {username},\n\nTo reset your password, use the \
                 following code:\n\n{token}\n\nThe code expires in one \
                 hour. If you did not request a password reset, ignore \
                 this email."
            ),
            Template::ChangeEmail => format!(
                "Dear {username},\n\nTo confirm your new email address, \
                 use the following code:\n\n{token}\n\nThe code expires \
                 in one hour."
            ),
        }
    }
}

/// SMTP mailer instance.
///
/// Sending happens on a detached task so the HTTP response never waits on
/// the mail server; failures are logged and never surfaced to the caller.
#[derive(Clone)]
pub struct MailManager {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Option<Mailbox>,
    subject_prefix: String,
}

impl Default for MailManager {
    fn default() -> Self {
        Self {
            transport: None,
            sender: None,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_owned(),
        }
    }
}

impl MailManager {
    /// Create a new [`MailManager`].
    pub fn new(config: &Mail) -> Result<Self> {
        let builder = if config.ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
        } else if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
        } else {
            Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &config.server,
            ))
        };
        let mut builder = builder.map_err(|err| ServerError::Internal {
            details: "smtp transport cannot be built".into(),
            source: Some(Box::new(err)),
        })?;

        if let Some(port) = config.port {
            builder = builder.port(port);
        }
        if let Some((username, password)) =
            config.username.clone().zip(config.password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let sender = config.sender.parse::<Mailbox>().map_err(|err| {
            ServerError::Internal {
                details: "`sender` mailbox is not valid".into(),
                source: Some(Box::new(err)),
            }
        })?;

        tracing::info!(server = %config.server, "smtp transport ready");

        Ok(Self {
            transport: Some(builder.build()),
            sender: Some(sender),
            subject_prefix: config
                .subject_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_owned()),
        })
    }

    /// Dispatch an email for a specific user off the request path.
    pub fn send(&self, template: Template, to: &str, username: &str, token: &str) {
        let Some((transport, sender)) =
            self.transport.clone().zip(self.sender.clone())
        else {
            tracing::debug!(?template, "mailer disabled, email not sent");
            return;
        };

        let to = match to.parse::<Mailbox>() {
            Ok(to) => to,
            Err(err) => {
                tracing::error!(error = %err, "recipient address is not valid");
                return;
            },
        };

        let message = Message::builder()
            .from(sender)
            .to(to)
            .subject(format!("{} {}", self.subject_prefix, template.subject()))
            .body(template.body(username, token));
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(error = %err, "email cannot be built");
                return;
            },
        };

        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => tracing::debug!(?template, "email sent"),
                Err(err) => {
                    tracing::error!(error = %err, ?template, "email not sent")
                },
            }
        });
    }
}
