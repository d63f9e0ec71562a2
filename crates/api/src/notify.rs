//! Account notification emails.
//!
//! Notification delivery is decoupled from request handling: handlers enqueue
//! onto a bounded channel and a background worker drives the mailer with
//! bounded retries. A slow or failing SMTP server never delays or fails the
//! request that triggered the email.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::EmailConfig;

const QUEUE_CAPACITY: usize = 256;
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Account events that produce an email.
#[derive(Debug, Clone)]
pub enum Notification {
    /// New account registered. Carries the initial password; this is the one
    /// place it leaves the server in plain text.
    Welcome {
        to: String,
        name: String,
        password: String,
    },
    /// Account details changed by an administrator.
    AccountUpdated {
        to: String,
        name: String,
        password_changed: bool,
    },
}

impl Notification {
    fn recipient(&self) -> &str {
        match self {
            Self::Welcome { to, .. } | Self::AccountUpdated { to, .. } => to,
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "Welcome to Layerworks",
            Self::AccountUpdated { .. } => "Your Layerworks account was updated",
        }
    }

    fn body(&self) -> String {
        match self {
            Self::Welcome { name, password, .. } => format!(
                "Hello {name},\n\n\
                 Your Layerworks account has been created.\n\
                 Your password is: {password}\n\n\
                 Please sign in and change it."
            ),
            Self::AccountUpdated {
                name,
                password_changed,
                ..
            } => {
                let detail = if *password_changed {
                    "Your password was changed."
                } else {
                    "Your account details were changed."
                };
                format!(
                    "Hello {name},\n\n\
                     {detail}\n\
                     If this wasn't you, contact your administrator."
                )
            }
        }
    }
}

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Delivery backend for notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), MailError>;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        let to = notification.recipient();
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_owned()))?)
            .subject(notification.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body())?;

        self.transport.send(message).await?;

        tracing::info!(to = %to, subject = %notification.subject(), "Email sent successfully");
        Ok(())
    }
}

/// Mailer used when SMTP is not configured. Logs instead of sending.
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        tracing::info!(
            to = %notification.recipient(),
            subject = %notification.subject(),
            "SMTP not configured, skipping email"
        );
        Ok(())
    }
}

/// Handle for enqueueing notifications from request handlers.
///
/// Enqueue failures are logged and swallowed: a lost email must never fail
/// the account operation that triggered it.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    /// Create the queue and spawn its delivery worker.
    #[must_use]
    pub fn spawn(mailer: Arc<dyn Mailer>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(mailer, rx));
        Self { tx }
    }

    /// Enqueue a notification for background delivery.
    pub fn enqueue(&self, notification: Notification) {
        if let Err(err) = self.tx.try_send(notification) {
            tracing::warn!(error = %err, "notification queue full or closed, dropping email");
        }
    }
}

async fn run_worker(mailer: Arc<dyn Mailer>, mut rx: mpsc::Receiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        for attempt in 0..MAX_SEND_ATTEMPTS {
            match mailer.send(&notification).await {
                Ok(()) => break,
                Err(err) if attempt + 1 < MAX_SEND_ATTEMPTS => {
                    tracing::warn!(
                        error = %err,
                        attempt = attempt + 1,
                        "notification send failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        to = %notification.recipient(),
                        "notification send failed, giving up"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingMailer {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, notification: &Notification) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_enqueued_notifications_are_delivered() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let queue = NotificationQueue::spawn(mailer.clone());

        queue.enqueue(Notification::Welcome {
            to: "new@example.com".to_owned(),
            name: "New User".to_owned(),
            password: "hunter2pass".to_owned(),
        });
        queue.enqueue(Notification::AccountUpdated {
            to: "new@example.com".to_owned(),
            name: "New User".to_owned(),
            password_changed: true,
        });

        // Give the worker a moment to drain the channel.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], Notification::Welcome { .. }));
        assert!(matches!(sent[1], Notification::AccountUpdated { .. }));
    }

    #[test]
    fn test_welcome_body_includes_initial_password() {
        let body = Notification::Welcome {
            to: "a@b.c".to_owned(),
            name: "A".to_owned(),
            password: "initial-pass".to_owned(),
        }
        .body();
        assert!(body.contains("initial-pass"));
    }

    #[test]
    fn test_update_body_never_includes_password() {
        let body = Notification::AccountUpdated {
            to: "a@b.c".to_owned(),
            name: "A".to_owned(),
            password_changed: true,
        }
        .body();
        assert!(body.contains("password was changed"));
    }
}
