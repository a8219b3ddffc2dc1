//! Reminder digest email.
//!
//! `Notifier` formats the digest and hands it to a `MailTransport`. Delivery
//! problems are logged and returned as a `ReminderDelivery` value; they are
//! never raised to the caller.

pub mod smtp;

use async_trait::async_trait;
use planner_types::Task;
use std::sync::Arc;
use thiserror::Error;

use crate::config::MailConfig;

pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address '{0}'")]
    Address(String),
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// A fully formatted message ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &ReminderEmail) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NothingDue,
    NotConfigured,
}

/// What happened to one `send_reminder` call
#[derive(Debug)]
pub enum ReminderDelivery {
    Sent { count: usize },
    Skipped(SkipReason),
    Failed(NotifyError),
}

pub struct Notifier {
    sender: Option<String>,
    recipient: Option<String>,
    transport: Option<Arc<dyn MailTransport>>,
}

impl Notifier {
    pub fn new(
        sender: Option<String>,
        recipient: Option<String>,
        transport: Option<Arc<dyn MailTransport>>,
    ) -> Self {
        Self {
            sender,
            recipient,
            transport,
        }
    }

    /// Build an SMTP-backed notifier. Incomplete credentials leave it disabled.
    pub fn from_config(mail: &MailConfig) -> Self {
        let transport: Option<Arc<dyn MailTransport>> = if mail.is_complete() {
            match SmtpMailer::new(mail) {
                Ok(mailer) => {
                    log::info!("[MAIL] SMTP relay {}:{} configured", mail.smtp_host, mail.smtp_port);
                    Some(Arc::new(mailer))
                }
                Err(e) => {
                    log::error!("[MAIL] Failed to set up SMTP transport: {}", e);
                    None
                }
            }
        } else {
            log::warn!("[MAIL] Mail settings incomplete, reminders will not be sent");
            None
        };

        Self::new(mail.sender.clone(), mail.recipient.clone(), transport)
    }

    pub fn is_configured(&self) -> bool {
        self.sender.is_some() && self.recipient.is_some() && self.transport.is_some()
    }

    /// Send one digest for `due`. Always returns; failures are logged.
    pub async fn send_reminder(&self, due: &[Task]) -> ReminderDelivery {
        if due.is_empty() {
            return ReminderDelivery::Skipped(SkipReason::NothingDue);
        }

        let (Some(sender), Some(recipient), Some(transport)) =
            (&self.sender, &self.recipient, &self.transport)
        else {
            log::warn!(
                "[MAIL] Skipping reminder for {} task(s): mail is not configured",
                due.len()
            );
            return ReminderDelivery::Skipped(SkipReason::NotConfigured);
        };

        let (subject, body) = compose_reminder(due);
        let email = ReminderEmail {
            from: sender.clone(),
            to: recipient.clone(),
            subject,
            body,
        };

        match transport.send(&email).await {
            Ok(()) => {
                log::info!("[MAIL] Reminder sent to {} ({} task(s))", recipient, due.len());
                ReminderDelivery::Sent { count: due.len() }
            }
            Err(e) => {
                log::error!("[MAIL] Failed to send reminder: {}", e);
                ReminderDelivery::Failed(e)
            }
        }
    }
}

/// Subject and plain-text body of the digest
pub fn compose_reminder(due: &[Task]) -> (String, String) {
    let subject = format!("Reminder: {} task(s) due tomorrow", due.len());

    let mut body = String::from("The following tasks are due tomorrow:\n\n");
    for task in due {
        body.push_str(&format!("- [{}] {}: {}\n", task.task_type, task.subject, task.title));
    }

    (subject, body)
}
