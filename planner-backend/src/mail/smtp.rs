//! SMTP transport over implicit TLS (e.g. smtp.gmail.com:465)

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailTransport, NotifyError, ReminderEmail};
use crate::config::MailConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the relay client. No connection is made until the first send.
    pub fn new(mail: &MailConfig) -> Result<Self, NotifyError> {
        let (Some(user), Some(password)) = (&mail.sender, &mail.password) else {
            return Err(NotifyError::Transport("sender credentials are missing".to_string()));
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(mail.smtp_port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|_| NotifyError::Address(address.to_string()))
}

/// Turn a formatted reminder into a plain-text MIME message
pub fn build_message(email: &ReminderEmail) -> Result<Message, NotifyError> {
    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| NotifyError::Message(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &ReminderEmail) -> Result<(), NotifyError> {
        let message = build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(from: &str) -> ReminderEmail {
        ReminderEmail {
            from: from.to_string(),
            to: "you@example.com".to_string(),
            subject: "Reminder: 1 task(s) due tomorrow".to_string(),
            body: "- [HW] Math: Problem set\n".to_string(),
        }
    }

    #[test]
    fn test_build_message() {
        let message = build_message(&email("me@example.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Reminder: 1 task(s) due tomorrow"));
        assert!(raw.contains("Problem set"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let result = build_message(&email("not an address"));
        assert!(matches!(result, Err(NotifyError::Address(_))));
    }

    #[test]
    fn test_new_requires_credentials() {
        let mail = MailConfig {
            sender: Some("me@example.com".to_string()),
            password: None,
            recipient: Some("you@example.com".to_string()),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
        };
        assert!(SmtpMailer::new(&mail).is_err());
    }
}
