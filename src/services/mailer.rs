//! Delivery of contact form messages by email.

use async_trait::async_trait;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::ContactConfig;
use crate::models::ContactMessage;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ContactMailer: Send + Sync {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError>;
}

/// Sends contact messages to the site owner's mailbox over SMTP
pub struct SmtpMailer {
    host: String,
    port: u16,
    user: Option<String>,
    pass: Option<String>,
}

impl SmtpMailer {
    pub fn new(config: &ContactConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            user: config.email_user.clone(),
            pass: config.email_pass.clone(),
        }
    }

    fn transport(&self, user: &str, pass: &str) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        // Port 465 = implicit TLS, anything else = STARTTLS
        let builder = if self.port == 465 {
            let tls = TlsParameters::new(self.host.clone())
                .map_err(|e| MailError::Transport(format!("Invalid TLS parameters: {}", e)))?;
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
                .map(|b| b.port(self.port).tls(Tls::Wrapper(tls)))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host).map(|b| b.port(self.port))
        }
        .map_err(|e| MailError::Transport(format!("Invalid SMTP host: {}", e)))?;

        Ok(builder
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .build())
    }
}

/// Simple HTML escaping for email content
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn format_text(message: &ContactMessage, sent: &str) -> String {
    format!(
        "Name: {}\nEmail: {}\nSent: {}\n\nMessage:\n{}\n",
        message.name, message.email, sent, message.message
    )
}

pub fn format_html(message: &ContactMessage, sent: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; border-radius: 5px 5px 0 0;">
            <h2>New Contact Form Submission</h2>
        </div>
        <div style="background: #f9f9f9; padding: 20px; border: 1px solid #ddd; border-top: none;">
            <p><strong style="color: #667eea;">Name:</strong><br>{name}</p>
            <p><strong style="color: #667eea;">Email:</strong><br>{email}</p>
            <p><strong style="color: #667eea;">Sent:</strong><br>{sent}</p>
            <p><strong style="color: #667eea;">Message:</strong></p>
            <div style="background: white; padding: 15px; border-left: 4px solid #667eea;">{body}</div>
        </div>
    </div>
</body>
</html>"#,
        name = html_escape(&message.name),
        email = html_escape(&message.email),
        sent = sent,
        body = html_escape(&message.message).replace('\n', "<br>"),
    )
}

#[async_trait]
impl ContactMailer for SmtpMailer {
    async fn send(&self, message: &ContactMessage) -> Result<(), MailError> {
        let user = self
            .user
            .as_deref()
            .ok_or(MailError::NotConfigured("EMAIL_USER is not set"))?;
        let pass = self
            .pass
            .as_deref()
            .ok_or(MailError::NotConfigured("EMAIL_PASS is not set"))?;

        let owner: Mailbox = user
            .parse()
            .map_err(|_| MailError::InvalidAddress(user.to_string()))?;
        let reply_to: Mailbox = message
            .email
            .parse()
            .map_err(|_| MailError::InvalidAddress(message.email.clone()))?;

        let sent = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();

        let email = Message::builder()
            .from(owner.clone())
            .to(owner)
            .reply_to(reply_to)
            .subject(format!("Portfolio Contact: {}", message.name))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(format_text(message, &sent)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format_html(message, &sent)),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport(user, pass)?
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        log::info!("Contact email from {} delivered", message.email);
        Ok(())
    }
}
