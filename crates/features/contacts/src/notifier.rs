//! Email notification for new submissions.
//!
//! Delivery is best-effort: [`Notifier::notify`] reports the outcome as a `bool`
//! and logs the cause of any failure.

use crate::error::NotificationError;
use crate::model::NewContact;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::stub::AsyncStubTransport;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use moringa_domain::config::{MailConfig, SmtpSecurity};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where notification messages go.
#[derive(Debug)]
pub enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// `mail.enabled = false`: every send fails, so no submission is reported as emailed.
    Disabled,
    /// Accepts (or rejects) messages in memory.
    Stub(AsyncStubTransport),
}

impl MailTransport {
    /// Builds the transport described by `cfg`.
    ///
    /// # Errors
    /// Returns [`NotificationError::Transport`] if the relay cannot be configured.
    pub fn from_config(cfg: &MailConfig) -> Result<Self, NotificationError> {
        if !cfg.enabled {
            warn!("Mail delivery disabled, submissions will not be emailed");
            return Ok(Self::Disabled);
        }

        let relay_error = |e: lettre::transport::smtp::Error| NotificationError::Transport {
            message: e.to_string().into(),
            context: Some(format!("Configuring relay {}", cfg.host).into()),
        };

        let mut builder = match cfg.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host).map_err(relay_error)?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host).map_err(relay_error)?
            },
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host),
        }
        .port(cfg.port)
        .timeout(Some(Duration::from_secs(cfg.timeout_secs)));

        if let (Some(username), Some(password)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!(host = %cfg.host, port = cfg.port, security = ?cfg.security, "SMTP transport configured");

        Ok(Self::Smtp(builder.build()))
    }

    async fn send(&self, message: Message) -> Result<(), NotificationError> {
        let transport_error = |message: String| NotificationError::Transport {
            message: message.into(),
            context: None,
        };

        match self {
            Self::Smtp(smtp) => smtp.send(message).await.map(|_| ()).map_err(|e| transport_error(e.to_string())),
            Self::Disabled => Err(NotificationError::Disabled),
            Self::Stub(stub) => stub.send(message).await.map_err(|e| transport_error(e.to_string())),
        }
    }
}

/// Sends one email per new submission to the site owner.
#[derive(Debug)]
pub struct Notifier {
    transport: MailTransport,
    from: Mailbox,
    to: Mailbox,
    site_name: String,
    timeout: Duration,
}

impl Notifier {
    /// Builds a notifier and its transport from `cfg`.
    ///
    /// # Errors
    /// Returns [`NotificationError`] for unparsable mailboxes or relay settings.
    pub fn from_config(cfg: &MailConfig) -> Result<Self, NotificationError> {
        Self::with_transport(MailTransport::from_config(cfg)?, cfg)
    }

    /// Builds a notifier over an explicit transport; addresses and limits still come from `cfg`.
    ///
    /// # Errors
    /// Returns [`NotificationError::Address`] if `from` or `to` is not a valid mailbox.
    pub fn with_transport(transport: MailTransport, cfg: &MailConfig) -> Result<Self, NotificationError> {
        Ok(Self {
            transport,
            from: parse_mailbox(&cfg.from, "mail.from")?,
            to: parse_mailbox(&cfg.to, "mail.to")?,
            site_name: cfg.site_name.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }

    #[must_use]
    pub const fn transport(&self) -> &MailTransport {
        &self.transport
    }

    /// Announces `contact` by email. Returns `true` only on confirmed dispatch.
    pub async fn notify(&self, contact: &NewContact) -> bool {
        match self.dispatch(contact).await {
            Ok(()) => {
                debug!(service = %contact.service, "Contact notification sent");
                true
            },
            Err(e) => {
                warn!(error = %e, service = %contact.service, "Contact notification failed");
                false
            },
        }
    }

    async fn dispatch(&self, contact: &NewContact) -> Result<(), NotificationError> {
        let message = self.compose(contact)?;

        tokio::time::timeout(self.timeout, self.transport.send(message)).await.map_err(|_| {
            NotificationError::Timeout {
                message: format!("no answer within {}s", self.timeout.as_secs()).into(),
                context: None,
            }
        })?
    }

    fn compose(&self, contact: &NewContact) -> Result<Message, NotificationError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("New Contact Form Submission - {}", contact.service));

        // The submitter's address passed form validation but may still be an invalid mailbox.
        if let Ok(reply_to) = contact.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                self.render_text(contact),
                self.render_html(contact),
            ))
            .map_err(|e| NotificationError::Build { message: e.to_string().into(), context: None })
    }

    fn render_text(&self, contact: &NewContact) -> String {
        format!(
            "New Contact Form Submission\n\n\
             Name: {}\nEmail: {}\nService Interest: {}\n\n\
             Message:\n{}\n\n---\n\
             This email was sent from the {} website contact form.\n",
            contact.name, contact.email, contact.service, contact.message, self.site_name,
        )
    }

    fn render_html(&self, contact: &NewContact) -> String {
        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #22c55e;">New Contact Form Submission</h2>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3>Contact Details:</h3>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Service Interest:</strong> {service}</p>
  </div>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3>Message:</h3>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb;">
    <p style="color: #6b7280; font-size: 14px;">This email was sent from the {site} website contact form.</p>
  </div>
</div>
"#,
            name = escape_html(&contact.name),
            email = escape_html(&contact.email),
            service = escape_html(&contact.service),
            message = escape_html(&contact.message),
            site = escape_html(&self.site_name),
        )
    }
}

fn parse_mailbox(raw: &str, key: &'static str) -> Result<Mailbox, NotificationError> {
    raw.parse::<Mailbox>().map_err(|e| NotificationError::Address {
        message: format!("'{raw}': {e}").into(),
        context: Some(key.into()),
    })
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
