use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tracing::info;

use super::{InvitationEmail, MailError, Mailer};

/// Connection settings read from `SMTP_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub tls_disabled: bool,
}

impl SmtpSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MailError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| MailError::EnvVarMissing(name.to_string()))
        };
        let port_raw = required("SMTP_PORT")?;
        let port = port_raw
            .trim()
            .parse()
            .map_err(|_| MailError::Other(format!("SMTP_PORT is not a port: {port_raw}")))?;

        Ok(Self {
            host: required("SMTP_HOST")?,
            port,
            username: required("SMTP_USERNAME")?,
            password: required("SMTP_PASSWORD")?,
            from: required("SMTP_FROM")?,
            tls_disabled: lookup("SMTP_TLS_DISABLED")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        })
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_settings(SmtpSettings::from_lookup(|name| std::env::var(name).ok())?)
    }

    pub fn from_settings(settings: SmtpSettings) -> Result<Self, MailError> {
        let sender: Mailbox = settings.from.parse()?;

        let transport = if settings.tls_disabled {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
                .build()
        } else {
            let tls = TlsParameters::new(settings.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
                .port(settings.port)
                .tls(Tls::Required(tls))
                .credentials(Credentials::new(settings.username, settings.password))
                .build()
        };

        info!(host = %settings.host, port = settings.port, "SMTP mailer configured");
        Ok(Self {
            transport: Arc::new(transport),
            sender,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_invitation_email(&self, invitation: &InvitationEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(invitation.to.parse()?)
            .subject(invitation.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(invitation.body())?;

        self.transport.send(message).await?;
        Ok(())
    }
}
