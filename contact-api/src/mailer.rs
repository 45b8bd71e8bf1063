use crate::{config::Config, config::ConfigError, email::ComposedEmail};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

/// Hands composed emails to the outside world. Each call makes exactly one delivery attempt.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &ComposedEmail) -> Result<(), TransportError>;
}

/// Wraps whatever went wrong while building or delivering a message.
#[derive(Debug, Error)]
#[error("SMTP error: {0}")]
pub struct TransportError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl TransportError {
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(cause.into())
    }
}

impl From<lettre::error::Error> for TransportError {
    fn from(error: lettre::error::Error) -> Self {
        Self::new(error)
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        Self::new(error)
    }
}

pub struct SmtpMailer {
    relay_url: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::from_url(&config.relay_url)
            .map_err(|error| ConfigError::InvalidRelayUrl(config.relay_url.clone(), error))?
            .authentication(vec![Mechanism::Plain]);
        if let Some(credentials) = credentials(config) {
            builder = builder.credentials(credentials);
        }

        Ok(Self {
            relay_url: config.relay_url.clone(),
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ComposedEmail) -> Result<(), TransportError> {
        let message = Message::builder()
            .from(email.from.clone())
            .to(email.to.clone())
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())?;
        info!(
            "Sending email to {} via {}",
            email.to.email,
            redacted_url(&self.relay_url)
        );
        self.transport.send(message).await?;
        info!("Email sent successfully via SMTP");
        Ok(())
    }
}

/// PLAIN credentials for the operator account. Credentials only go over an encrypted connection.
fn credentials(config: &Config) -> Option<Credentials> {
    is_encrypted(&config.relay_url)
        .then(|| Credentials::new(config.account.to_string(), config.secret.clone()))
}

fn is_encrypted(relay_url: &str) -> bool {
    relay_url.starts_with("smtps://") || relay_url.contains("tls=required")
}

fn redacted_url(relay_url: &str) -> &str {
    // Strip user info.
    match relay_url.split_once("://") {
        Some((_, rest)) => rest
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or(rest),
        None => relay_url,
    }
}
