use lettre::{address::AddressError, message::Mailbox, Address};
use std::{fmt, num::ParseIntError};
use thiserror::Error;

pub const ACCOUNT_VAR: &str = "GMAIL_EMAIL";
pub const SECRET_VAR: &str = "GMAIL_APP_PASSWORD";
pub const PORT_VAR: &str = "PORT";
pub const RELAY_URL_VAR: &str = "SMTP_URL";

pub const DEFAULT_PORT: u16 = 8910;
pub const DEFAULT_RELAY_URL: &str = "smtp://smtp.gmail.com:587?tls=required";

/// Process-wide settings, loaded once at startup and read-only afterwards.
#[derive(Clone)]
pub struct Config {
    /// The operator's account. Every message is sent from and to this address.
    pub account: Address,
    pub secret: String,
    pub relay_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let account = lookup(ACCOUNT_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVariable(ACCOUNT_VAR))?;
        let secret: String = lookup(SECRET_VAR)
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if secret.is_empty() {
            return Err(ConfigError::MissingVariable(SECRET_VAR));
        }
        let account: Address = account
            .parse()
            .map_err(|error| ConfigError::InvalidAccount(account, error))?;
        let port = match lookup(PORT_VAR).filter(|value| !value.trim().is_empty()) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|error| ConfigError::InvalidPort(value, error))?,
            None => DEFAULT_PORT,
        };
        let relay_url = lookup(RELAY_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RELAY_URL.into());

        Ok(Self {
            account,
            secret,
            relay_url,
            port,
        })
    }

    pub fn operator_mailbox(&self) -> Mailbox {
        Mailbox::new(None, self.account.clone())
    }

    #[cfg(test)]
    pub(crate) fn arbitrary() -> Self {
        Self {
            account: "operator@example.com".parse().unwrap(),
            secret: "arbitrarysecret".into(),
            relay_url: DEFAULT_RELAY_URL.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .field("relay_url", &self.relay_url)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment variables")]
    MissingVariable(&'static str),
    #[error("GMAIL_EMAIL value {0:?} is not a valid email address: {1}")]
    InvalidAccount(String, #[source] AddressError),
    #[error("PORT value {0:?} is not a valid port: {1}")]
    InvalidPort(String, #[source] ParseIntError),
    #[error("SMTP_URL value {0:?} is not a usable SMTP relay: {1}")]
    InvalidRelayUrl(String, #[source] lettre::transport::smtp::Error),
}
