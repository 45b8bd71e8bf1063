use crate::{
    config::Config,
    email::{compose, FormatError},
    mailer::{Mailer, TransportError},
    masking::mask_email,
    submission::{ContactFormMessage, ValidationError},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const SENT_MESSAGE: &str = "Email sent successfully";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email. Please try again later.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const HEALTHY_MESSAGE: &str = "API is healthy";

/// Body of every JSON response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Runs one contact form submission through decoding, validation, formatting and sending.
pub struct ContactFormHandler<MailerT: Mailer> {
    operator: Mailbox,
    mailer: MailerT,
}

impl<MailerT: Mailer> ContactFormHandler<MailerT> {
    pub fn new(config: &Config, mailer: MailerT) -> Self {
        Self {
            operator: config.operator_mailbox(),
            mailer,
        }
    }

    #[cfg(test)]
    pub(crate) fn mailer(&self) -> &MailerT {
        &self.mailer
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> Response {
        info!("Received {method} request to /api/contact");
        match self.process_message(method, body).await {
            Ok(()) => (StatusCode::OK, Json(ApiResponse::success(SENT_MESSAGE))).into_response(),
            Err(error) => {
                error.log();
                error.into_response()
            }
        }
    }

    async fn process_message(&self, method: &Method, body: &[u8]) -> Result<(), ContactFormError> {
        if *method != Method::POST {
            return Err(ContactFormError::MethodNotAllowed(method.clone()));
        }
        let message = decode(body)?;
        info!(
            "Received contact request from: {} <{}>",
            message.name.as_deref().unwrap_or_default(),
            mask_email(message.email.as_deref().unwrap_or_default())
        );
        let submission = message.validate()?;
        let email = compose(&submission, &self.operator)?;
        info!("Preparing to send email with subject: {}", email.subject);
        self.mailer.send(&email).await?;
        info!("Email sent successfully from: {}", mask_email(&submission.email));
        Ok(())
    }
}

/// Decodes the first JSON value in the body. A `null` body decodes as an empty message and
/// anything after the first value is ignored.
fn decode(body: &[u8]) -> Result<ContactFormMessage, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    Ok(Option::<ContactFormMessage>::deserialize(&mut deserializer)?.unwrap_or_default())
}

pub async fn handle_contact<MailerT: Mailer>(
    State(handler): State<Arc<ContactFormHandler<MailerT>>>,
    method: Method,
    body: Bytes,
) -> Response {
    handler.handle(&method, &body).await
}

/// Always healthy; no dependencies are checked.
pub async fn handle_health() -> Json<ApiResponse> {
    Json(ApiResponse::success(HEALTHY_MESSAGE))
}

#[derive(Debug, Error)]
pub enum ContactFormError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),
    #[error("Invalid request body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Error composing email: {0}")]
    Format(#[from] FormatError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ContactFormError {
    fn log(&self) {
        match self {
            ContactFormError::MethodNotAllowed(_)
            | ContactFormError::Decode(_)
            | ContactFormError::Validation(_) => {
                warn!("Client error handling contact form message: {self}");
            }
            ContactFormError::Format(_) | ContactFormError::Transport(_) => {
                error!("Internal error handling contact form message: {self}");
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ContactFormError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ContactFormError::Decode(_) | ContactFormError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ContactFormError::Format(_) | ContactFormError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message shown to the caller. Internal failures are never described in detail.
    fn client_message(&self) -> String {
        match self {
            ContactFormError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED_MESSAGE.into(),
            ContactFormError::Decode(_) | ContactFormError::Validation(_) => self.to_string(),
            ContactFormError::Format(_) | ContactFormError::Transport(_) => {
                SEND_FAILED_MESSAGE.into()
            }
        }
    }
}

impl IntoResponse for ContactFormError {
    fn into_response(self) -> Response {
        (self.status(), Json(ApiResponse::failure(self.client_message()))).into_response()
    }
}
