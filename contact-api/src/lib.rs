//! HTTP API which relays contact form submissions to the operator's own mailbox over SMTP.

pub mod config;
pub mod cors;
pub mod email;
pub mod handler;
pub mod mailer;
pub mod masking;
pub mod submission;

use axum::{extract::DefaultBodyLimit, middleware, routing::any, Router};
use handler::{handle_contact, handle_health, ContactFormHandler};
use mailer::Mailer;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const CONTACT_PATH: &str = "/api/contact";
pub const HEALTH_PATH: &str = "/health";

/// Builds the application router: the contact and health routes behind the cross-origin stage
/// and request tracing. Unknown paths get a bare `404`, preflight included. Request bodies are
/// not size limited.
pub fn router<MailerT: Mailer>(handler: Arc<ContactFormHandler<MailerT>>) -> Router {
    Router::new()
        .route(CONTACT_PATH, any(handle_contact::<MailerT>))
        .route(HEALTH_PATH, any(handle_health))
        .route_layer(middleware::from_fn(cors::allow_cross_origin))
        .with_state(handler)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}
