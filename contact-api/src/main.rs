use anyhow::Context;
use contact_api::{
    config::Config, handler::ContactFormHandler, mailer::SmtpMailer, masking::mask_email, router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(error) = dotenvy::dotenv() {
        warn!(".env file not loaded ({error}), using system environment variables");
    }

    let config = Config::from_env().context("Invalid configuration")?;
    info!("Contact API starting...");
    info!("Using account: {}", mask_email(&config.account.to_string()));
    info!("App password length: {} characters", config.secret.chars().count());

    let mailer = SmtpMailer::new(&config).context("Invalid mail transport configuration")?;
    let app = router(Arc::new(ContactFormHandler::new(&config, mailer)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind to {addr}"))?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
