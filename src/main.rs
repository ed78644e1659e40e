use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use driverpool::api;
use driverpool::config::Config;
use driverpool::error::AppError;
use driverpool::mailer::memory::MemoryMailer;
use driverpool::mailer::smtp::SmtpMailer;
use driverpool::mailer::Mailer;
use driverpool::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let mailer: Arc<dyn Mailer> = match config.smtp_url.as_deref() {
        Some(url) => {
            let smtp = SmtpMailer::from_url(url, &config.mail_from)
                .map_err(|err| AppError::Internal(format!("smtp configuration: {err}")))?;
            Arc::new(smtp)
        }
        None => {
            tracing::warn!("SMTP_URL not configured; outbound mail is recorded in memory only");
            Arc::new(MemoryMailer::new())
        }
    };

    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not configured; admin login is disabled");
    }

    let http_port = config.http_port;
    let state = Arc::new(AppState::new(config, mailer));
    let app = api::rest::router(state);

    let bind_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
