use std::sync::Arc;

use agency_api::uploads::UploadStore;
use agency_api::{app, AppConfig, AppState, Collaborators};
use agency_core::auth::AdminGate;
use agency_core::notify::{MailSettings, TemplateRenderer};
use agency_core::store::PgStore;
use agency_integrations::{GoogleCalendarClient, GoogleCredentials, SmtpMailer, SmtpSettings};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!(?config, "Starting agency API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

    tracing::info!("Database migrations applied");

    let mailer = SmtpMailer::new(&SmtpSettings {
        host: config.smtp_host.clone(),
        port: config.smtp_port,
        username: config.email_user.clone(),
        password: config.email_pass.clone(),
        tls: config.smtp_tls,
    })
    .map_err(|e| anyhow::anyhow!("Failed to configure SMTP: {e}"))?;

    let calendar = GoogleCalendarClient::new(GoogleCredentials {
        client_id: config.google_client_id.clone(),
        client_secret: config.google_client_secret.clone(),
        redirect_uri: config.google_redirect_uri.clone(),
        refresh_token: config.google_refresh_token.clone(),
    });

    let templates = TemplateRenderer::new()
        .map_err(|e| anyhow::anyhow!("Failed to load email templates: {e}"))?;

    let uploads = UploadStore::new(&config.upload_dir);
    uploads
        .ensure_dir()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create upload directory: {e}"))?;

    let state = AppState::new(Collaborators {
        store: Arc::new(PgStore::new(pool)),
        calendar: Arc::new(calendar),
        mailer: Arc::new(mailer),
        templates: Arc::new(templates),
        mail: MailSettings {
            sender_address: config.email_user.clone(),
            operator_address: config.admin_email.clone(),
        },
        timezone: config.scheduler_timezone,
        gate: AdminGate::new(config.admin_password.clone(), &config.jwt_secret),
        uploads,
    });

    let app = app(state, config.max_upload_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
