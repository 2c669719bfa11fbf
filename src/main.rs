//! # Payment Reminder Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts
//! the reminder service and serves the webhook and health endpoints.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payment_reminder_bot::bot::handlers::BotHandler;
use payment_reminder_bot::config::Config;
use payment_reminder_bot::database::connection::DatabaseManager;
use payment_reminder_bot::services::api::{self, ApiState};
use payment_reminder_bot::services::health::HealthService;
use payment_reminder_bot::services::messaging::{MessageSender, TwilioOptions, TwilioSender};
use payment_reminder_bot::services::reminder::{ReminderRunner, ReminderService};
use payment_reminder_bot::services::templates::RandomPicker;
use payment_reminder_bot::utils::logging::log_system_event;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payment_reminder_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Payment Reminder Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Database: {}, HTTP Port: {}, Reminder poll: {} min",
        config.database_url, config.http_port, config.reminder_poll_minutes);

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let sender: Arc<dyn MessageSender> = Arc::new(TwilioSender::new(TwilioOptions {
        account_sid: config.twilio_account_sid.clone(),
        auth_token: config.twilio_auth_token.clone(),
        from: config.whatsapp_from.clone(),
    }));
    let handler = BotHandler::new(db_arc.as_ref().clone(), sender.clone());

    // Initialize and start reminder service
    info!("Initializing reminder service...");
    let runner = ReminderRunner::new(
        db_arc.clone(),
        sender,
        Arc::new(RandomPicker),
        config.reminder_poll_minutes,
    );
    let mut reminder_service = match ReminderService::new(runner.clone()).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create reminder service: {}", e);
            return Err(anyhow::anyhow!("Failed to create reminder service: {}", e));
        }
    };

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    let health_service = HealthService::new(
        db_arc.clone(),
        handler.conversations().clone(),
        runner.poll_minutes(),
    );
    let app = api::app(
        health_service.router,
        ApiState {
            handler,
            reminders: runner,
        },
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    log_system_event("HTTP server listening", Some(&format!("port {}", config.http_port)));

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    // Stop reminder service on shutdown
    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("Application stopped", None);
    Ok(())
}
