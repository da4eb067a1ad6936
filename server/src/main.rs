//! Workplace Webhook Server - Main Entry Point
//!
//! Runs the receiver with logging handlers for every known object type.

use anyhow::Result;
use tracing::info;

use wp_webhook::{config, Object, WebhookServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wp_webhook=info,tower_http=info".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;
    let bind_address = config.bind_address.clone();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        routing = ?config.routing,
        "Starting Workplace webhook server"
    );

    let server = WebhookServer::new(config);
    for object in Object::KNOWN {
        server.handle_object(object.clone(), |envelope| {
            info!(
                object = %envelope.object,
                entries = envelope.entries().count(),
                changes = envelope.changes().count(),
                "Webhook event received"
            );
            Ok(())
        });
    }

    server.serve(&bind_address).await?;

    info!("Server shutdown complete");

    Ok(())
}
