//! AIRequest controller service.
//!
//! Watches `AIRequest` custom resources and drives each one through the
//! Pending → Processing → AwaitingApproval lifecycle, leaving approval and
//! manifest application to external actors.

use airequest_controller::requests::run_request_controller;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,airequest_controller=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting AIRequest controller v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Kubernetes client
    let client = kube::Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let namespace =
        std::env::var("CONTROLLER_NAMESPACE").unwrap_or_else(|_| "default".to_string());

    let controller_handle = tokio::spawn(run_request_controller(client, namespace));

    shutdown_signal().await;
    info!("Shutdown signal received, stopping controller");

    controller_handle.abort();
    if let Ok(Err(e)) = controller_handle.await {
        error!("Controller exited with error: {}", e);
    }

    info!("Controller service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
