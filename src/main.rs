use dotenvy::dotenv;
use fridgewise::router::init_router;
use fridgewise::state::init_app_state;
use fridgewise_observability::{init_metrics, init_tracing, metrics_app, shutdown_tracer};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let result = run().await;
    if let Err(e) = &result {
        error!(error = %e, "Server exited with an error");
    }

    shutdown_tracer().await;
    result
}

async fn run() -> anyhow::Result<()> {
    let state = init_app_state()?;
    let bind_address = state.server_config.bind_address();
    let metrics_address = state.server_config.metrics_address();

    if let Some(handle) = init_metrics() {
        let listener = TcpListener::bind(&metrics_address).await?;
        info!(address = %metrics_address, "Metrics listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let app = init_router(state);
    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Server running");
    info!("Scalar UI available at http://{}/scalar", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
