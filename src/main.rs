use std::net::SocketAddr;

use coursehub::coursehub_config::ServerConfig;
use coursehub::logging::{init_tracing, shutdown_tracer};
use coursehub::metrics::{init_metrics, metrics_app};
use coursehub::router::init_router;
use coursehub::state::init_app_state;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics() {
        let metrics_addr = server_config.metrics_addr.clone();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(&metrics_addr).await {
                Ok(listener) => {
                    info!(addr = %metrics_addr, "Metrics server listening");
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => error!(addr = %metrics_addr, error = %e, "Failed to bind metrics server"),
            }
        });
    }

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&state.db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let app = init_router(state);

    let listener = match tokio::net::TcpListener::bind(&server_config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %server_config.addr, error = %e, "Failed to bind server");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", server_config.addr);
    info!("📚 Swagger UI available at http://{}/swagger-ui", server_config.addr);
    info!("📖 Scalar UI available at http://{}/scalar", server_config.addr);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = result {
        error!(error = %e, "Server error");
    }

    shutdown_tracer().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
