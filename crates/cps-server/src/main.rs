mod api;
mod middleware;

use std::sync::Arc;

use cps_catalog::CatalogEngine;
use cps_supabase::SupabaseClient;
use cps_update::{UpdateError, UpdateService};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = cps_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = SupabaseClient::from_config(&config)?;
    let engine = CatalogEngine::new(client).with_category_page_size(config.category_page_size);

    let updates = match UpdateService::from_config(&config) {
        Ok(service) => Some(Arc::new(service)),
        Err(UpdateError::NotConfigured(reason)) => {
            tracing::warn!(reason = %reason, "update routes disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let state = AppState {
        engine: Arc::new(engine),
        updates,
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
