mod api;
mod middleware;

use std::sync::Arc;

use heatshop_catalog::{CacheTtls, CatalogService, FetchSettings};
use heatshop_upstream::UpstreamClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = heatshop_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let facets = heatshop_core::load_catalog_facets(&config.catalog_path)?;
    let upstream = UpstreamClient::new(
        &config.upstream_url,
        config.upstream_timeout_secs,
        &config.upstream_user_agent,
    )?;
    let catalog = CatalogService::new(
        upstream,
        FetchSettings::from_config(&config),
        CacheTtls::from_config(&config),
    );

    tracing::info!(
        env = ?config.env,
        upstream = %config.upstream_url,
        facet_categories = facets.categories.len(),
        "starting heatshop server"
    );

    let app = build_app(AppState {
        catalog: Arc::new(catalog),
        facets: Arc::new(facets),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
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
