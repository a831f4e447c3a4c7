use std::sync::Arc;

use catalog_infra::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = Config::from_env()?;
    tracing::info!(
        table = %config.table_name,
        region = %config.region,
        batch_write_max = config.batch_write_max,
        "configuration loaded"
    );

    let services = Arc::new(catalog_api::app::services::build_services(&config).await?);
    let app = catalog_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
