use anyhow::Context;
use std::sync::Arc;
use storefront_storage::{InMemoryStore, LocalImageHost};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod metrics;
mod routes;

use auth::SellerAuth;
use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.media_dir)
        .with_context(|| format!("create media dir {}", config.media_dir.display()))?;

    let state = AppState {
        store: Arc::new(InMemoryStore::new()),
        images: Arc::new(LocalImageHost::new(
            config.media_dir.clone(),
            config.media_base_url.clone(),
        )),
        auth: Arc::new(SellerAuth::new(config.seller_keys.clone())),
    };
    let app = routes::router(state, &config.media_dir, config.max_upload_bytes);

    info!("http listening on {}", config.http_addr);
    match &config.tls {
        Some(tls) => {
            let rustls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .context("load tls certificate")?;
            axum_server::bind_rustls(config.http_addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            axum_server::bind(config.http_addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}
