mod api;
mod config;
mod db;
mod errors;
mod system;
mod videos;

use std::error::Error;
use std::sync::Arc;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use jsonwebtoken::DecodingKey;
use secrecy::ExposeSecret;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Settings;
use crate::db::init_db;
use crate::videos::{MetadataFetcher, PgVideoStore, VideoStore, YoutubeClient};

#[derive(Clone)]
pub struct InnerState {
    pub store: Arc<dyn VideoStore>,
    pub fetcher: Arc<dyn MetadataFetcher>,
    pub token_key: Option<DecodingKey>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_videolist=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let db = init_db(
        settings.database_url.expose_secret(),
        settings.database_max_connections,
    )
    .await?;

    let youtube_client = YoutubeClient::new(
        settings.youtube_api_base_url.clone(),
        settings.youtube_api_key,
        settings.youtube_api_timeout,
    )?;

    if settings.token_secret.is_none() {
        tracing::warn!("SECRET_TOKEN not set, every submission will be anonymous");
    }
    let token_key = settings
        .token_secret
        .as_ref()
        .map(|secret| DecodingKey::from_secret(secret.expose_secret().as_bytes()));

    let app_state = InnerState {
        store: Arc::new(PgVideoStore::new(db)),
        fetcher: Arc::new(youtube_client),
        token_key,
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = api::create_router(app_state)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
