use crate::error::FaviconError;
use crate::favicon_sources::{default_sources, FaviconSource, FaviconTarget};
use crate::icon_fetcher::{FetchResult, IconFetcher};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use futures::future::join_all;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn IconFetcher>,
    pub sources: Arc<Vec<FaviconSource>>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn IconFetcher>) -> Self {
        Self::with_sources(fetcher, default_sources())
    }

    pub fn with_sources(fetcher: Arc<dyn IconFetcher>, sources: Vec<FaviconSource>) -> Self {
        Self {
            fetcher,
            sources: Arc::new(sources),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct FaviconQuery {
    url: Option<String>,
    size: Option<String>,
}

impl FaviconQuery {
    /// Empty values count as missing.
    fn required(&self) -> Result<(&str, &str), FaviconError> {
        match (self.url.as_deref(), self.size.as_deref()) {
            (Some(url), Some(size)) if !url.is_empty() && !size.is_empty() => Ok((url, size)),
            _ => Err(FaviconError::MissingParameters),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/favicons", get(favicons_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

pub async fn favicons_handler(
    State(state): State<AppState>,
    query: Result<Query<FaviconQuery>, QueryRejection>,
) -> Result<Json<Vec<FetchResult>>, FaviconError> {
    // Repeated keys and malformed encoding land here
    let Query(params) = query.map_err(|e| FaviconError::InvalidUrl(e.body_text()))?;
    let (url, size) = params.required()?;
    let target = FaviconTarget::parse(url)?;

    info!("Favicon request for domain '{}' at size {}", target.domain, size);

    let icons = collect_favicons(state.fetcher.as_ref(), &state.sources, &target, size).await;
    if icons.is_empty() {
        info!("No favicons found for {}", target.domain);
        return Err(FaviconError::NoFavicons);
    }

    info!(
        "Found {}/{} favicons for {}",
        icons.len(),
        state.sources.len(),
        target.domain
    );
    Ok(Json(icons))
}

/// Query every source concurrently and keep the hits in source order.
///
/// Waits for all sources; a slow or failing source never cancels the others.
pub async fn collect_favicons(
    fetcher: &dyn IconFetcher,
    sources: &[FaviconSource],
    target: &FaviconTarget,
    size: &str,
) -> Vec<FetchResult> {
    let candidates: Vec<(String, &str)> = sources
        .iter()
        .map(|source| (source.render(target, size), source.name.as_str()))
        .collect();

    for (url, name) in &candidates {
        debug!("Candidate {}: {}", name, url);
    }

    let fetches = candidates
        .iter()
        .map(|(url, name)| fetcher.fetch_icon(url, name));

    join_all(fetches).await.into_iter().flatten().collect()
}
