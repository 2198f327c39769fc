//! HTTP surface: render endpoints plus the published objects.

use std::num::NonZeroU16;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::post;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use url::Url;

use crate::captions::{CaptionSource, MessagesApiCaptions, OfflineCaptions};
use crate::cli::CliOptions;
use crate::error::DuckgenError;
use crate::render::Fonts;
use crate::storage::{LocalObjectStore, ObjectStore};

mod ducks;
mod memes;
mod middleware;
mod prelude;

pub use ducks::{DuckRequest, DuckResponse};
pub use memes::{MemeRequest, MemeResponse};

/// Everything a handler needs, shared across requests.
#[derive(Clone, Debug)]
pub struct AppState {
    fonts: Arc<Fonts>,
    store: Arc<dyn ObjectStore>,
    captions: Arc<dyn CaptionSource>,
    public_base_url: Url,
    caption_timeout: Duration,
}

impl AppState {
    /// Assembles state from already-built collaborators.
    pub fn new(
        fonts: Arc<Fonts>,
        store: Arc<dyn ObjectStore>,
        captions: Arc<dyn CaptionSource>,
        public_base_url: Url,
        caption_timeout: Duration,
    ) -> Self {
        Self {
            fonts,
            store,
            captions,
            public_base_url,
            caption_timeout,
        }
    }

    /// Loads fonts and wires up storage and captioning from the command line.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, DuckgenError> {
        let fonts = Fonts::load(
            Some(cli.font_path.as_path()),
            Some(cli.bold_font_path.as_path()),
        )?;
        let store = LocalObjectStore::new(cli.storage_dir.clone());
        let captions: Arc<dyn CaptionSource> = match cli.anthropic_api_key.as_deref() {
            Some(api_key) if !api_key.trim().is_empty() => Arc::new(MessagesApiCaptions::new(
                reqwest::Client::new(),
                cli.caption_endpoint.clone(),
                api_key.to_string(),
                cli.caption_model.clone(),
            )),
            _ => {
                warn!("No caption API key configured, memes will use fallback captions");
                Arc::new(OfflineCaptions)
            }
        };

        Ok(Self::new(
            Arc::new(fonts),
            Arc::new(store),
            captions,
            cli.public_base_url.clone(),
            Duration::from_secs(cli.caption_timeout_secs),
        ))
    }
}

/// Reads a request body that is either the JSON object itself or a gateway
/// envelope carrying it under `body`, as a string or as an object.
pub(crate) fn parse_request<T: DeserializeOwned>(body: &[u8]) -> Result<T, DuckgenError> {
    let value = match parse_json(body)? {
        Value::Object(mut fields) if fields.contains_key("body") => match fields.remove("body") {
            Some(Value::String(inner)) => parse_json(inner.as_bytes())?,
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(inner) => inner,
        },
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|err| DuckgenError::Validation(format!("Invalid request: {err}")))
}

fn parse_json(bytes: &[u8]) -> Result<Value, DuckgenError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes)
        .map_err(|err| DuckgenError::Validation(format!("Invalid JSON body: {err}")))
}

/// Builds the router; stored objects are served from `objects_dir`.
pub fn create_router(objects_dir: &Path) -> Router<AppState> {
    let objects = Router::new()
        .fallback_service(ServeDir::new(objects_dir))
        .layer(axum::middleware::from_fn(middleware::object_cache_headers));

    Router::new()
        .route("/ducks", post(ducks::duck_handler))
        .route("/memes", post(memes::meme_handler))
        .nest("/objects", objects)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
}

/// Binds the listener and serves until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    objects_dir: &Path,
    state: AppState,
) -> Result<(), anyhow::Error> {
    let app = create_router(objects_dir).with_state(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
