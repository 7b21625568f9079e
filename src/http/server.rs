//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Open the document stores and the security settings
//! - Build the Axum router: catalog, admin, media, static files
//! - Wire up middleware (write gate, body limit, headers, timeout, request ID, tracing)
//! - Serve with the peer address available to the gates

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Request},
    middleware, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::catalog::{self, Catalog};
use crate::config::StorefrontConfig;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::media::{self, MediaClient, MediaError};
use crate::security::{AdminGate, Credentials, LockoutPolicy, SecuritySettings, SettingsStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StorefrontConfig>,
    pub gate: Arc<AdminGate>,
    pub catalog: Arc<Catalog>,
    pub media: Option<Arc<MediaClient>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("preparing data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Media(#[from] MediaError),
}

pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: StorefrontConfig) -> Result<Self, ServerError> {
        let catalog = Arc::new(Catalog::open(&config.storage)?);

        let admin = &config.admin;
        let settings = Arc::new(SettingsStore::load(
            config.storage.data_dir.join(&admin.security_config_file),
            SecuritySettings::new(admin.default_whitelist.clone(), admin.default_ip_bypass),
        ));
        let gate = Arc::new(AdminGate::new(
            Credentials::new(admin.username.as_str(), admin.password.as_str()),
            LockoutPolicy::from(admin),
            settings,
        ));

        let media = if config.media.enabled {
            let client = MediaClient::new(&config.media)?;
            tracing::info!(base_url = %config.media.base_url, "Media host configured");
            Some(Arc::new(client))
        } else {
            None
        };

        let state = AppState {
            config: Arc::new(config),
            gate,
            catalog,
            media,
        };
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        let mut router = Router::new()
            .merge(catalog::routes())
            .merge(admin::routes(state.clone()))
            .merge(media::routes())
            .fallback_service(ServeDir::new(&config.storage.static_dir))
            .layer(middleware::from_fn_with_state(state.clone(), admin::auth::write_gate))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size));

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.state.config
    }
}
