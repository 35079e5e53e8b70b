use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use keystile_auth::{
    AuthState, Clock, IdentityCache, MobileSubjectResolver, SystemClock, session_middleware,
    token_handler,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::{create_identity_cache, spawn_cleanup_task};
use crate::{config::AppConfig, handlers};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub cache: Arc<dyn IdentityCache>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Wires session authentication over `cache`.
    pub fn new(
        cfg: &AppConfig,
        cache: Arc<dyn IdentityCache>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let auth = AuthState::from_config(
            &cfg.auth,
            cache.clone(),
            clock,
            Arc::new(MobileSubjectResolver),
        )?;
        Ok(Self { auth, cache })
    }

    /// Creates the configured identity cache on the wall clock.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = create_identity_cache(cfg, clock.clone()).await;
        Self::new(cfg, cache, clock)
    }
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/token", post(token_handler))
        .route("/healthz", get(handlers::healthz))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    cfg.validate().map_err(anyhow::Error::msg)?;
    let state = AppState::from_config(cfg).await?;
    Ok(router(state, cfg.server.body_limit_bytes))
}

pub struct KeystileServer {
    addr: SocketAddr,
    app: Router,
    cleanup: tokio::task::JoinHandle<()>,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<KeystileServer> {
        self.config.validate().map_err(anyhow::Error::msg)?;
        let state = AppState::from_config(&self.config).await?;
        let cleanup = spawn_cleanup_task(state.cache.clone(), self.config.cache.cleanup_interval);
        let app = router(state, self.config.server.body_limit_bytes);

        Ok(KeystileServer {
            addr: self.addr,
            app,
            cleanup,
        })
    }
}

impl KeystileServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let result = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        self.cleanup.abort();
        result?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
