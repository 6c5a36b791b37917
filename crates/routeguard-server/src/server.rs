use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, put},
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use routeguard_authz::{
    AuthzEngine, AuthzState, MemoryCacheStore, RuleSet, TraceId, UserPermissionCache,
};

use crate::{
    config::AppConfig, handlers, middleware as app_middleware, store::StaticPermissionStore,
};

pub struct RouteguardServer {
    addr: SocketAddr,
    app: Router,
}

/// Build the authorization engine from configuration: compiled rule set,
/// static permission store, and the TTL permission cache in front of it.
#[must_use]
pub fn build_engine(cfg: &AppConfig) -> Arc<AuthzEngine> {
    let rules = Arc::new(RuleSet::from_config(&cfg.authz));
    let store = Arc::new(StaticPermissionStore::new(cfg.users.clone()));
    let cache = UserPermissionCache::new(
        store,
        Arc::new(MemoryCacheStore::new()),
        cfg.authz.cache.ttl,
    );
    Arc::new(AuthzEngine::new(rules, Arc::new(cache)))
}

pub fn build_app(cfg: &AppConfig, engine: Arc<AuthzEngine>) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Demo API protected by the configured rules
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{id}", put(handlers::update_product))
        .route("/api/reports/{id}", get(handlers::read_report))
        // Middleware stack (order: request id -> trace -> identity -> authorize)
        .layer(middleware::from_fn_with_state(
            AuthzState::new(engine),
            routeguard_authz::middleware::authorize,
        ))
        .layer(middleware::from_fn(app_middleware::debug_identity))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            // request_id runs outside this layer, so the extension is
            // populated by the time the span is created.
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .extensions()
                    .get::<TraceId>()
                    .map(|TraceId(id)| id.as_str())
                    .unwrap_or("");
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                    request_id = %request_id
                )
            }),
        )
        .layer(TimeoutLayer::new(cfg.server.request_timeout))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(app_middleware::request_id))
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
    #[must_use]
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    #[must_use]
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    #[must_use]
    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    #[must_use]
    pub fn build(self) -> RouteguardServer {
        let engine = build_engine(&self.config);
        let app = build_app(&self.config, engine);

        RouteguardServer {
            addr: self.addr,
            app,
        }
    }
}

impl RouteguardServer {
    /// Bind and serve until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the listener or serving fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
