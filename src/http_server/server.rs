use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::audit::AuditRecorder;
use crate::auth::{JwtAuth, PolicyTable, RouteId};
use crate::config::Config;
use crate::http_server::middleware::{
    auth_middleware, authorize_middleware, create_rate_limit_layer, permissive_cors,
    security_headers_middleware, size_limit_middleware, SecurityHeadersConfig, SizeLimitConfig,
};
use crate::http_server::routes;
use crate::store::Store;
use crate::uploads::ReceiptStore;
use crate::utils::ShutdownCoordinator;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub auth: Arc<JwtAuth>,
    pub audit: AuditRecorder,
    pub receipts: ReceiptStore,
    pub policy: PolicyTable,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let auth = Arc::new(
            JwtAuth::new(config.auth.jwt_secret.clone())
                .with_issuer(config.auth.issuer.clone())
                .with_default_expiry(config.auth.token_expiry_hours),
        );
        let audit = AuditRecorder::new(store.clone()).with_enabled(config.features.audit_logging);
        let receipts = ReceiptStore::new(&config.uploads.dir, config.uploads.max_file_size_mb);

        Self {
            config,
            store,
            auth,
            audit,
            receipts,
            policy: PolicyTable,
        }
    }
}

pub struct HttpServer {
    config: Config,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: Config, store: Store) -> Self {
        let state = Arc::new(AppState::new(config.clone(), store));
        Self { config, state }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        self.state.receipts.init().await?;

        let app = create_router(self.state.clone());

        let addr = SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        ));

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let shutdown = ShutdownCoordinator::new();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.wait_for_shutdown_signal().await })
        .await?;

        Ok(())
    }
}

/// Assemble the full application router.
///
/// Every protected route carries two gates, outermost first: the bearer
/// auth middleware (401 before any role evaluation), then its own policy
/// check from the declarative table (403 on a role miss, handler never
/// runs).
pub fn create_router(state: Arc<AppState>) -> Router {
    let policy = state.policy;

    let mut credential_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));
    if state.config.features.rate_limiting {
        credential_routes =
            credential_routes.layer(create_rate_limit_layer(&state.config.rate_limit));
    }

    let protected = Router::new()
        .route(
            "/expenses",
            get(routes::expenses::list).layer(middleware::from_fn_with_state(
                (policy, RouteId::ListExpenses),
                authorize_middleware,
            )),
        )
        .route(
            "/expenses",
            post(routes::expenses::create).layer(middleware::from_fn_with_state(
                (policy, RouteId::CreateExpense),
                authorize_middleware,
            )),
        )
        .route(
            "/expenses/{id}/status",
            patch(routes::expenses::update_status).layer(middleware::from_fn_with_state(
                (policy, RouteId::UpdateExpenseStatus),
                authorize_middleware,
            )),
        )
        .route(
            "/budgets",
            get(routes::budgets::list).layer(middleware::from_fn_with_state(
                (policy, RouteId::ListBudgets),
                authorize_middleware,
            )),
        )
        .route(
            "/budgets",
            post(routes::budgets::create).layer(middleware::from_fn_with_state(
                (policy, RouteId::CreateBudget),
                authorize_middleware,
            )),
        )
        .route(
            "/budgets/{id}",
            put(routes::budgets::update).layer(middleware::from_fn_with_state(
                (policy, RouteId::UpdateBudget),
                authorize_middleware,
            )),
        )
        .route(
            "/cards",
            get(routes::cards::list).layer(middleware::from_fn_with_state(
                (policy, RouteId::ListCards),
                authorize_middleware,
            )),
        )
        .route(
            "/cards",
            post(routes::cards::create).layer(middleware::from_fn_with_state(
                (policy, RouteId::CreateCard),
                authorize_middleware,
            )),
        )
        .route(
            "/cards/{id}/toggle",
            patch(routes::cards::toggle).layer(middleware::from_fn_with_state(
                (policy, RouteId::ToggleCardStatus),
                authorize_middleware,
            )),
        )
        .route(
            "/audit",
            get(routes::audit::list).layer(middleware::from_fn_with_state(
                (policy, RouteId::ListAuditLog),
                authorize_middleware,
            )),
        )
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let size_config = SizeLimitConfig::for_upload_limit(state.config.uploads.max_file_size_mb);

    let mut app = Router::new()
        .route("/api/health", get(routes::health))
        .nest("/api/auth", credential_routes)
        .nest("/api", protected)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(DefaultBodyLimit::max(size_config.max_request_size))
        .layer(middleware::from_fn_with_state(
            size_config,
            size_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(permissive_cors());

    if state.config.features.security_headers {
        app = app.layer(middleware::from_fn_with_state(
            SecurityHeadersConfig::default(),
            security_headers_middleware,
        ));
    }

    app.with_state(state)
}
