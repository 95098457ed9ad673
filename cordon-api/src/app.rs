/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use cordon_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = cordon_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use cordon_shared::auth::middleware::{admin_bypass_middleware, create_tenant_scope_middleware};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/                          # Tenant-scoped API (JWT required)
///     ├── GET    /tenant            # The caller's own tenant
///     ├── GET    /projects          # List projects (scoped)
///     ├── POST   /projects          # Create project (scoped)
///     ├── GET    /projects/:id      # Fetch project (scoped)
///     ├── PUT    /projects/:id      # Update project (scoped)
///     ├── DELETE /projects/:id      # Delete project (scoped)
///     └── /admin/                   # Cross-tenant (super admin only)
///         ├── GET /tenants          # List all tenants
///         ├── GET /tenants/:id      # Fetch any tenant
///         ├── PUT /tenants/:id/status  # Suspend/reactivate/retire
///         └── GET /projects         # List every tenant's projects
/// ```
///
/// # Middleware Stack
///
/// Every `/v1` route runs inside the tenant scope middleware, which
/// validates the JWT and installs a fresh scope bound to the token's
/// tenant. The `/v1/admin` subtree additionally passes through the bypass
/// middleware, which widens the already-installed scope for super admins.
/// Axum applies layers inside-out, so the scope layer added on the outer
/// router runs before the bypass layer nested under `/admin`.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Cross-tenant admin routes; bypass authorization happens in the layer
    let admin_routes = Router::new()
        .route("/tenants", get(routes::admin::list_tenants))
        .route("/tenants/:id", get(routes::admin::get_tenant))
        .route("/tenants/:id/status", put(routes::admin::update_tenant_status))
        .route("/projects", get(routes::admin::list_all_projects))
        .layer(axum::middleware::from_fn(admin_bypass_middleware));

    // Tenant-scoped API: one scope layer over the whole subtree
    let v1_routes = Router::new()
        .route("/tenant", get(routes::tenants::current_tenant))
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects/:id", get(routes::projects::get_project))
        .route("/projects/:id", put(routes::projects::update_project))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn(create_tenant_scope_middleware(
            state.db.clone(),
            state.jwt_secret().to_string(),
        )));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with the middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
