/// Authentication and tenant-scoping middleware for Axum
///
/// This module provides the two middleware layers that install and widen the
/// tenant context around request handling:
///
/// - **Tenant scope middleware**: Validates the Bearer token, opens a fresh
///   tenant scope around the rest of the request, binds the token's tenant
///   into it, and rejects tenants that are unknown or not active.
/// - **Admin bypass middleware**: Runs inside the scope installed above and
///   enables cross-tenant bypass, but only for super admin callers. This is
///   the single place bypass authorization is enforced; the context itself
///   stays mechanism-only.
///
/// The scope is owned by the middleware future, so it is torn down with it
/// on every exit path: normal completion, error responses, panics, and
/// cancelled requests all leave the worker with no residual tenant state.
///
/// # Request Extensions
///
/// After successful authentication, middleware adds:
/// - `AuthContext`: Contains user_id, tenant_id, and the super admin flag
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use cordon_shared::auth::middleware::create_tenant_scope_middleware;
/// use sqlx::PgPool;
///
/// async fn setup(pool: PgPool) -> Router {
///     Router::new()
///         .route("/projects", get(|| async { "OK" }))
///         .layer(middleware::from_fn(create_tenant_scope_middleware(
///             pool,
///             "your-jwt-secret",
///         )))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};
use crate::context::{self, TenantId};
use crate::models::tenant::Tenant;

/// Authentication context added to request extensions
///
/// This struct is added to the request after successful authentication.
/// Handlers can extract it using Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use cordon_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, Tenant: {}", auth.user_id, auth.tenant_id)
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Tenant the request runs as
    pub tenant_id: TenantId,

    /// Whether the caller may cross tenant boundaries
    pub super_admin: bool,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
            super_admin: claims.super_admin,
        }
    }
}

/// Error type for authentication and scoping middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    MalformedHeader(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token references a tenant that doesn't exist
    TenantUnknown,

    /// Tenant exists but is suspended or retired
    TenantNotActive,

    /// Cross-tenant route called without a super admin token
    SuperAdminRequired,

    /// Tenant context operation failed
    ContextError(String),

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::MalformedHeader(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::TenantUnknown => {
                (StatusCode::FORBIDDEN, "Tenant is not available").into_response()
            }
            AuthError::TenantNotActive => {
                (StatusCode::FORBIDDEN, "Tenant is not active").into_response()
            }
            AuthError::SuperAdminRequired => (
                StatusCode::FORBIDDEN,
                "Cross-tenant access requires a super admin token",
            )
                .into_response(),
            AuthError::ContextError(msg) => {
                tracing::error!(error = %msg, "Tenant context failure in middleware");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AuthError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "Database failure in middleware");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Tenant scoping middleware
///
/// Validates the JWT from the `Authorization: Bearer <token>` header, then
/// runs the rest of the request inside a fresh tenant scope with the token's
/// tenant bound. Downstream handlers and models see the binding through the
/// ambient context accessors; nothing is passed explicitly.
///
/// The tenant is also looked up and gated here: unknown tenants and tenants
/// that are suspended or retired never reach a handler.
///
/// # Arguments
///
/// * `pool` - Database connection pool for the tenant lookup
/// * `secret` - JWT secret for validation
/// * `req` - Request
/// * `next` - Next middleware/handler
///
/// # Errors
///
/// - 401 Unauthorized for missing credentials or invalid/expired tokens
/// - 400 Bad Request for a malformed Authorization header
/// - 403 Forbidden for unknown or non-active tenants
/// - 500 Internal Server Error for database failures
pub async fn tenant_scope_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::MalformedHeader("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    // Add auth context to request extensions
    let auth_context = AuthContext::from_claims(&claims);
    req.extensions_mut().insert(auth_context);

    // Everything downstream runs inside this scope. The scope lives and
    // dies with the future, so teardown cannot be skipped by any exit
    // path, early returns and panics included.
    context::scope(async move {
        context::set_tenant_id(claims.tenant_id)
            .map_err(|e| AuthError::InvalidToken(format!("Invalid tenant claim: {}", e)))?;

        let tenant = Tenant::find_by_id(&pool, claims.tenant_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Tenant lookup failed: {}", e)))?
            .ok_or(AuthError::TenantUnknown)?;

        if !tenant.is_active() {
            tracing::warn!(
                tenant_id = tenant.id,
                status = ?tenant.status,
                "Rejecting request for non-active tenant"
            );
            return Err(AuthError::TenantNotActive);
        }

        tracing::debug!(context = %context::debug_snapshot(), "Tenant scope installed");

        Ok(next.run(req).await)
    })
    .await
}

/// Admin bypass middleware
///
/// Enables cross-tenant bypass on the current scope for super admin callers.
/// Must be layered inside the tenant scoping middleware: it reads the
/// `AuthContext` extension that middleware inserted and flips the bypass
/// flag on the scope it opened.
///
/// Authorization happens here and only here. The context's bypass switch is
/// a plain mechanism; a route that never passes through this middleware can
/// never see other tenants' data.
///
/// # Errors
///
/// - 401 Unauthorized if no auth context is present (mislayered router)
/// - 403 Forbidden if the caller is not a super admin
/// - 500 Internal Server Error if no scope is active on the task
pub async fn admin_bypass_middleware(req: Request, next: Next) -> Result<Response, AuthError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthError::MissingCredentials)?;

    if !auth.super_admin {
        tracing::warn!(
            user_id = %auth.user_id,
            tenant_id = auth.tenant_id,
            "Denied cross-tenant access for non-admin caller"
        );
        return Err(AuthError::SuperAdminRequired);
    }

    context::enable_bypass()
        .map_err(|e| AuthError::ContextError(format!("Bypass requested outside a scope: {}", e)))?;

    tracing::info!(
        user_id = %auth.user_id,
        tenant_id = auth.tenant_id,
        "Cross-tenant bypass enabled for admin request"
    );

    Ok(next.run(req).await)
}

/// Creates a tenant scoping middleware closure
///
/// Helper function that captures the pool and JWT secret and returns a
/// middleware function suitable for `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use cordon_shared::auth::middleware::create_tenant_scope_middleware;
/// use sqlx::PgPool;
///
/// async fn setup(pool: PgPool) -> Router {
///     Router::new()
///         .route("/projects", get(|| async { "OK" }))
///         .layer(middleware::from_fn(create_tenant_scope_middleware(
///             pool, "secret",
///         )))
/// }
/// ```
pub fn create_tenant_scope_middleware(
    pool: PgPool,
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(tenant_scope_middleware(pool, secret, req, next))
    }
}
