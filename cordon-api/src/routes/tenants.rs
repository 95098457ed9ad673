/// Tenant self-service endpoint
///
/// Exposes the caller's own tenant. The tenant id comes from the request's
/// scope, never from the URL, so a caller cannot ask about anyone else.
///
/// # Endpoints
///
/// - `GET /v1/tenant` - The tenant this request runs as

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use cordon_shared::{context, models::tenant::Tenant};

/// Returns the tenant bound on the current request scope
///
/// # Endpoint
///
/// ```text
/// GET /v1/tenant
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `404 Not Found`: Tenant row disappeared after the boundary check
/// - `500 Internal Server Error`: No binding on the scope (server bug)
pub async fn current_tenant(State(state): State<AppState>) -> ApiResult<Json<Tenant>> {
    let tenant_id = context::tenant_id().ok_or_else(|| {
        ApiError::InternalError("No tenant bound on the request scope".to_string())
    })?;

    let tenant = Tenant::find_by_id(&state.db, tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    Ok(Json(tenant))
}
