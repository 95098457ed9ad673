/// Admin endpoints
///
/// Platform operations that cross tenant boundaries. Every route here sits
/// behind the admin layer, which rejects non-super-admin tokens and enables
/// the bypass flag on the request scope, so the project listing below sees
/// all tenants' rows.
///
/// # Endpoints
///
/// - `GET /v1/admin/tenants` - List all tenants
/// - `GET /v1/admin/tenants/:id` - Fetch one tenant
/// - `PUT /v1/admin/tenants/:id/status` - Suspend, reactivate or retire a tenant
/// - `GET /v1/admin/projects` - List projects across all tenants

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::{ListProjectsResponse, ListQuery},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use cordon_shared::{
    auth::middleware::AuthContext,
    models::{
        project::Project,
        tenant::{Tenant, TenantStatus},
    },
};
use serde::{Deserialize, Serialize};

/// List tenants response
#[derive(Debug, Serialize)]
pub struct ListTenantsResponse {
    /// Tenants in creation order, newest first
    pub tenants: Vec<Tenant>,

    /// Total tenant count
    pub total: i64,
}

/// Update tenant status request
#[derive(Debug, Deserialize)]
pub struct UpdateTenantStatusRequest {
    /// The status to move the tenant to
    pub status: TenantStatus,
}

/// List all tenants
///
/// # Endpoint
///
/// ```text
/// GET /v1/admin/tenants?limit=50&offset=0
/// Authorization: Bearer <super_admin_jwt>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Token is not a super admin token
pub async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListTenantsResponse>> {
    let (limit, offset) = query.resolve();

    let tenants = Tenant::list(&state.db, limit, offset).await?;
    let total = Tenant::count(&state.db).await?;

    Ok(Json(ListTenantsResponse { tenants, total }))
}

/// Fetch one tenant
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Token is not a super admin token
/// - `404 Not Found`: No tenant with this id
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Tenant>> {
    let tenant = Tenant::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    Ok(Json(tenant))
}

/// Update a tenant's status
///
/// Suspension and retirement are status changes, so a tenant's data survives
/// either and reactivating is a single update back to active.
///
/// # Endpoint
///
/// ```text
/// PUT /v1/admin/tenants/42/status
/// Authorization: Bearer <super_admin_jwt>
/// Content-Type: application/json
///
/// {
///   "status": "suspended"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Token is not a super admin token
/// - `404 Not Found`: No tenant with this id
pub async fn update_tenant_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateTenantStatusRequest>,
) -> ApiResult<Json<Tenant>> {
    let tenant = Tenant::update_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    tracing::info!(
        admin = %auth.user_id,
        tenant_id = id,
        new_status = ?req.status,
        "Tenant status updated by admin"
    );

    Ok(Json(tenant))
}

/// List projects across all tenants
///
/// Runs under the bypass enabled by the admin layer, so the model's scope
/// resolution returns an unrestricted scope and no tenant filter is applied.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `403 Forbidden`: Token is not a super admin token
pub async fn list_all_projects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListProjectsResponse>> {
    let (limit, offset) = query.resolve();

    let projects = Project::list(&state.db, limit, offset).await?;
    let total = Project::count(&state.db).await?;

    Ok(Json(ListProjectsResponse { projects, total }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_accepts_every_status() {
        let suspend: UpdateTenantStatusRequest =
            serde_json::from_str(r#"{"status": "suspended"}"#).unwrap();
        assert_eq!(suspend.status, TenantStatus::Suspended);

        let reactivate: UpdateTenantStatusRequest =
            serde_json::from_str(r#"{"status": "active"}"#).unwrap();
        assert_eq!(reactivate.status, TenantStatus::Active);

        let retire: UpdateTenantStatusRequest =
            serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert_eq!(retire.status, TenantStatus::Inactive);
    }

    #[test]
    fn test_status_request_rejects_unknown_status() {
        let result: Result<UpdateTenantStatusRequest, _> =
            serde_json::from_str(r#"{"status": "deleted"}"#);
        assert!(result.is_err());
    }
}
