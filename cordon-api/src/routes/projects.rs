/// Project endpoints
///
/// Tenant-scoped CRUD for projects. None of these handlers mention a tenant
/// id: the scope installed by the middleware flows through the ambient
/// context into the model layer, which injects the filter. A project owned
/// by another tenant is indistinguishable from one that doesn't exist.
///
/// # Endpoints
///
/// - `GET    /v1/projects` - List the caller's projects
/// - `POST   /v1/projects` - Create a project owned by the caller's tenant
/// - `GET    /v1/projects/:id` - Fetch one project
/// - `PUT    /v1/projects/:id` - Update one project
/// - `DELETE /v1/projects/:id` - Delete one project

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use cordon_shared::models::project::{CreateProject, Project, UpdateProject};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pagination parameters shared by the list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    /// Page size, clamped to 1..=200 (default 50)
    pub limit: Option<i64>,

    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Resolves the raw parameters to safe limit/offset values
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Update project request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// List projects response
#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    /// Projects visible to the current scope
    pub projects: Vec<Project>,

    /// Count of projects visible to the current scope
    pub total: i64,
}

/// Delete project response
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    /// Whether a project was deleted
    pub deleted: bool,
}

/// Maps validator errors to the API's validation error shape
fn validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// List projects
///
/// # Endpoint
///
/// ```text
/// GET /v1/projects?limit=50&offset=0
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `500 Internal Server Error`: Scope or database failure
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListProjectsResponse>> {
    let (limit, offset) = query.resolve();

    let projects = Project::list(&state.db, limit, offset).await?;
    let total = Project::count(&state.db).await?;

    Ok(Json(ListProjectsResponse { projects, total }))
}

/// Create project
///
/// The owning tenant is taken from the request scope; the body carries only
/// the project's own fields.
///
/// # Endpoint
///
/// ```text
/// POST /v1/projects
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// {
///   "name": "Rollout",
///   "description": "Q1 rollout"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Scope or database failure
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_errors)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(project))
}

/// Fetch one project
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `404 Not Found`: No such project within the caller's scope
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Update one project
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `404 Not Found`: No such project within the caller's scope
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_errors)?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Delete one project
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `404 Not Found`: No such project within the caller's scope
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    let deleted = Project::delete(&state.db, id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    Ok(Json(DeleteProjectResponse { deleted }))
}
