/// Project model and tenant-scoped database operations
///
/// Projects are the reference tenant-owned entity: every row carries a
/// `tenant_id`, and every query goes through `AccessScope::current()` before
/// touching the database. A bound scope injects a tenant filter into the SQL,
/// an authorized bypass omits it, and an unbound scope refuses the operation
/// outright. New tenant-owned models should follow the same shape.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     tenant_id BIGINT NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use cordon_shared::context;
/// use cordon_shared::models::project::{CreateProject, Project};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// context::scope(async {
///     context::set_tenant_id(42)?;
///
///     // Stamped with tenant 42; visible only to tenant 42
///     let project = Project::create(
///         &pool,
///         CreateProject {
///             name: "Onboarding".to_string(),
///             description: None,
///         },
///     )
///     .await?;
///
///     assert_eq!(project.tenant_id, 42);
///     Ok::<(), Box<dyn std::error::Error>>(())
/// })
/// .await
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::access::{AccessScope, StorageError, TenantScoped};
use crate::context::{self, TenantId};

/// Project model, a tenant-owned entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project id
    pub id: i64,

    /// Owning tenant; stamped at creation and never changed
    pub tenant_id: TenantId,

    /// Project name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Project {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}

/// Input for creating a new project
///
/// The owning tenant is deliberately absent: it is taken from the current
/// tenant context, never from caller-supplied data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Input for updating a project; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

impl Project {
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static str = "id, tenant_id, name, description, created_at, updated_at";

    /// Creates a new project owned by the current tenant
    ///
    /// The scope is resolved first like every other operation, but creation
    /// additionally requires a bound tenant: bypass widens what a caller may
    /// read, it does not supply an owner for new rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingTenantContext` if no tenant is bound on
    /// the current scope.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, StorageError> {
        AccessScope::current()?;
        let owner = context::tenant_id().ok_or(StorageError::MissingTenantContext)?;

        let query = format!(
            "INSERT INTO {} (tenant_id, name, description) VALUES ($1, $2, $3) RETURNING {}",
            Self::TABLE,
            Self::COLUMNS,
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(owner)
            .bind(data.name)
            .bind(data.description)
            .fetch_one(pool)
            .await?;

        Ok(project)
    }

    /// Finds a project by id within the current scope
    ///
    /// Under a bound scope, a project owned by another tenant is
    /// indistinguishable from one that doesn't exist: both return `None`.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, StorageError> {
        let scope = AccessScope::current()?;

        let mut query = format!(
            "SELECT {} FROM {} WHERE id = $1",
            Self::COLUMNS,
            Self::TABLE,
        );
        if scope.tenant_filter().is_some() {
            query.push_str(" AND tenant_id = $2");
        }

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);
        if let Some(tenant_id) = scope.tenant_filter() {
            q = q.bind(tenant_id);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Lists projects within the current scope with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, StorageError> {
        let scope = AccessScope::current()?;

        let projects = match scope.tenant_filter() {
            Some(tenant_id) => {
                let query = format!(
                    "SELECT {} FROM {} WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                    Self::COLUMNS,
                    Self::TABLE,
                );
                sqlx::query_as::<_, Project>(&query)
                    .bind(tenant_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {} FROM {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                    Self::COLUMNS,
                    Self::TABLE,
                );
                sqlx::query_as::<_, Project>(&query)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
        };

        Ok(projects)
    }

    /// Counts projects within the current scope
    pub async fn count(pool: &PgPool) -> Result<i64, StorageError> {
        let scope = AccessScope::current()?;

        let (count,): (i64,) = match scope.tenant_filter() {
            Some(tenant_id) => {
                let query = format!("SELECT COUNT(*) FROM {} WHERE tenant_id = $1", Self::TABLE);
                sqlx::query_as(&query).bind(tenant_id).fetch_one(pool).await?
            }
            None => {
                let query = format!("SELECT COUNT(*) FROM {}", Self::TABLE);
                sqlx::query_as(&query).fetch_one(pool).await?
            }
        };

        Ok(count)
    }

    /// Updates a project within the current scope
    ///
    /// Builds the SET clause dynamically from the fields that are present,
    /// then appends the tenant filter the same way the reads do. Returns the
    /// updated project, or `None` if no row matched the id within the scope.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, StorageError> {
        let scope = AccessScope::current()?;

        let mut query = format!("UPDATE {} SET updated_at = NOW()", Self::TABLE);
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${bind_count}"));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }

        query.push_str(" WHERE id = $1");
        if scope.tenant_filter().is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND tenant_id = ${bind_count}"));
        }
        query.push_str(&format!(" RETURNING {}", Self::COLUMNS));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(tenant_id) = scope.tenant_filter() {
            q = q.bind(tenant_id);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project within the current scope
    ///
    /// Returns `true` if a row was deleted, `false` if no row matched the id
    /// within the scope.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, StorageError> {
        let scope = AccessScope::current()?;

        let mut query = format!("DELETE FROM {} WHERE id = $1", Self::TABLE);
        if scope.tenant_filter().is_some() {
            query.push_str(" AND tenant_id = $2");
        }

        let mut q = sqlx::query(&query).bind(id);
        if let Some(tenant_id) = scope.tenant_filter() {
            q = q.bind(tenant_id);
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
