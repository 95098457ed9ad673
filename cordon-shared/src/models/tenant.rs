/// Tenant model and database operations
///
/// This module provides the Tenant model, the root of the ownership graph.
/// Every tenant-owned row in the system references a tenant by id. The
/// tenants table itself is platform-level: its operations are not filtered
/// by the tenant context, and callers that expose them across tenants are
/// expected to run under an authorized bypass.
///
/// Tenants are never physically deleted. Retirement is a status change to
/// `Inactive`, which keeps historical ownership intact.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tenants (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(63) NOT NULL UNIQUE,
///     status SMALLINT NOT NULL DEFAULT 1,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tenants_slug_check CHECK (slug ~ '^[a-z0-9]+(-[a-z0-9]+)*$'),
///     CONSTRAINT tenants_status_check CHECK (status IN (1, 2, 3))
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use cordon_shared::models::tenant::{CreateTenant, Tenant, TenantStatus};
/// use cordon_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let tenant = Tenant::create(
///     &pool,
///     CreateTenant {
///         name: "Acme Corp".to_string(),
///         slug: "acme-corp".to_string(),
///     },
/// )
/// .await?;
///
/// assert!(tenant.is_active());
///
/// // Suspend the tenant; its requests are rejected at the boundary
/// Tenant::update_status(&pool, tenant.id, TenantStatus::Suspended).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::access::StorageError;
use crate::context::TenantId;

/// Tenant lifecycle status
///
/// Stored as its numeric value in a SMALLINT column: active = 1,
/// suspended = 2, inactive = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum TenantStatus {
    /// Tenant is in good standing and may run work
    Active = 1,

    /// Tenant is temporarily blocked, e.g. for non-payment
    Suspended = 2,

    /// Tenant is retired; kept for historical ownership, never served
    Inactive = 3,
}

impl TenantStatus {
    /// Converts the status to its stored numeric value
    pub fn as_i16(&self) -> i16 {
        *self as i16
    }

    /// Parses a status from its stored numeric value
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            1 => Some(TenantStatus::Active),
            2 => Some(TenantStatus::Suspended),
            3 => Some(TenantStatus::Inactive),
            _ => None,
        }
    }
}

/// Tenant model representing an organization/account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant id; stable and never reused
    pub id: TenantId,

    /// Display name, free-form
    pub name: String,

    /// URL-safe unique identifier: lowercase letters, digits, single hyphens
    pub slug: String,

    /// Current lifecycle status
    pub status: TenantStatus,

    /// When the tenant was created
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Checks whether the tenant is in good standing
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// Checks whether the tenant is temporarily blocked
    pub fn is_suspended(&self) -> bool {
        self.status == TenantStatus::Suspended
    }
}

/// Input for creating a new tenant
///
/// New tenants always start `Active`; there is no way to create one in a
/// suspended or retired state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Display name
    pub name: String,

    /// Unique slug, validated against the slug format before insertion
    pub slug: String,
}

/// Validates the slug format: non-empty, at most 63 characters, lowercase
/// letters, digits, and single interior hyphens.
fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 63 {
        return false;
    }

    let mut prev_hyphen = true; // a leading hyphen is invalid
    for c in slug.chars() {
        match c {
            'a'..='z' | '0'..='9' => prev_hyphen = false,
            '-' if !prev_hyphen => prev_hyphen = true,
            _ => return false,
        }
    }

    !prev_hyphen // a trailing hyphen is invalid
}

impl Tenant {
    /// Creates a new tenant in the database
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSlug` if the slug fails format
    /// validation, and a database error if the slug is already taken or the
    /// insert fails.
    pub async fn create(pool: &PgPool, data: CreateTenant) -> Result<Self, StorageError> {
        if !is_valid_slug(&data.slug) {
            return Err(StorageError::InvalidSlug(data.slug));
        }

        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, status, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.slug)
        .fetch_one(pool)
        .await?;

        Ok(tenant)
    }

    /// Finds a tenant by id
    ///
    /// Returns `None` if no tenant with that id exists.
    pub async fn find_by_id(pool: &PgPool, id: TenantId) -> Result<Option<Self>, StorageError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, status, created_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Finds a tenant by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, StorageError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, status, created_at
            FROM tenants
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Lists tenants with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, StorageError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, slug, status, created_at
            FROM tenants
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(tenants)
    }

    /// Counts all tenants
    pub async fn count(pool: &PgPool) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Updates a tenant's lifecycle status
    ///
    /// This is the only mutation the model exposes besides creation: names
    /// and slugs are immutable in practice, and retirement is a transition
    /// to `Inactive` rather than a delete.
    ///
    /// Returns the updated tenant, or `None` if the tenant doesn't exist.
    pub async fn update_status(
        pool: &PgPool,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<Option<Self>, StorageError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET status = $2
            WHERE id = $1
            RETURNING id, name, slug, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }
}
