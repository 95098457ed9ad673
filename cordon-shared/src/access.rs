/// Scoped-access contract between the tenant context and storage
///
/// Every storage operation on tenant-owned data resolves an [`AccessScope`]
/// from the current context before touching the database. The resolution
/// order is fixed:
///
/// 1. bypass enabled → [`AccessScope::Unrestricted`], no filter applied;
/// 2. tenant bound → [`AccessScope::Tenant`], an equality filter on the
///    owning tenant id is injected into the operation;
/// 3. neither → [`StorageError::MissingTenantContext`], the operation is
///    refused before any data is read or written.
///
/// There is no fourth outcome: data access is never silently unscoped.
///
/// # Example
///
/// ```
/// use cordon_shared::access::AccessScope;
/// use cordon_shared::context;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// context::scope(async {
///     context::set_tenant_id(42)?;
///
///     let scope = AccessScope::current()?;
///     assert_eq!(scope.tenant_filter(), Some(42));
///     assert!(scope.allows(42));
///     assert!(!scope.allows(7));
///     Ok::<(), Box<dyn std::error::Error>>(())
/// })
/// .await
/// # }
/// ```

use crate::context::{self, TenantId};

/// Error type for the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Scoped data access was attempted with no tenant bound and no bypass
    #[error("No tenant is bound on the current scope and bypass is not enabled")]
    MissingTenantContext,

    /// A slug failed format validation
    #[error("Invalid slug '{0}': expected lowercase letters, digits, and single hyphens")]
    InvalidSlug(String),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Visibility granted to a single storage operation
///
/// Resolved from the current task's tenant context once per operation, at the
/// moment of access. Holding an `AccessScope` across operations would defeat
/// the per-access consultation the contract requires, so storage code calls
/// [`AccessScope::current`] at the top of every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Bypass is active: the operation sees all tenants' rows
    Unrestricted,

    /// The operation is confined to the rows owned by this tenant
    Tenant(TenantId),
}

impl AccessScope {
    /// Resolves the scope for the current task
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingTenantContext` when no tenant is bound
    /// and bypass is not enabled, which includes running outside any scope.
    pub fn current() -> Result<Self, StorageError> {
        if context::bypass_enabled() {
            return Ok(AccessScope::Unrestricted);
        }

        match context::tenant_id() {
            Some(id) => Ok(AccessScope::Tenant(id)),
            None => Err(StorageError::MissingTenantContext),
        }
    }

    /// Returns the tenant id to filter on, or `None` for unrestricted access
    pub fn tenant_filter(&self) -> Option<TenantId> {
        match self {
            AccessScope::Unrestricted => None,
            AccessScope::Tenant(id) => Some(*id),
        }
    }

    /// Checks whether a row owned by `tenant_id` is visible under this scope
    pub fn allows(&self, tenant_id: TenantId) -> bool {
        match self {
            AccessScope::Unrestricted => true,
            AccessScope::Tenant(id) => *id == tenant_id,
        }
    }
}

/// Capability carried by every tenant-owned entity
///
/// Storage code that operates on tenant-owned rows bounds its generics on
/// this trait, so an entity without an owning tenant cannot pass through the
/// scoped layer by construction. The owner is stamped exactly once, when the
/// entity is created from the bound context; `set_tenant_id` exists for that
/// stamping and for test fixtures, not for reassignment in business logic.
pub trait TenantScoped {
    /// Returns the owning tenant's id
    fn tenant_id(&self) -> TenantId;

    /// Stamps the owning tenant's id
    fn set_tenant_id(&mut self, tenant_id: TenantId);
}
