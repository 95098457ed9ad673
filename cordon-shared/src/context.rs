/// Execution-scoped tenant context
///
/// This module provides the per-request tenant identity container that the rest
/// of the system consults instead of threading a tenant id through every call.
/// A scope is installed once per unit of work (one HTTP request, one job run)
/// and torn down when that unit finishes, on every exit path.
///
/// # State Machine
///
/// ```text
/// empty → bound → bound + bypass
///   ↑       |            |
///   └───────┴── clear ───┘
/// ```
///
/// - **empty**: no tenant bound, bypass off. All scoped data access fails.
/// - **bound**: a tenant id is bound. Data access is filtered to that tenant.
/// - **bound + bypass**: the tenant filter is suspended for privileged
///   cross-tenant operations. Enabling bypass performs no authorization check
///   here; the caller that enables it is responsible for that.
///
/// # Scoping and Teardown
///
/// The context lives in a `tokio::task_local!` slot installed by [`scope`].
/// The slot is owned by the scoped future itself, so teardown is structural:
/// when the future completes, returns early, is cancelled, or panics, the
/// context is dropped with it. A later unit of work reusing the same worker
/// thread can never observe a stale binding, and spawned tasks never inherit
/// the caller's scope.
///
/// # Example
///
/// ```
/// use cordon_shared::context;
///
/// # async fn example() -> Result<(), context::TenantContextError> {
/// context::scope(async {
///     context::set_tenant_id(42)?;
///     assert_eq!(context::tenant_id(), Some(42));
///
///     // Privileged escalation, authorized by the caller
///     context::enable_bypass()?;
///     assert!(context::bypass_enabled());
///
///     context::clear();
///     assert!(!context::has_tenant_id());
///     Ok(())
/// })
/// .await
/// # }
/// ```

use std::cell::Cell;
use std::future::Future;

use tracing::warn;

/// Tenant identifier type used throughout the system
///
/// Identifiers are positive; zero and negative values are rejected at binding
/// time.
pub type TenantId = i64;

/// Error type for context operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TenantContextError {
    /// Attempted to bind a non-positive tenant id
    #[error("Invalid tenant id: {0} (must be positive)")]
    InvalidTenantId(TenantId),

    /// Attempted to write to the context outside any scope
    #[error("No tenant scope is active on this task")]
    NoActiveScope,
}

tokio::task_local! {
    static CURRENT: TenantContext;
}

/// The per-unit-of-work tenant identity container
///
/// One value exists per scope and is confined to the task that owns the scope:
/// the interior `Cell`s make the type `Send` but not `Sync`, so the compiler
/// itself rules out sharing a context between concurrent tasks.
///
/// Most callers use the module-level functions ([`set_tenant_id`],
/// [`tenant_id`], ...) which operate on the current task's scope. The handle
/// methods exist for code that holds a `TenantContext` directly, such as
/// tests exercising the state machine without a runtime.
#[derive(Debug)]
pub struct TenantContext {
    tenant_id: Cell<Option<TenantId>>,
    bypass: Cell<bool>,
}

impl TenantContext {
    /// Creates an empty context: no tenant bound, bypass disabled
    pub fn new() -> Self {
        Self {
            tenant_id: Cell::new(None),
            bypass: Cell::new(false),
        }
    }

    /// Binds the owning tenant for this context
    ///
    /// Re-binding without an intervening [`clear`](Self::clear) is permitted
    /// but logged as a caller error, since well-behaved units of work bind
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns `TenantContextError::InvalidTenantId` if `tenant_id` is zero or
    /// negative. The previous binding, if any, is left untouched.
    pub fn set_tenant_id(&self, tenant_id: TenantId) -> Result<(), TenantContextError> {
        if tenant_id <= 0 {
            return Err(TenantContextError::InvalidTenantId(tenant_id));
        }

        if let Some(current) = self.tenant_id.get() {
            if current != tenant_id {
                warn!(
                    current_tenant_id = current,
                    new_tenant_id = tenant_id,
                    "Rebinding tenant context without clearing it first"
                );
            }
        }

        self.tenant_id.set(Some(tenant_id));
        Ok(())
    }

    /// Returns the bound tenant id, or `None` if the context is empty
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id.get()
    }

    /// Checks whether a tenant is currently bound
    pub fn has_tenant_id(&self) -> bool {
        self.tenant_id.get().is_some()
    }

    /// Suspends tenant filtering for the remainder of the scope
    ///
    /// No authorization check happens here. The boundary that calls this is
    /// responsible for verifying the caller's privilege first.
    pub fn enable_bypass(&self) {
        self.bypass.set(true);
    }

    /// Checks whether the tenant filter is currently suspended
    pub fn bypass_enabled(&self) -> bool {
        self.bypass.get()
    }

    /// Resets the context to empty
    ///
    /// Unconditional and idempotent: clears both the binding and the bypass
    /// flag regardless of the current state, and is safe to call repeatedly.
    pub fn clear(&self) {
        self.tenant_id.set(None);
        self.bypass.set(false);
    }

    /// Renders the current state for diagnostics
    ///
    /// Formatting only; reading the snapshot never changes the context.
    pub fn debug_snapshot(&self) -> String {
        match self.tenant_id.get() {
            Some(id) => format!(
                "TenantContext[tenant_id={}, bypass={}]",
                id,
                self.bypass.get()
            ),
            None => format!("TenantContext[tenant_id=none, bypass={}]", self.bypass.get()),
        }
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `fut` inside a fresh, empty tenant scope
///
/// The scope is confined to `fut` and the code it awaits. It is dropped when
/// `fut` completes, errors, panics, or is cancelled, which is what guarantees
/// the unconditional-teardown contract. Nested calls shadow the outer scope
/// for the inner future; tasks spawned from within do not inherit it.
pub async fn scope<F>(fut: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(TenantContext::new(), fut).await
}

/// Binds the owning tenant on the current task's scope
///
/// # Errors
///
/// - `TenantContextError::InvalidTenantId` if `tenant_id` is zero or negative;
///   the previous binding is left untouched.
/// - `TenantContextError::NoActiveScope` if the task is not running inside
///   [`scope`]. Writes have nowhere to live without a scope, so failing loudly
///   beats silently dropping the binding.
pub fn set_tenant_id(tenant_id: TenantId) -> Result<(), TenantContextError> {
    CURRENT
        .try_with(|ctx| ctx.set_tenant_id(tenant_id))
        .map_err(|_| TenantContextError::NoActiveScope)?
}

/// Returns the tenant bound on the current task's scope
///
/// Returns `None` when no tenant is bound, and also when no scope is active
/// at all: reads degrade to "empty" rather than erroring, so callers decide
/// how to treat an absent identity.
pub fn tenant_id() -> Option<TenantId> {
    CURRENT.try_with(|ctx| ctx.tenant_id()).unwrap_or(None)
}

/// Checks whether the current task's scope has a tenant bound
pub fn has_tenant_id() -> bool {
    CURRENT.try_with(|ctx| ctx.has_tenant_id()).unwrap_or(false)
}

/// Suspends tenant filtering on the current task's scope
///
/// Performs no authorization check; see [`TenantContext::enable_bypass`].
///
/// # Errors
///
/// Returns `TenantContextError::NoActiveScope` outside any scope.
pub fn enable_bypass() -> Result<(), TenantContextError> {
    CURRENT
        .try_with(|ctx| ctx.enable_bypass())
        .map_err(|_| TenantContextError::NoActiveScope)
}

/// Checks whether the tenant filter is suspended on the current task's scope
pub fn bypass_enabled() -> bool {
    CURRENT.try_with(|ctx| ctx.bypass_enabled()).unwrap_or(false)
}

/// Resets the current task's scope to empty
///
/// Idempotent, and a no-op outside any scope.
pub fn clear() {
    let _ = CURRENT.try_with(|ctx| ctx.clear());
}

/// Renders the current task's context state for diagnostics
pub fn debug_snapshot() -> String {
    CURRENT
        .try_with(|ctx| ctx.debug_snapshot())
        .unwrap_or_else(|_| "TenantContext[unscoped]".to_string())
}
