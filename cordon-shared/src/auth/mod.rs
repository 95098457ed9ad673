/// Authentication and tenant-scoping utilities
///
/// This module provides the request-boundary half of Cordon's isolation
/// model:
///
/// # Modules
///
/// - [`jwt`]: JWT token generation and validation (HS256)
/// - [`middleware`]: Axum middleware that installs the tenant scope around
///   each request and gates cross-tenant bypass behind super admin tokens
///
/// # Example
///
/// ```no_run
/// use cordon_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), 42);
/// let token = create_token(&claims, "secret-key")?;
///
/// let validated = validate_token(&token, "secret-key")?;
/// assert_eq!(validated.tenant_id, 42);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
