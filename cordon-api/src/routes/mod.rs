/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tenants`: The caller's own tenant
/// - `projects`: Tenant-scoped project CRUD
/// - `admin`: Cross-tenant operations (super admin only)

pub mod admin;
pub mod health;
pub mod projects;
pub mod tenants;
