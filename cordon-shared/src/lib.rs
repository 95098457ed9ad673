//! # Cordon Shared Library
//!
//! This crate contains the tenant isolation primitives, shared models, and
//! database utilities used across the Cordon API server.
//!
//! ## Module Organization
//!
//! - `context`: Execution-scoped tenant context (the per-request scope)
//! - `access`: Scoped data access contract and the `TenantScoped` trait
//! - `auth`: JWT validation and the scoping/bypass middleware
//! - `models`: Database models, tenant-filtered where tenant-owned
//! - `db`: Connection pooling and schema migrations

pub mod access;
pub mod auth;
pub mod context;
pub mod db;
pub mod models;

/// Current version of the Cordon shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
