/// Integration tests for the Cordon API
///
/// These tests verify the full system works end-to-end:
/// - Authentication and scope installation at the middleware boundary
/// - Tenant isolation across the project endpoints
/// - Admin bypass behind super admin authorization
/// - Suspended and unknown tenant rejection
/// - Opaque error responses that leak nothing about other tenants
///
/// Tests that need a running PostgreSQL are marked ignored; the rest run
/// against an app wired to an unreachable database and exercise everything
/// that fires before a query.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use cordon_shared::models::tenant::{Tenant, TenantStatus};
use serde_json::json;
use tower::Service as _;

/// Creates a project through the API and returns the response JSON
async fn create_project_via_api(
    ctx: &TestContext,
    token: &str,
    name: &str,
) -> serde_json::Value {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/projects")
        .header("authorization", common::bearer(token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    // Print the response body if not OK, the status alone rarely says enough
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if status != StatusCode::OK {
        panic!(
            "Expected 200 OK, got {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );
    }

    serde_json::from_slice(&body).unwrap()
}

/// Test that health reports a degraded status when the database is down
#[tokio::test]
async fn test_health_degrades_without_database() {
    let ctx = TestContext::without_database();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(response_json["status"], "degraded");
    assert_eq!(response_json["database"], "disconnected");
}

/// Test that scoped routes reject requests without credentials
#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::without_database();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Missing credentials");
}

/// Test that a non-Bearer Authorization header is rejected as malformed
#[tokio::test]
async fn test_malformed_header_is_bad_request() {
    let ctx = TestContext::without_database();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test that garbage tokens are rejected
#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let ctx = TestContext::without_database();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test that expired tokens are rejected before any database access
#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let ctx = TestContext::without_database();
    let token = ctx.expired_token_for(42);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Token expired");
}

/// Test that tokens minted by another issuer are rejected
#[tokio::test]
async fn test_foreign_issuer_is_unauthorized() {
    let ctx = TestContext::without_database();
    let token = ctx.foreign_issuer_token_for(42);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Invalid issuer");
}

/// Test that a token with a non-positive tenant claim never binds a scope
#[tokio::test]
async fn test_nonpositive_tenant_claim_is_unauthorized() {
    let ctx = TestContext::without_database();

    for bad_tenant in [0, -5] {
        let token = ctx.token_for(bad_tenant);

        let request = Request::builder()
            .method("GET")
            .uri("/v1/projects")
            .header("authorization", common::bearer(&token))
            .body(Body::empty())
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

/// Test that a database failure during scoping surfaces as an opaque 500
#[tokio::test]
async fn test_database_failure_is_opaque() {
    let ctx = TestContext::without_database();
    let token = ctx.token_for(42);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The body must not say whether tenant 42 exists, only that the
    // server failed.
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Internal server error");
}

/// Test that one tenant's projects are invisible to another tenant
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_tenants_cannot_see_each_others_projects() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant_a = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let tenant_b = common::seed_tenant(&ctx.db, "globex").await.unwrap();

    let token_a = ctx.token_for(tenant_a.id);
    let token_b = ctx.token_for(tenant_b.id);

    // Tenant A creates a project
    let project = create_project_via_api(&ctx, &token_a, "a-private-plan").await;
    let project_id = project["id"].as_i64().unwrap();
    assert_eq!(project["tenant_id"].as_i64().unwrap(), tenant_a.id);

    // Tenant A can fetch it back
    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/projects/{}", project_id))
        .header("authorization", common::bearer(&token_a))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Tenant B gets a 404 for the same id, indistinguishable from a
    // project that doesn't exist
    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/projects/{}", project_id))
        .header("authorization", common::bearer(&token_b))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Tenant B's listing is empty
    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token_b))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response_json["total"], 0);
    assert_eq!(response_json["projects"].as_array().unwrap().len(), 0);

    common::cleanup_tenant(&ctx.db, tenant_a.id).await.unwrap();
    common::cleanup_tenant(&ctx.db, tenant_b.id).await.unwrap();
}

/// Test that the admin listing crosses tenant boundaries
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_admin_listing_crosses_tenants() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant_a = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let tenant_b = common::seed_tenant(&ctx.db, "globex").await.unwrap();

    let project_a = create_project_via_api(&ctx, &ctx.token_for(tenant_a.id), "a-side").await;
    let project_b = create_project_via_api(&ctx, &ctx.token_for(tenant_b.id), "b-side").await;

    let admin_token = ctx.admin_token_for(tenant_a.id);
    let request = Request::builder()
        .method("GET")
        .uri("/v1/admin/projects")
        .header("authorization", common::bearer(&admin_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let ids: Vec<i64> = response_json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();

    assert!(ids.contains(&project_a["id"].as_i64().unwrap()));
    assert!(ids.contains(&project_b["id"].as_i64().unwrap()));

    common::cleanup_tenant(&ctx.db, tenant_a.id).await.unwrap();
    common::cleanup_tenant(&ctx.db, tenant_b.id).await.unwrap();
}

/// Test that admin routes refuse tokens without the super admin flag
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_admin_routes_need_super_admin() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let token = ctx.token_for(tenant.id);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/admin/tenants")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8_lossy(&body),
        "Cross-tenant access requires a super admin token"
    );

    common::cleanup_tenant(&ctx.db, tenant.id).await.unwrap();
}

/// Test that a suspended tenant's tokens stop working everywhere
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_suspended_tenant_is_rejected() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let token = ctx.token_for(tenant.id);

    Tenant::update_status(&ctx.db, tenant.id, TenantStatus::Suspended)
        .await
        .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Tenant is not active");

    common::cleanup_tenant(&ctx.db, tenant.id).await.unwrap();
}

/// Test that tokens for a tenant that doesn't exist are rejected
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_unknown_tenant_is_rejected() {
    let ctx = TestContext::with_database().await.unwrap();
    let token = ctx.token_for(i64::MAX);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&body), "Tenant is not available");
}

/// Test that /v1/tenant returns the caller's own tenant
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_current_tenant_returns_caller() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let token = ctx.token_for(tenant.id);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tenant")
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(response_json["id"].as_i64().unwrap(), tenant.id);
    assert_eq!(response_json["slug"], tenant.slug);
    assert_eq!(response_json["status"], "active");

    common::cleanup_tenant(&ctx.db, tenant.id).await.unwrap();
}

/// Test suspending and reactivating a tenant through the admin API
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_admin_status_roundtrip() {
    let ctx = TestContext::with_database().await.unwrap();
    let admin_home = common::seed_tenant(&ctx.db, "platform").await.unwrap();
    let target = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let admin_token = ctx.admin_token_for(admin_home.id);

    // Suspend
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/v1/admin/tenants/{}/status", target.id))
        .header("authorization", common::bearer(&admin_token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "suspended" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response_json["status"], "suspended");

    // Reactivate
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/v1/admin/tenants/{}/status", target.id))
        .header("authorization", common::bearer(&admin_token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "active" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tenant = Tenant::find_by_id(&ctx.db, target.id).await.unwrap().unwrap();
    assert_eq!(tenant.status, TenantStatus::Active);

    common::cleanup_tenant(&ctx.db, admin_home.id).await.unwrap();
    common::cleanup_tenant(&ctx.db, target.id).await.unwrap();
}

/// Test that validation failures report the offending fields
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_validation_errors_are_reported() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let token = ctx.token_for(tenant.id);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/projects")
        .header("authorization", common::bearer(&token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(response_json["error"], "validation_error");
    assert_eq!(response_json["details"][0]["field"], "name");

    common::cleanup_tenant(&ctx.db, tenant.id).await.unwrap();
}

/// Test the update and delete flow within a single tenant
#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_project_update_and_delete_flow() {
    let ctx = TestContext::with_database().await.unwrap();
    let tenant = common::seed_tenant(&ctx.db, "acme").await.unwrap();
    let token = ctx.token_for(tenant.id);

    let project = create_project_via_api(&ctx, &token, "draft").await;
    let project_id = project["id"].as_i64().unwrap();

    // Rename it
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/v1/projects/{}", project_id))
        .header("authorization", common::bearer(&token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "launched" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let response_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response_json["name"], "launched");

    // Delete it
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/projects/{}", project_id))
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second delete finds nothing
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/projects/{}", project_id))
        .header("authorization", common::bearer(&token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    common::cleanup_tenant(&ctx.db, tenant.id).await.unwrap();
}
