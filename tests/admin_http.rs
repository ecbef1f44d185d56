//! End-to-end router tests for admin user management and the
//! super-admin protection rules.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use launchkit::domain::account::Role;

use common::{spawn, TestApp, PASSWORD};

/// Seeds a super-admin, an admin, and a regular user; returns their tokens.
async fn seeded() -> (TestApp, String, String, String) {
    let app = spawn();
    let root = app.signup("root@x.com").await;
    let admin = app.signup("admin@x.com").await;
    let user = app.signup("user@x.com").await;
    app.set_role("root@x.com", Role::SuperAdmin).await;
    app.set_role("admin@x.com", Role::Admin).await;
    (app, root, admin, user)
}

// ══════════════════════════════════════════════════════════════
// Listing
// ══════════════════════════════════════════════════════════════

#[tokio::test]
async fn listing_requires_an_admin_role() {
    let (app, _root, admin, user) = seeded().await;

    let forbidden = app.get_auth("/admin/users", &user).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.code(), "INSUFFICIENT_ROLE");

    let listed = app.get_auth("/admin/users", &admin).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["pagination"]["total"], 3);
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn listing_supports_search_and_pagination() {
    let (app, _root, admin, _user) = seeded().await;

    let searched = app.get_auth("/admin/users?search=root", &admin).await;
    assert_eq!(searched.body["pagination"]["total"], 1);
    assert_eq!(searched.body["data"][0]["email"], "root@x.com");

    let paged = app.get_auth("/admin/users?page=1&limit=2", &admin).await;
    assert_eq!(paged.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(paged.body["pagination"]["totalPages"], 2);

    // Oversized limits clamp instead of failing
    let clamped = app.get_auth("/admin/users?limit=5000", &admin).await;
    assert_eq!(clamped.status, StatusCode::OK);
    assert_eq!(clamped.body["pagination"]["limit"], 100);
}

// ══════════════════════════════════════════════════════════════
// Role changes
// ══════════════════════════════════════════════════════════════

#[tokio::test]
async fn only_a_super_admin_assigns_super_admin() {
    let (app, root, admin, _user) = seeded().await;
    let user_id = app.account_id("user@x.com").await;
    let path = format!("/admin/users/{user_id}/role");

    let denied = app
        .patch_auth(&path, &admin, json!({ "role": "super_admin" }))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.code(), "SUPER_ADMIN_REQUIRED");

    let granted = app
        .patch_auth(&path, &root, json!({ "role": "super_admin" }))
        .await;
    assert_eq!(granted.status, StatusCode::OK);
    assert_eq!(granted.body["data"]["role"], "super_admin");
}

#[tokio::test]
async fn admin_may_promote_user_to_admin() {
    let (app, _root, admin, user) = seeded().await;
    let user_id = app.account_id("user@x.com").await;

    let promoted = app
        .patch_auth(
            &format!("/admin/users/{user_id}/role"),
            &admin,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["data"]["role"], "admin");

    // The promotion takes effect immediately for the target's token
    let listed = app.get_auth("/admin/users", &user).await;
    assert_eq!(listed.status, StatusCode::OK);
}

#[tokio::test]
async fn super_admin_target_is_protected_from_lesser_admins() {
    let (app, _root, admin, _user) = seeded().await;
    let root_id = app.account_id("root@x.com").await;

    let denied = app
        .patch_auth(
            &format!("/admin/users/{root_id}/role"),
            &admin,
            json!({ "role": "user" }),
        )
        .await;

    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.code(), "SUPER_ADMIN_PROTECTED");
}

#[tokio::test]
async fn super_admin_cannot_demote_themselves() {
    let (app, root, _admin, _user) = seeded().await;
    let root_id = app.account_id("root@x.com").await;

    let denied = app
        .patch_auth(
            &format!("/admin/users/{root_id}/role"),
            &root,
            json!({ "role": "admin" }),
        )
        .await;

    assert_eq!(denied.status, StatusCode::BAD_REQUEST);
    assert_eq!(denied.code(), "CANNOT_DEMOTE_SELF");
}

#[tokio::test]
async fn unknown_roles_and_targets_are_rejected() {
    let (app, root, _admin, _user) = seeded().await;
    let user_id = app.account_id("user@x.com").await;

    let bad_role = app
        .patch_auth(
            &format!("/admin/users/{user_id}/role"),
            &root,
            json!({ "role": "owner" }),
        )
        .await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_role.code(), "VALIDATION_FAILED");

    let missing = app
        .patch_auth(
            &format!("/admin/users/{}/role", uuid::Uuid::new_v4()),
            &root,
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.code(), "ACCOUNT_NOT_FOUND");
}

// ══════════════════════════════════════════════════════════════
// Status toggles
// ══════════════════════════════════════════════════════════════

#[tokio::test]
async fn admin_can_deactivate_and_reactivate_a_user() {
    let (app, _root, admin, _user) = seeded().await;
    let user_id = app.account_id("user@x.com").await;
    let path = format!("/admin/users/{user_id}/status");

    let deactivated = app
        .patch_auth(&path, &admin, json!({ "isActive": false }))
        .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(deactivated.body["data"]["isActive"], false);

    let login = app
        .post(
            "/auth/login",
            json!({ "email": "user@x.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(login.code(), "ACCOUNT_DEACTIVATED");

    let reactivated = app
        .patch_auth(&path, &admin, json!({ "isActive": true }))
        .await;
    assert_eq!(reactivated.body["data"]["isActive"], true);
}

#[tokio::test]
async fn super_admin_accounts_can_never_be_deactivated() {
    let (app, root, admin, _user) = seeded().await;
    let root_id = app.account_id("root@x.com").await;
    let path = format!("/admin/users/{root_id}/status");

    // Not by an admin, and not even by another super-admin
    let by_admin = app
        .patch_auth(&path, &admin, json!({ "isActive": false }))
        .await;
    assert_eq!(by_admin.status, StatusCode::BAD_REQUEST);
    assert_eq!(by_admin.code(), "CANNOT_DEACTIVATE_SUPER_ADMIN");

    let by_root = app
        .patch_auth(&path, &root, json!({ "isActive": false }))
        .await;
    assert_eq!(by_root.status, StatusCode::BAD_REQUEST);
    assert_eq!(by_root.code(), "CANNOT_DEACTIVATE_SUPER_ADMIN");
}

#[tokio::test]
async fn self_deactivation_is_rejected() {
    let (app, _root, admin, _user) = seeded().await;
    let admin_id = app.account_id("admin@x.com").await;

    let denied = app
        .patch_auth(
            &format!("/admin/users/{admin_id}/status"),
            &admin,
            json!({ "isActive": false }),
        )
        .await;

    assert_eq!(denied.status, StatusCode::BAD_REQUEST);
    assert_eq!(denied.code(), "CANNOT_DEACTIVATE_SELF");
}
