//! HTTP-level tests for registration, login, sessions, profiles, password
//! reset and admin user management.

mod common;

use axum::http::StatusCode;
use bookstore_api::auth::reset::reset_link;
use bookstore_db::repositories::UserRepo;
use chrono::Utc;
use common::{
    body_json, get, get_auth, post_json, post_json_auth, put_json_auth, token_for, user_token,
    ROLE_ID_ADMIN, ROLE_ID_MODERATOR, ROLE_ID_USER, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn login(app: &axum::Router, username: &str, password: &str) -> axum::response::Response {
    post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_plain_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "username": "reader",
            "email": "Reader@Example.com",
            "password": "bookworm-42",
            "password2": "bookworm-42",
            "first_name": "Rea",
            "last_name": "Der",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["username"], "reader");
    assert_eq!(json["email"], "reader@example.com");
    assert_eq!(json["role"], "user");
    assert_eq!(json["full_name"], "Rea Der");
    assert!(json.get("password_hash").is_none());

    let response = login(&app, "reader", "bookworm-42").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_bad_input(pool: PgPool) {
    common::create_user(&pool, "taken", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    let mismatch = json!({
        "username": "newbie",
        "email": "newbie@example.com",
        "password": "bookworm-42",
        "password2": "bookworm-43",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", mismatch).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Password fields didn't match");

    let numeric = json!({
        "username": "newbie",
        "email": "newbie@example.com",
        "password": "12345678",
        "password2": "12345678",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", numeric).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let duplicate = json!({
        "username": "taken",
        "email": "other@example.com",
        "password": "bookworm-42",
        "password2": "bookworm-42",
    });
    let response = post_json(app, "/api/v1/auth/register", duplicate).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Login and sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_role(pool: PgPool) {
    common::create_user(&pool, "mod", ROLE_ID_MODERATOR).await;
    let app = common::build_test_app(pool);

    let response = login(&app, "mod", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "moderator");
    assert_eq!(json["expires_in"], 900);

    let token = json["access_token"].as_str().unwrap();
    let me = body_json(get_auth(app, "/api/v1/users/me", token).await).await;
    assert_eq!(me["username"], "mod");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_failures(pool: PgPool) {
    let inactive = common::create_user(&pool, "gone", ROLE_ID_USER).await;
    UserRepo::update(
        &pool,
        inactive.id,
        &bookstore_db::models::user::UpdateUser {
            role_id: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap();
    common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    let response = login(&app, "reader", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "nobody", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = login(&app, "gone", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = login(&app, "reader", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = login(&app, "reader", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_and_logout_revokes(pool: PgPool) {
    common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    let tokens = body_json(login(&app, "reader", TEST_PASSWORD).await).await;
    let first_refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    let second_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    let access = rotated["access_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // The old refresh token was revoked by the rotation.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(app.clone(), "/api/v1/auth/logout", json!({}), &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": second_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app.clone(), "/api/v1/users/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_and_password_change(pool: PgPool) {
    let token = user_token(&pool, "reader", "user").await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/users/me",
        json!({ "first_name": "  Ada ", "bio": "Reads a lot" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["first_name"], "Ada");
    assert_eq!(me["bio"], "Reads a lot");
    assert_eq!(me["role"], "user");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/users/me/password",
        json!({
            "old_password": "not-my-password",
            "new_password": "fresh-pages-77",
            "new_password2": "fresh-pages-77",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Old password is not correct");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/users/me/password",
        json!({
            "old_password": TEST_PASSWORD,
            "new_password": "fresh-pages-77",
            "new_password2": "fresh-pages-77",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        login(&app, "reader", TEST_PASSWORD).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&app, "reader", "fresh-pages-77").await.status(),
        StatusCode::OK
    );
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_request_requires_known_email(pool: PgPool) {
    common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/password-reset",
        json!({ "email": "stranger@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/auth/password-reset",
        json!({ "email": "READER@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["detail"],
        "Password reset email has been sent."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_confirm_sets_password_once(pool: PgPool) {
    let user = common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let app = common::build_test_app(pool);

    let link = reset_link(&common::test_config(), &user, Utc::now().timestamp());
    let token = link.trim_end_matches('/').rsplit('/').next().unwrap().to_string();
    let uri = format!("/api/v1/auth/password-reset/confirm/{}/{token}", user.id);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/auth/password-reset/confirm/{}/garbage", user.id),
        json!({ "new_password": "fresh-pages-77", "new_password2": "fresh-pages-77" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app.clone(),
        &uri,
        json!({ "new_password": "fresh-pages-77", "new_password2": "fresh-pages-77" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["detail"], "Password has been reset.");

    assert_eq!(
        login(&app, "reader", "fresh-pages-77").await.status(),
        StatusCode::OK
    );

    // The password hash changed, so the same link no longer works.
    let response = post_json(
        app,
        &uri,
        json!({ "new_password": "another-one-88", "new_password2": "another-one-88" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_manages_users(pool: PgPool) {
    let admin = common::create_user(&pool, "root", ROLE_ID_ADMIN).await;
    let reader = common::create_user(&pool, "reader", ROLE_ID_USER).await;
    let admin_token = token_for(&admin, "admin");
    let reader_token = token_for(&reader, "user");
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/admin/users", &reader_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let listed = body_json(get_auth(app.clone(), "/api/v1/admin/users", &admin_token).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", reader.id),
        json!({ "role_id": ROLE_ID_MODERATOR }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "moderator");

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", reader.id),
        json!({ "role_id": 99 }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}", admin.id),
        json!({ "is_active": false }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
