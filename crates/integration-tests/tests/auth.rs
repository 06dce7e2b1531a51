//! OAuth login, callback and token verification.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;
use storelens_integration_tests::{TestContext, admin_path};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_login_requires_oauth_configuration() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/auth/shopify-login").await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Shopify OAuth is not configured");
}

#[tokio::test]
async fn test_login_returns_authorize_url() {
    let ctx = TestContext::with_oauth().await;

    let res = ctx.get("/api/auth/shopify-login").await;

    assert_eq!(res.status, StatusCode::OK);
    let url = res.body["authUrl"].as_str().unwrap();
    assert!(url.starts_with("https://demo.myshopify.com/admin/oauth/authorize?"));
    assert!(url.contains("client_id=test-client-id"));
    assert!(url.contains("scope=read_products,read_orders,read_customers,read_analytics"));
    assert!(url.contains("redirect_uri=https%3A%2F%2Fdash.example.com%2Fauth%2Fcallback"));
}

#[tokio::test]
async fn test_callback_validates_input() {
    let ctx = TestContext::with_oauth().await;

    let missing = ctx
        .post_json("/api/auth/callback", &json!({ "shop": "demo.myshopify.com" }))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "Missing required parameters: code and shop");

    let foreign = ctx
        .post_json(
            "/api/auth/callback",
            &json!({ "code": "abc", "shop": "evil.example.com" }),
        )
        .await;
    assert_eq!(foreign.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_and_verify_reject_shops_that_escape_the_host() {
    let ctx = TestContext::with_oauth().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.shopify)
        .await;

    for shop in [
        "attacker.example/.myshopify.com",
        "attacker.example#.myshopify.com",
        "attacker.example?x=.myshopify.com",
        "user@attacker.example.myshopify.com",
        "attacker.example:8443.myshopify.com",
    ] {
        let res = ctx
            .post_json("/api/auth/callback", &json!({ "code": "abc", "shop": shop }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{shop}");
        assert_eq!(res.body["success"], false, "{shop}");

        let uri = format!(
            "/api/auth/verify?shop={}&access_token=tok",
            urlencoding::encode(shop)
        );
        let res = ctx.get(&uri).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{shop}");
    }
}

#[tokio::test]
async fn test_callback_exchanges_code_and_loads_shop() {
    let ctx = TestContext::with_oauth().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_json(json!({
            "client_id": "test-client-id",
            "client_secret": "Vq7rN2xLp9KcW4tZ8mBj",
            "code": "auth-code",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_fresh",
            "scope": "read_orders,read_products",
        })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("shop.json")))
        .and(header("X-Shopify-Access-Token", "shpat_fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shop": { "id": 1, "name": "Demo", "myshopify_domain": "other.myshopify.com" }
        })))
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("users/current.json")))
        .and(header("X-Shopify-Access-Token", "shpat_fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": 9, "first_name": "Sam", "account_owner": true }
        })))
        .mount(&ctx.shopify)
        .await;

    let res = ctx
        .post_json(
            "/api/auth/callback",
            &json!({ "code": "auth-code", "shop": "other.myshopify.com" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["access_token"], "shpat_fresh");
    assert_eq!(res.body["shop"]["name"], "Demo");
    assert_eq!(res.body["user"]["first_name"], "Sam");
}

#[tokio::test]
async fn test_callback_surfaces_rejected_code() {
    let ctx = TestContext::with_oauth().await;

    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_request" })),
        )
        .mount(&ctx.shopify)
        .await;

    let res = ctx
        .post_json(
            "/api/auth/callback",
            &json!({ "code": "stale", "shop": "demo.myshopify.com" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"]["error"], "invalid_request");
}

#[tokio::test]
async fn test_verify_token() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("shop.json")))
        .and(header("X-Shopify-Access-Token", "good"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "shop": { "name": "Demo" } })),
        )
        .with_priority(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("shop.json")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "errors": "[API] Invalid API key or access token" })),
        )
        .mount(&ctx.shopify)
        .await;

    let valid = ctx
        .get("/api/auth/verify?shop=demo.myshopify.com&access_token=good")
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.body["valid"], true);
    assert_eq!(valid.body["shop"]["name"], "Demo");

    let invalid = ctx
        .get("/api/auth/verify?shop=demo.myshopify.com&access_token=bad")
        .await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.body["error"], "Invalid access token");

    let missing = ctx.get("/api/auth/verify?shop=demo.myshopify.com").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout() {
    let ctx = TestContext::new().await;

    let res = ctx.post_json("/api/auth/logout", &json!({})).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Logged out successfully");
}
