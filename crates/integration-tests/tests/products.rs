//! Product catalog and product analytics routes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use storelens_integration_tests::{TestContext, admin_path};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn product(id: i64, inventory: &[Option<i64>]) -> Value {
    let variants: Vec<Value> = inventory
        .iter()
        .enumerate()
        .map(|(i, qty)| {
            json!({
                "id": id * 100 + i64::try_from(i).unwrap(),
                "product_id": id,
                "price": "12.00",
                "inventory_quantity": qty,
            })
        })
        .collect();

    json!({
        "id": id,
        "title": format!("Product {id}"),
        "handle": format!("product-{id}"),
        "variants": variants,
        "images": [{ "id": id * 10, "src": format!("https://cdn.example.com/{id}.jpg") }],
    })
}

fn order_with_lines(id: i64, lines: &[(i64, u32)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|&(product_id, quantity)| {
            json!({ "product_id": product_id, "quantity": quantity, "price": "10.00" })
        })
        .collect();
    json!({ "id": id, "currency": "EUR", "line_items": items })
}

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_best_selling_ranks_catalog_and_looks_up_missing_products() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("orders.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [
                order_with_lines(1, &[(1, 2), (2, 3)]),
                order_with_lines(2, &[(2, 2), (99, 1)]),
            ]
        })))
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("products.json")))
        .and(query_param("ids", "99"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "products": [product(99, &[])] })),
        )
        .with_priority(1)
        .expect(1)
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product(1, &[]), product(2, &[]), product(3, &[])]
        })))
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/products/best-selling").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(ids(&res.body), vec![2, 1, 99, 3]);
    assert_eq!(res.body["count"], 4);

    let top = &res.body["data"][0];
    assert_eq!(top["total_sold"], 5);
    assert_eq!(top["revenue"], "50.00");
    assert_eq!(top["currency"], "EUR");
    assert_eq!(top["admin_url"], "https://demo.myshopify.com/admin/products/2");
    assert_eq!(top["public_url"], "https://shop.example.com/products/product-2");
    assert_eq!(res.body["data"][3]["total_sold"], 0);
}

#[tokio::test]
async fn test_worst_selling_puts_unsold_first() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("orders.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orders": [order_with_lines(1, &[(1, 4), (2, 1)])]
        })))
        .mount(&ctx.shopify)
        .await;
    Mock::given(method("GET"))
        .and(path(admin_path("products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product(1, &[]), product(2, &[]), product(3, &[])]
        })))
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/products/worst-selling?limit=2").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(&res.body), vec![3, 2]);
}

#[tokio::test]
async fn test_low_stock_skips_untracked_and_sorts_by_stock() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                product(1, &[Some(3), Some(20)]),
                product(2, &[None]),
                product(3, &[Some(0)]),
                product(4, &[Some(6)]),
            ]
        })))
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/products/low-stock?threshold=5").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(&res.body), vec![3, 1]);
    assert_eq!(res.body["threshold"], 5);
    assert_eq!(res.body["data"][1]["stock"], 3);
    assert_eq!(res.body["data"][1]["low_variants"], 1);
    assert_eq!(res.body["data"][1]["image"], "https://cdn.example.com/1.jpg");
}

#[tokio::test]
async fn test_product_page_exposes_next_cursor() {
    let ctx = TestContext::new().await;
    let link = r#"<https://demo.myshopify.com/admin/api/2024-01/products.json?limit=2&page_info=eyJsYXN0X2lkIjo>; rel="next""#;

    Mock::given(method("GET"))
        .and(path(admin_path("products.json")))
        .and(query_param("limit", "2"))
        .and(query_param("page_info", "cursor1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link)
                .set_body_json(json!({ "products": [product(1, &[]), product(2, &[])] })),
        )
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let res = ctx.get("/api/products?limit=2&page_info=cursor1").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.body["pagination"]["hasNextPage"], true);
    assert_eq!(res.body["pagination"]["nextPageInfo"], "eyJsYXN0X2lkIjo");
}

#[tokio::test]
async fn test_product_by_id() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(admin_path("products/7.json")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "product": product(7, &[Some(1)]) })),
        )
        .mount(&ctx.shopify)
        .await;

    let found = ctx.get("/api/products/7").await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["data"]["title"], "Product 7");

    let missing = ctx.get("/api/products/8").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["success"], false);
    assert_eq!(missing.body["error"], "Product not found");

    let invalid = ctx.get("/api/products/not-a-number").await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"], "Valid product ID is required");
}

#[tokio::test]
async fn test_ranked_limit_is_validated_before_any_upstream_call() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.shopify)
        .await;

    for uri in [
        "/api/products/best-selling?limit=51",
        "/api/products/worst-selling?limit=0",
        "/api/products/low-stock?threshold=101",
        "/api/products?limit=abc",
    ] {
        let res = ctx.get(uri).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(res.body["success"], false, "{uri}");
    }
}

#[tokio::test]
async fn test_legacy_routes_redirect_permanently() {
    let ctx = TestContext::new().await;

    let res = ctx.get("/api/best-selling?limit=3").await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers[header::LOCATION],
        "/api/products/best-selling?limit=3"
    );

    let res = ctx.get("/api/worst-selling").await;
    assert_eq!(res.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers[header::LOCATION], "/api/products/worst-selling");
}
