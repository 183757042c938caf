//! Tests for the session cart and wishlist endpoints.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

use luxio::storage::FileStorage;

fn add_item(session: &str, product_id: &str, quantity: Option<u32>) -> axum::http::Request<axum::body::Body> {
    let mut body = json!({"product_id": product_id});
    if let Some(quantity) = quantity {
        body["quantity"] = json!(quantity);
    }
    json_request("POST", &format!("/api/cart/{}/items", session), &body)
}

fn delete_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_session() {
    let response = test_app(create_test_app_state())
        .oneshot(json_request("POST", "/api/sessions", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = body_json(response).await["session"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&session).is_ok());
}

#[tokio::test]
async fn test_cart_lifecycle() {
    let app = test_app(create_test_app_state());

    let response = app.clone().oneshot(get_request("/api/cart/s1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["items"], json!([]));
    assert_eq!(json["totalItems"], 0);

    let response = app.clone().oneshot(add_item("s1", "iphone-15-pro", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(add_item("s1", "iphone-15-pro", Some(2))).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["quantity"], 3);
    assert_eq!(json["items"][0]["image"], "img/iphone.png");
    assert_eq!(json["items"][0]["storage"], "128 GB");
    assert_eq!(json["totalItems"], 3);
    assert_eq!(json["total"], 3687.0);

    let response = app.clone().oneshot(add_item("s1", "watch-9", None)).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["items"][1]["storage"], "N/A");
    assert_eq!(json["total"], 4136.0);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/cart/s1/items/iphone-15-pro", &json!({"quantity": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], 1678.0);

    let response = app
        .clone()
        .oneshot(delete_request("/api/cart/s1/items/watch-9"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["totalItems"], 1);

    // other sessions are untouched
    let response = app.clone().oneshot(get_request("/api/cart/s2")).await.unwrap();
    assert_eq!(body_json(response).await["totalItems"], 0);

    let response = app.clone().oneshot(delete_request("/api/cart/s1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.oneshot(get_request("/api/cart/s1")).await.unwrap();
    assert_eq!(body_json(response).await["items"], json!([]));
}

#[tokio::test]
async fn test_zero_quantity_update_removes_line() {
    let app = test_app(create_test_app_state());
    app.clone().oneshot(add_item("s1", "galaxy-s24", None)).await.unwrap();

    let response = app
        .oneshot(json_request("PUT", "/api/cart/s1/items/galaxy-s24", &json!({"quantity": 0})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["items"], json!([]));
}

#[tokio::test]
async fn test_cart_rejections() {
    let app = test_app(create_test_app_state());

    let response = app.clone().oneshot(add_item("s1", "pixel-8", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST, "out of stock");

    let response = app.clone().oneshot(add_item("s1", "nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(add_item("s1", "watch-9", Some(0))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.clone().oneshot(add_item("bad.session", "watch-9", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/cart/s1/items/watch-9", &json!({"quantity": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete_request("/api/cart/s1/items/watch-9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repeated_adds_stop_at_line_cap() {
    let app = test_app(create_test_app_state());

    for _ in 0..3 {
        let response = app.clone().oneshot(add_item("s1", "watch-9", Some(99))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get_request("/api/cart/s1")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["items"][0]["quantity"], 99);
    assert_eq!(json["totalItems"], 99);
}

#[tokio::test]
async fn test_client_price_is_ignored() {
    let app = test_app(create_test_app_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/cart/s1/items",
            &json!({"product_id": "watch-9", "price": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["total"], 449.0);
}

#[tokio::test]
async fn test_wishlist_toggle() {
    let app = test_app(create_test_app_state());
    let toggle = || json_request("POST", "/api/wishlist/s1/toggle", &json!({"product_id": "pixel-8"}));

    // out-of-stock products can still be wished for
    let response = app.clone().oneshot(toggle()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["inWishlist"], true);
    assert_eq!(json["count"], 1);
    assert_eq!(json["items"][0]["id"], "pixel-8");
    assert!(json["items"][0]["addedAt"].is_string());

    let response = app.clone().oneshot(get_request("/api/wishlist/s1")).await.unwrap();
    assert_eq!(body_json(response).await["count"], 1);

    let response = app.clone().oneshot(toggle()).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["inWishlist"], false);
    assert_eq!(json["count"], 0);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/wishlist/s1/toggle", &json!({"product_id": "nope"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.clone().oneshot(toggle()).await.unwrap();
    let response = app.clone().oneshot(delete_request("/api/wishlist/s1")).await.unwrap();
    assert_eq!(body_json(response).await["count"], 0);
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carts.json");

    let state = AppState {
        storage: Arc::new(FileStorage::open(&path).unwrap()),
        ..create_test_app_state()
    };
    test_app(state)
        .oneshot(add_item("s1", "galaxy-s24", Some(2)))
        .await
        .unwrap();

    let state = AppState {
        storage: Arc::new(FileStorage::open(&path).unwrap()),
        ..create_test_app_state()
    };
    let response = test_app(state).oneshot(get_request("/api/cart/s1")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["totalItems"], 2);
    assert_eq!(json["items"][0]["id"], "galaxy-s24");
}
