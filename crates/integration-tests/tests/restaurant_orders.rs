//! End-to-end tests for the restaurant order routes.

#![allow(clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use dinehub_api::models::{Restaurant, User};
use dinehub_core::OrderStatus;
use dinehub_integration_tests::{PNG_BYTES, TestApp, json_request, restaurant_form};

const OWNER: &str = "auth0|owner";
const DINER: &str = "auth0|diner";

/// An app with an owner, their restaurant, and a diner.
async fn setup() -> (TestApp, Restaurant, User) {
    let app = TestApp::new();
    let owner = app.store.insert_user(OWNER, "owner@example.com");
    let diner = app.store.insert_user(DINER, "diner@example.com");

    let request = restaurant_form("Curry Corner")
        .file("imageFile", "front.png", "image/png", PNG_BYTES)
        .into_request(Method::POST, "/api/my/restaurant", Some(OWNER));
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let restaurant = app.store.restaurant_of(owner.id).expect("restaurant stored");
    (app, restaurant, diner)
}

fn status_uri(order_id: impl std::fmt::Display) -> String {
    format!("/api/my/restaurant/order/{order_id}/status")
}

#[tokio::test]
async fn test_list_orders_newest_first_with_details() {
    let (app, restaurant, diner) = setup().await;
    let first = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);
    let second = app.store.insert_order(restaurant.id, &diner, OrderStatus::Placed);

    let response = app
        .send(json_request(Method::GET, "/api/my/restaurant/order", Some(OWNER), None))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let orders = response.json();
    let orders = orders.as_array().expect("array of orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["_id"], second.id.as_i32());
    assert_eq!(orders[1]["_id"], first.id.as_i32());
    assert_eq!(orders[0]["restaurant"]["restaurantName"], "Curry Corner");
    assert_eq!(orders[0]["user"]["email"], "diner@example.com");
    assert_eq!(orders[1]["status"], "paid");
    assert_eq!(orders[0]["deliveryDetails"]["city"], "Testville");
}

#[tokio::test]
async fn test_list_orders_only_includes_own_restaurant() {
    let (app, restaurant, diner) = setup().await;
    let _ = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);

    // The diner opens a restaurant of their own; it has no orders.
    let request = restaurant_form("Pizza Place")
        .file("imageFile", "pizza.png", "image/png", PNG_BYTES)
        .into_request(Method::POST, "/api/my/restaurant", Some(DINER));
    assert_eq!(app.send(request).await.status, StatusCode::CREATED);

    let response = app
        .send(json_request(Method::GET, "/api/my/restaurant/order", Some(DINER), None))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_owner_updates_status() {
    let (app, restaurant, diner) = setup().await;
    let order = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);

    let response = app
        .send(json_request(
            Method::PATCH,
            &status_uri(order.id),
            Some(OWNER),
            Some(&json!({ "status": "outForDelivery" })),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "outForDelivery");
    assert_eq!(
        app.store.order(order.id).expect("order stored").status,
        OrderStatus::OutForDelivery
    );
}

#[tokio::test]
async fn test_owner_may_move_status_backwards() {
    let (app, restaurant, diner) = setup().await;
    let order = app.store.insert_order(restaurant.id, &diner, OrderStatus::Delivered);

    let response = app
        .send(json_request(
            Method::PATCH,
            &status_uri(order.id),
            Some(OWNER),
            Some(&json!({ "status": "inProgress" })),
        ))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.store.order(order.id).expect("order stored").status,
        OrderStatus::InProgress
    );
}

#[tokio::test]
async fn test_non_owner_cannot_update_status() {
    let (app, restaurant, diner) = setup().await;
    let order = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);

    let response = app
        .send(json_request(
            Method::PATCH,
            &status_uri(order.id),
            Some(DINER),
            Some(&json!({ "status": "delivered" })),
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.store.order(order.id).expect("order stored").status,
        OrderStatus::Paid
    );
}

#[tokio::test]
async fn test_invalid_status_is_rejected_without_mutation() {
    let (app, restaurant, diner) = setup().await;
    let order = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);

    let response = app
        .send(json_request(
            Method::PATCH,
            &status_uri(order.id),
            Some(OWNER),
            Some(&json!({ "status": "eaten" })),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.json()["message"]
            .as_str()
            .expect("message")
            .contains("eaten")
    );
    assert_eq!(
        app.store.order(order.id).expect("order stored").status,
        OrderStatus::Paid
    );
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let (app, _, _) = setup().await;

    for id in ["9999", "not-a-number"] {
        let response = app
            .send(json_request(
                Method::PATCH,
                &status_uri(id),
                Some(OWNER),
                Some(&json!({ "status": "paid" })),
            ))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "order id {id}");
    }
}

#[tokio::test]
async fn test_status_update_requires_subject() {
    let (app, restaurant, diner) = setup().await;
    let order = app.store.insert_order(restaurant.id, &diner, OrderStatus::Paid);

    let response = app
        .send(json_request(
            Method::PATCH,
            &status_uri(order.id),
            None,
            Some(&json!({ "status": "delivered" })),
        ))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.store.order(order.id).expect("order stored").status,
        OrderStatus::Paid
    );
}
