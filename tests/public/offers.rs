//! Public catalogue feed tests.
//!
//! GET /offers is the only public list endpoint and must apply the
//! two-level visibility rule: published offers only, each carrying only
//! its published products.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

#[path = "../common/mod.rs"]
mod common;
use common::*;

async fn fetch_catalogue(app: axum::Router) -> serde_json::Value {
    let response = app
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_catalogue_lists_published_offers_with_their_published_products() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        let offer = create_test_offer(&conn, "Summer Pack", "summer-pack", OfferState::Published);
        create_test_product(&conn, &offer.id, "Shirt", "SKU-1", ProductState::Published);
        create_test_product(&conn, &offer.id, "Hat", "SKU-2", ProductState::Draft);
        create_test_product(&conn, &offer.id, "Tote", "SKU-3", ProductState::Invisible);
    }

    let body = fetch_catalogue(app(&ctx)).await;

    let offers = body.as_array().expect("feed should be a bare JSON array");
    assert_eq!(offers.len(), 1);

    let offer = &offers[0];
    assert_eq!(offer["slug"], "summer-pack");
    assert_eq!(offer["state"], "published");
    assert!(offer["id"].is_string());
    assert!(offer["image"].is_string());
    // The public projection stops at the catalogue fields
    assert!(offer.get("created_at").is_none());

    let products = offer["products"].as_array().unwrap();
    assert_eq!(products.len(), 1, "only the published product is visible");
    assert_eq!(products[0]["sku"], "SKU-1");
    assert_eq!(products[0]["state"], "published");
    assert_eq!(products[0]["price"], "19.99");
    assert!(products[0].get("offer_id").is_none());
}

#[tokio::test]
async fn test_catalogue_excludes_draft_and_hidden_offers() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        let draft = create_test_offer(&conn, "Draft", "draft-offer", OfferState::Draft);
        let hidden = create_test_offer(&conn, "Hidden", "hidden-offer", OfferState::Hidden);
        create_test_offer(&conn, "Live", "live-offer", OfferState::Published);

        // Published products do not rescue an unpublished offer
        create_test_product(&conn, &draft.id, "A", "SKU-A", ProductState::Published);
        create_test_product(&conn, &hidden.id, "B", "SKU-B", ProductState::Published);
    }

    let body = fetch_catalogue(app(&ctx)).await;

    let slugs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["live-offer"]);
}

#[tokio::test]
async fn test_catalogue_empty_database_returns_empty_array() {
    let ctx = test_context();

    let body = fetch_catalogue(app(&ctx)).await;

    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_catalogue_keeps_published_offer_with_no_published_products() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        let offer = create_test_offer(&conn, "Preview", "preview", OfferState::Published);
        create_test_product(&conn, &offer.id, "Soon", "SKU-1", ProductState::Draft);
    }

    let body = fetch_catalogue(app(&ctx)).await;

    let offers = body.as_array().unwrap();
    assert_eq!(offers.len(), 1, "the offer itself stays in the feed");
    assert_eq!(offers[0]["products"], serde_json::json!([]));
}

#[tokio::test]
async fn test_catalogue_orders_offers_oldest_first() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        // Insert out of order, then pin creation times
        let second = create_test_offer(&conn, "Second", "second", OfferState::Published);
        let first = create_test_offer(&conn, "First", "first", OfferState::Published);
        let third = create_test_offer(&conn, "Third", "third", OfferState::Published);
        set_created_at(&conn, "offers", &first.id, 100);
        set_created_at(&conn, "offers", &second.id, 200);
        set_created_at(&conn, "offers", &third.id, 300);
    }

    let body = fetch_catalogue(app(&ctx)).await;

    let slugs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["first", "second", "third"]);
}

#[tokio::test]
async fn test_catalogue_requires_no_credentials() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        create_test_offer(&conn, "Open", "open", OfferState::Published);
    }

    // No Authorization header anywhere in sight
    let response = app(&ctx)
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_catalogue_response_is_json() {
    let ctx = test_context();
    {
        let conn = ctx.state.db.get().unwrap();
        create_test_offer(&conn, "Open", "open", OfferState::Published);
    }

    let response = app(&ctx)
        .oneshot(Request::builder().uri("/offers").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("application/json"));
}

#[tokio::test]
async fn test_health_returns_ok() {
    let ctx = test_context();

    let response = app(&ctx)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_uploaded_images_are_served_as_static_files() {
    let ctx = test_context();
    let relative = vitrine::uploads::store_image(&ctx.state.upload_dir, "offers", "png", TINY_PNG)
        .expect("Failed to store image");

    let response = app(&ctx)
        .oneshot(
            Request::builder()
                .uri(format!("/uploads/{}", relative))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], TINY_PNG);
}
