//! Database CRUD operation tests for offers, products, and staff

#[path = "../common/mod.rs"]
mod common;

use common::*;

use rust_decimal::Decimal;

// ============ Offer Tests ============

#[test]
fn test_create_offer() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Summer Pack", "summer-pack", OfferState::Published);

    assert!(!offer.id.is_empty(), "offer should have a generated ID");
    assert_eq!(offer.name, "Summer Pack");
    assert_eq!(offer.slug, "summer-pack");
    assert_eq!(offer.state, OfferState::Published);
    assert!(offer.created_at > 0);
    assert_eq!(offer.created_at, offer.updated_at);
}

#[test]
fn test_get_offer_by_id() {
    let conn = setup_test_db();
    let created = create_test_offer(&conn, "Summer", "summer", OfferState::Draft);

    let fetched = queries::get_offer_by_id(&conn, &created.id)
        .expect("Query failed")
        .expect("Offer not found");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.slug, created.slug);

    let missing = queries::get_offer_by_id(&conn, "nope").expect("Query failed");
    assert!(missing.is_none(), "unknown id should return None");
}

#[test]
fn test_slug_taken_respects_exclusion() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Mine", "mine", OfferState::Draft);

    assert!(queries::slug_taken(&conn, "mine", None).unwrap());
    assert!(!queries::slug_taken(&conn, "mine", Some(&offer.id)).unwrap());
    assert!(!queries::slug_taken(&conn, "free", None).unwrap());
}

#[test]
fn test_update_offer_replaces_the_row() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Old", "old", OfferState::Draft);

    let input = OfferInput {
        name: "New".to_string(),
        slug: "new".to_string(),
        description: Some("Fresh copy".to_string()),
        state: OfferState::Published,
    };
    let updated = queries::update_offer(&conn, &offer.id, &input, Some("offers/new.png"))
        .expect("Query failed")
        .expect("Offer not found");

    assert_eq!(updated.name, "New");
    assert_eq!(updated.slug, "new");
    assert_eq!(updated.description.as_deref(), Some("Fresh copy"));
    assert_eq!(updated.state, OfferState::Published);
    assert_eq!(updated.image, "offers/new.png");
    assert!(updated.updated_at >= offer.updated_at);

    // Without a replacement image the old path stays
    let kept = queries::update_offer(&conn, &offer.id, &input, None)
        .unwrap()
        .unwrap();
    assert_eq!(kept.image, "offers/new.png");
}

#[test]
fn test_update_missing_offer_returns_none() {
    let conn = setup_test_db();

    let input = OfferInput {
        name: "X".to_string(),
        slug: "x".to_string(),
        description: None,
        state: OfferState::Draft,
    };
    let result = queries::update_offer(&conn, "nope", &input, None).expect("Query failed");
    assert!(result.is_none());
}

#[test]
fn test_delete_offer_cascades_to_products() {
    let mut conn = setup_test_db();
    let offer = create_test_offer(&conn, "Doomed", "doomed", OfferState::Draft);
    let product = create_test_product(&conn, &offer.id, "P", "SKU-1", ProductState::Draft);
    create_test_product(&conn, &offer.id, "Q", "SKU-2", ProductState::Published);

    let images = queries::product_images_for_offer(&conn, &offer.id).unwrap();
    assert_eq!(images.len(), 2);

    assert!(queries::delete_offer(&mut conn, &offer.id).expect("Delete failed"));

    assert!(queries::get_offer_by_id(&conn, &offer.id).unwrap().is_none());
    assert!(
        queries::get_product_in_offer(&conn, &offer.id, &product.id)
            .unwrap()
            .is_none()
    );
    assert!(queries::product_images_for_offer(&conn, &offer.id).unwrap().is_empty());

    // Second delete is a no-op
    assert!(!queries::delete_offer(&mut conn, &offer.id).expect("Delete failed"));
}

#[test]
fn test_list_offers_filters_and_counts() {
    let conn = setup_test_db();
    create_test_offer(&conn, "Summer Pack", "summer-pack", OfferState::Published);
    create_test_offer(&conn, "Winter Pack", "winter-pack", OfferState::Draft);
    create_test_offer(&conn, "Spring Pack", "spring-pack", OfferState::Draft);

    let all = OfferFilter::default();
    let (items, total) = queries::list_offers(&conn, &all).expect("Query failed");
    assert_eq!(items.len(), 3);
    assert_eq!(total, 3);

    let drafts = OfferFilter {
        state: Some(OfferState::Draft),
        ..Default::default()
    };
    let (items, total) = queries::list_offers(&conn, &drafts).unwrap();
    assert_eq!(total, 2);
    assert!(items.iter().all(|o| o.state == OfferState::Draft));

    let named = OfferFilter {
        name: Some("Sum".to_string()),
        ..Default::default()
    };
    let (items, total) = queries::list_offers(&conn, &named).unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].slug, "summer-pack");

    let by_slug = OfferFilter {
        slug: Some("winter".to_string()),
        ..Default::default()
    };
    let (_, total) = queries::list_offers(&conn, &by_slug).unwrap();
    assert_eq!(total, 1);
}

#[test]
fn test_list_offers_treats_like_wildcards_literally() {
    let conn = setup_test_db();
    create_test_offer(&conn, "100% Cotton", "cotton", OfferState::Draft);
    create_test_offer(&conn, "1000 Threads", "threads", OfferState::Draft);

    // "%" in the needle must match a literal percent sign only
    let filter = OfferFilter {
        name: Some("100%".to_string()),
        ..Default::default()
    };
    let (items, total) = queries::list_offers(&conn, &filter).expect("Query failed");
    assert_eq!(total, 1);
    assert_eq!(items[0].slug, "cotton");
}

#[test]
fn test_list_offers_pages_newest_first() {
    let conn = setup_test_db();
    let a = create_test_offer(&conn, "A", "a", OfferState::Draft);
    let b = create_test_offer(&conn, "B", "b", OfferState::Draft);
    let c = create_test_offer(&conn, "C", "c", OfferState::Draft);
    set_created_at(&conn, "offers", &a.id, 100);
    set_created_at(&conn, "offers", &b.id, 200);
    set_created_at(&conn, "offers", &c.id, 300);

    let page = OfferFilter {
        limit: Some(2),
        ..Default::default()
    };
    let (items, total) = queries::list_offers(&conn, &page).unwrap();
    assert_eq!(total, 3);
    let slugs: Vec<&str> = items.iter().map(|o| o.slug.as_str()).collect();
    assert_eq!(slugs, ["c", "b"]);

    let rest = OfferFilter {
        limit: Some(2),
        offset: Some(2),
        ..Default::default()
    };
    let (items, _) = queries::list_offers(&conn, &rest).unwrap();
    assert_eq!(items[0].slug, "a");
}

// ============ Product Tests ============

#[test]
fn test_create_product_canonicalizes_price() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);

    let input = ProductInput {
        name: "Widget".to_string(),
        sku: "SKU-1".to_string(),
        price: Decimal::new(10, 0),
        state: ProductState::Draft,
    };
    let product =
        queries::create_product(&conn, &offer.id, &input, "products/w.png").expect("Create failed");

    assert_eq!(product.price.to_string(), "10.00");
    assert_eq!(product.offer_id, offer.id);

    // The stored text round-trips with the padded scale
    let fetched = queries::get_product_in_offer(&conn, &offer.id, &product.id)
        .unwrap()
        .unwrap();
    assert_eq!(fetched.price.to_string(), "10.00");
}

#[test]
fn test_get_product_is_scoped_to_offer() {
    let conn = setup_test_db();
    let own = create_test_offer(&conn, "Own", "own", OfferState::Draft);
    let other = create_test_offer(&conn, "Other", "other", OfferState::Draft);
    let product = create_test_product(&conn, &own.id, "P", "SKU-1", ProductState::Draft);

    assert!(
        queries::get_product_in_offer(&conn, &own.id, &product.id)
            .unwrap()
            .is_some()
    );
    assert!(
        queries::get_product_in_offer(&conn, &other.id, &product.id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_sku_taken_respects_exclusion() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);
    let product = create_test_product(&conn, &offer.id, "P", "SKU-1", ProductState::Draft);

    assert!(queries::sku_taken(&conn, "SKU-1", None).unwrap());
    assert!(!queries::sku_taken(&conn, "SKU-1", Some(&product.id)).unwrap());
    assert!(!queries::sku_taken(&conn, "SKU-9", None).unwrap());
}

#[test]
fn test_products_for_offer_returns_all_states() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);
    let other = create_test_offer(&conn, "Other", "other", OfferState::Draft);
    create_test_product(&conn, &offer.id, "A", "SKU-A", ProductState::Published);
    create_test_product(&conn, &offer.id, "B", "SKU-B", ProductState::Invisible);
    create_test_product(&conn, &other.id, "C", "SKU-C", ProductState::Draft);

    let products = queries::products_for_offer(&conn, &offer.id).unwrap();
    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p.offer_id == offer.id));
}

#[test]
fn test_list_products_paginated() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);
    let a = create_test_product(&conn, &offer.id, "A", "SKU-A", ProductState::Draft);
    let b = create_test_product(&conn, &offer.id, "B", "SKU-B", ProductState::Draft);
    let c = create_test_product(&conn, &offer.id, "C", "SKU-C", ProductState::Draft);
    set_created_at(&conn, "products", &a.id, 100);
    set_created_at(&conn, "products", &b.id, 200);
    set_created_at(&conn, "products", &c.id, 300);

    let (items, total) = queries::list_products_paginated(&conn, &offer.id, 2, 0).unwrap();
    assert_eq!(total, 3);
    let skus: Vec<&str> = items.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, ["SKU-C", "SKU-B"]);

    let (items, _) = queries::list_products_paginated(&conn, &offer.id, 2, 2).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].sku, "SKU-A");
}

#[test]
fn test_update_product_replaces_the_row() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);
    let product = create_test_product(&conn, &offer.id, "Old", "SKU-1", ProductState::Draft);

    let input = ProductInput {
        name: "New".to_string(),
        sku: "SKU-2".to_string(),
        price: Decimal::new(245, 1),
        state: ProductState::Published,
    };
    let updated = queries::update_product(&conn, &offer.id, &product.id, &input, None)
        .expect("Query failed")
        .expect("Product not found");

    assert_eq!(updated.name, "New");
    assert_eq!(updated.sku, "SKU-2");
    assert_eq!(updated.price.to_string(), "24.50");
    assert_eq!(updated.state, ProductState::Published);
    assert_eq!(updated.image, "products/test.png");

    // Wrong offer scope leaves the row alone
    let other = create_test_offer(&conn, "Other", "other", OfferState::Draft);
    let result = queries::update_product(&conn, &other.id, &product.id, &input, None).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_delete_product() {
    let conn = setup_test_db();
    let offer = create_test_offer(&conn, "Offer", "offer", OfferState::Draft);
    let product = create_test_product(&conn, &offer.id, "P", "SKU-1", ProductState::Draft);

    assert!(queries::delete_product(&conn, &offer.id, &product.id).expect("Delete failed"));
    assert!(!queries::delete_product(&conn, &offer.id, &product.id).expect("Delete failed"));

    // The offer survives its product
    assert!(queries::get_offer_by_id(&conn, &offer.id).unwrap().is_some());
}

// ============ Staff Tests ============

#[test]
fn test_create_staff_returns_plaintext_key_once() {
    let conn = setup_test_db();
    let (staff, api_key) = create_test_staff(&conn, "staff@example.com");

    assert!(!staff.id.is_empty());
    assert!(api_key.starts_with("vt_"), "API key should have vt_ prefix");
    assert_ne!(staff.api_key_hash, api_key, "only the hash is persisted");
    assert_eq!(staff.api_key_hash, queries::hash_staff_key(&api_key));
}

#[test]
fn test_staff_email_is_normalized() {
    let conn = setup_test_db();
    let (staff, _) = create_test_staff(&conn, "  Staff@Example.COM ");

    assert_eq!(staff.email, "staff@example.com");
}

#[test]
fn test_get_staff_by_api_key() {
    let conn = setup_test_db();
    let (created, api_key) = create_test_staff(&conn, "staff@example.com");

    let fetched = queries::get_staff_by_api_key(&conn, &api_key)
        .expect("Query failed")
        .expect("Staff not found");
    assert_eq!(fetched.id, created.id);

    let missing = queries::get_staff_by_api_key(&conn, "vt_wrong").expect("Query failed");
    assert!(missing.is_none(), "unknown key should return None");
}

#[test]
fn test_duplicate_staff_email_is_rejected() {
    let conn = setup_test_db();
    create_test_staff(&conn, "staff@example.com");

    let input = CreateStaff {
        email: "staff@example.com".to_string(),
        name: "Twin".to_string(),
    };
    assert!(queries::create_staff(&conn, &input).is_err());
}

#[test]
fn test_count_staff() {
    let conn = setup_test_db();
    assert_eq!(queries::count_staff(&conn).unwrap(), 0);

    create_test_staff(&conn, "one@example.com");
    create_test_staff(&conn, "two@example.com");
    assert_eq!(queries::count_staff(&conn).unwrap(), 2);
}
