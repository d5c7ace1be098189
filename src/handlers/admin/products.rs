use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result};
use crate::extractors::{Json, Multipart, Path, Query};
use crate::middleware::StaffContext;
use crate::models::Product;
use crate::pagination::{Paginated, PaginationQuery};
use crate::uploads;

use super::forms;
use super::offers::OfferPath;

#[derive(serde::Deserialize)]
pub struct ProductPath {
    pub offer_id: String,
    pub product_id: String,
}

pub async fn list_products(
    State(state): State<AppState>,
    Path(path): Path<OfferPath>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Paginated<Product>>> {
    let conn = state.db.get()?;
    queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;

    let limit = pagination.limit();
    let offset = pagination.offset();
    let (items, total) = queries::list_products_paginated(&conn, &path.offer_id, limit, offset)?;
    Ok(Json(Paginated::new(items, total, limit, offset)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(path): Path<OfferPath>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let offer = queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;

    let form = forms::read_form(multipart).await?;
    let (input, image) = forms::product_create_input(&conn, &form)?;

    let image_path = uploads::store_image(&state.upload_dir, "products", image.ext, image.bytes)?;
    let product = queries::create_product(&conn, &offer.id, &input, &image_path)?;

    tracing::info!(staff = %ctx.staff.email, product = %product.id, sku = %product.sku, "Created product");
    Ok(Json(product))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(path): Path<ProductPath>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;
    let product = queries::get_product_in_offer(&conn, &path.offer_id, &path.product_id)?
        .or_not_found("Product not found")?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(path): Path<ProductPath>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;
    let existing = queries::get_product_in_offer(&conn, &path.offer_id, &path.product_id)?
        .or_not_found("Product not found")?;

    let form = forms::read_form(multipart).await?;
    let (input, image) = forms::product_update_input(&conn, &form, &existing.id)?;

    let image_path = match image {
        Some(image) => Some(uploads::store_image(
            &state.upload_dir,
            "products",
            image.ext,
            image.bytes,
        )?),
        None => None,
    };

    let product = queries::update_product(
        &conn,
        &path.offer_id,
        &existing.id,
        &input,
        image_path.as_deref(),
    )?
    .or_not_found("Product not found")?;

    if image_path.is_some() {
        uploads::remove_image(&state.upload_dir, &existing.image);
    }

    tracing::info!(staff = %ctx.staff.email, product = %product.id, "Updated product");
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(path): Path<ProductPath>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;
    let product = queries::get_product_in_offer(&conn, &path.offer_id, &path.product_id)?
        .or_not_found("Product not found")?;

    queries::delete_product(&conn, &path.offer_id, &product.id)?;
    uploads::remove_image(&state.upload_dir, &product.image);

    tracing::info!(staff = %ctx.staff.email, product = %product.id, "Deleted product");
    Ok(Json(serde_json::json!({ "success": true })))
}
