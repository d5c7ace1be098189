use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result};
use crate::extractors::{Json, Multipart, Path, Query};
use crate::middleware::StaffContext;
use crate::models::{Offer, OfferFilter, Product};
use crate::pagination::Paginated;
use crate::uploads;

use super::forms;

#[derive(serde::Deserialize)]
pub struct OfferPath {
    pub offer_id: String,
}

/// Detail view: the offer with its unfiltered product list, all states.
#[derive(serde::Serialize)]
pub struct OfferDetail {
    #[serde(flatten)]
    pub offer: Offer,
    pub products: Vec<Product>,
}

pub async fn list_offers(
    State(state): State<AppState>,
    Query(filter): Query<OfferFilter>,
) -> Result<Json<Paginated<Offer>>> {
    let conn = state.db.get()?;
    let (items, total) = queries::list_offers(&conn, &filter)?;
    Ok(Json(Paginated::new(
        items,
        total,
        filter.limit(),
        filter.offset(),
    )))
}

pub async fn create_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    multipart: Multipart,
) -> Result<Json<Offer>> {
    let conn = state.db.get()?;
    let form = forms::read_form(multipart).await?;
    let (input, image) = forms::offer_create_input(&conn, &form)?;

    let image_path = uploads::store_image(&state.upload_dir, "offers", image.ext, image.bytes)?;
    let offer = queries::create_offer(&conn, &input, &image_path)?;

    tracing::info!(staff = %ctx.staff.email, offer = %offer.id, slug = %offer.slug, "Created offer");
    Ok(Json(offer))
}

pub async fn get_offer(
    State(state): State<AppState>,
    Path(path): Path<OfferPath>,
) -> Result<Json<OfferDetail>> {
    let conn = state.db.get()?;
    let offer = queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;
    let products = queries::products_for_offer(&conn, &offer.id)?;
    Ok(Json(OfferDetail { offer, products }))
}

pub async fn update_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(path): Path<OfferPath>,
    multipart: Multipart,
) -> Result<Json<Offer>> {
    let conn = state.db.get()?;
    let existing =
        queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;

    let form = forms::read_form(multipart).await?;
    let (input, image) = forms::offer_update_input(&conn, &form, &existing.id)?;

    let image_path = match image {
        Some(image) => Some(uploads::store_image(
            &state.upload_dir,
            "offers",
            image.ext,
            image.bytes,
        )?),
        None => None,
    };

    let offer = queries::update_offer(&conn, &existing.id, &input, image_path.as_deref())?
        .or_not_found("Offer not found")?;

    if image_path.is_some() {
        uploads::remove_image(&state.upload_dir, &existing.image);
    }

    tracing::info!(staff = %ctx.staff.email, offer = %offer.id, "Updated offer");
    Ok(Json(offer))
}

pub async fn delete_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(path): Path<OfferPath>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.db.get()?;
    let offer = queries::get_offer_by_id(&conn, &path.offer_id)?.or_not_found("Offer not found")?;
    let product_images = queries::product_images_for_offer(&conn, &offer.id)?;

    queries::delete_offer(&mut conn, &offer.id)?;

    uploads::remove_image(&state.upload_dir, &offer.image);
    for image in &product_images {
        uploads::remove_image(&state.upload_dir, image);
    }

    tracing::info!(staff = %ctx.staff.email, offer = %offer.id, "Deleted offer");
    Ok(Json(serde_json::json!({ "success": true })))
}
