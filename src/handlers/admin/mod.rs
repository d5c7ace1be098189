mod forms;
mod offers;
mod products;

pub use offers::*;
pub use products::*;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::staff_auth;

/// Multipart bodies may carry a 2048 KB image plus text fields and framing.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/offers", get(list_offers))
        .route("/admin/offers", post(create_offer))
        .route("/admin/offers/{offer_id}", get(get_offer))
        .route("/admin/offers/{offer_id}", put(update_offer))
        .route("/admin/offers/{offer_id}", delete(delete_offer))
        .route("/admin/offers/{offer_id}/products", get(list_products))
        .route("/admin/offers/{offer_id}/products", post(create_product))
        .route(
            "/admin/offers/{offer_id}/products/{product_id}",
            get(get_product),
        )
        .route(
            "/admin/offers/{offer_id}/products/{product_id}",
            put(update_product),
        )
        .route(
            "/admin/offers/{offer_id}/products/{product_id}",
            delete(delete_product),
        )
        .layer(middleware::from_fn_with_state(state.clone(), staff_auth))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
