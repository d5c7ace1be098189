use axum::extract::State;

use crate::catalogue::{self, OfferView};
use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;

/// The public catalogue: a plain JSON array of published offers, each with
/// its published products.
pub async fn list_published_offers(State(state): State<AppState>) -> Result<Json<Vec<OfferView>>> {
    let conn = state.db.get()?;
    let offers = catalogue::published_offers(&conn)?;
    Ok(Json(offers))
}
