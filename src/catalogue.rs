//! The public catalogue view.
//!
//! [`published_offers`] is the only sanctioned read path for public
//! consumption and the only place that combines offer and product states.
//! Back-office listings use the unfiltered accessors in
//! [`crate::db::queries`] so the two can never drift apart.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::from_row::{OFFER_COLS, PRODUCT_COLS, query_all};
use crate::error::Result;
use crate::models::{Offer, OfferState, Product, ProductState};

/// Public projection of an offer, carrying only its visible products.
#[derive(Debug, PartialEq, Serialize)]
pub struct OfferView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: String,
    pub state: OfferState,
    pub products: Vec<ProductView>,
}

/// Public projection of a product.
#[derive(Debug, PartialEq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub image: String,
    pub price: Decimal,
    pub state: ProductState,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        ProductView {
            id: product.id,
            name: product.name,
            sku: product.sku,
            image: product.image,
            price: product.price,
            state: product.state,
        }
    }
}

/// Compute the publicly visible catalogue.
///
/// Published offers only, each carrying only its published products. The two
/// states are filtered independently: an offer that is not published is
/// excluded entirely no matter what its products look like, and a published
/// offer whose products are all unpublished is still returned, with an empty
/// product list.
///
/// Offers are ordered by creation time (id as tiebreak) so repeated calls
/// over unchanged data return identical sequences.
pub fn published_offers(conn: &Connection) -> Result<Vec<OfferView>> {
    let published = OfferState::Published.as_str();
    let offers: Vec<Offer> = query_all(
        conn,
        &format!(
            "SELECT {} FROM offers WHERE state = ?1 ORDER BY created_at, id",
            OFFER_COLS
        ),
        &[&published],
    )?;

    if offers.is_empty() {
        return Ok(vec![]);
    }

    // Batch fetch the published products for all selected offers in one query
    let offer_ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
    let placeholders: Vec<String> = (2..=offer_ids.len() + 1)
        .map(|i| format!("?{}", i))
        .collect();
    let sql = format!(
        "SELECT {} FROM products WHERE state = ?1 AND offer_id IN ({}) ORDER BY created_at, id",
        PRODUCT_COLS,
        placeholders.join(", ")
    );

    let published = ProductState::Published.as_str();
    let mut params: Vec<&dyn rusqlite::ToSql> = vec![&published];
    params.extend(offer_ids.iter().map(|id| id as &dyn rusqlite::ToSql));
    let products: Vec<Product> = query_all(conn, &sql, params.as_slice())?;

    // Group products by offer_id
    let mut by_offer: HashMap<String, Vec<ProductView>> = HashMap::new();
    for product in products {
        by_offer
            .entry(product.offer_id.clone())
            .or_default()
            .push(ProductView::from(product));
    }

    Ok(offers
        .into_iter()
        .map(|offer| {
            let products = by_offer.remove(&offer.id).unwrap_or_default();
            OfferView {
                id: offer.id,
                name: offer.name,
                slug: offer.slug,
                description: offer.description,
                image: offer.image,
                state: offer.state,
                products,
            }
        })
        .collect())
}
