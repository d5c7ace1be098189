use chrono::Utc;
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{OFFER_COLS, PRODUCT_COLS, STAFF_COLS, query_all, query_one};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Escape LIKE wildcards in user input so substring filters match literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

// ============ Offers ============

/// Create an offer. The image path points at an already-stored upload.
pub fn create_offer(conn: &Connection, input: &OfferInput, image: &str) -> Result<Offer> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO offers (id, name, slug, description, image, state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            &input.name,
            &input.slug,
            &input.description,
            image,
            input.state.as_str(),
            now,
            now
        ],
    )?;

    Ok(Offer {
        id,
        name: input.name.clone(),
        slug: input.slug.clone(),
        description: input.description.clone(),
        image: image.to_string(),
        state: input.state,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_offer_by_id(conn: &Connection, id: &str) -> Result<Option<Offer>> {
    query_one(
        conn,
        &format!("SELECT {} FROM offers WHERE id = ?1", OFFER_COLS),
        &[&id],
    )
}

/// Check whether a slug is already used, optionally ignoring one offer
/// (the offer being updated).
pub fn slug_taken(conn: &Connection, slug: &str, exclude: Option<&str>) -> Result<bool> {
    let count: i64 = match exclude {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM offers WHERE slug = ?1 AND id != ?2",
            params![slug, id],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM offers WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )?,
    };
    Ok(count > 0)
}

/// List offers matching the filter, newest first, with the total for the
/// same filter.
pub fn list_offers(conn: &Connection, filter: &OfferFilter) -> Result<(Vec<Offer>, i64)> {
    // Helper to build filter params (avoids duplication between COUNT and SELECT)
    let build_filter_params = || -> Vec<Box<dyn rusqlite::ToSql>> {
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(state) = filter.state {
            params.push(Box::new(state.as_str().to_string()));
        }
        if let Some(ref name) = filter.name {
            params.push(Box::new(format!("%{}%", escape_like(name))));
        }
        if let Some(ref slug) = filter.slug {
            params.push(Box::new(format!("%{}%", escape_like(slug))));
        }
        params
    };

    let mut where_clause = String::from("WHERE 1=1");
    if filter.state.is_some() {
        where_clause.push_str(" AND state = ?");
    }
    if filter.name.is_some() {
        where_clause.push_str(" AND name LIKE ? ESCAPE '\\'");
    }
    if filter.slug.is_some() {
        where_clause.push_str(" AND slug LIKE ? ESCAPE '\\'");
    }

    let count_sql = format!("SELECT COUNT(*) FROM offers {}", where_clause);
    let filter_params = build_filter_params();
    let filter_refs: Vec<&dyn rusqlite::ToSql> = filter_params.iter().map(|b| b.as_ref()).collect();
    let total: i64 = conn.query_row(&count_sql, filter_refs.as_slice(), |row| row.get(0))?;

    let select_sql = format!(
        "SELECT {} FROM offers {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        OFFER_COLS, where_clause
    );
    let mut select_params = build_filter_params();
    select_params.push(Box::new(filter.limit()));
    select_params.push(Box::new(filter.offset()));
    let select_refs: Vec<&dyn rusqlite::ToSql> = select_params.iter().map(|b| b.as_ref()).collect();
    let items = query_all(conn, &select_sql, select_refs.as_slice())?;

    Ok((items, total))
}

/// Replace an offer's fields. The image only changes when a new file was
/// uploaded. Returns the updated offer, or None if not found.
pub fn update_offer(
    conn: &Connection,
    id: &str,
    input: &OfferInput,
    image: Option<&str>,
) -> Result<Option<Offer>> {
    match image {
        Some(image) => query_one(
            conn,
            &format!(
                "UPDATE offers SET name = ?1, slug = ?2, description = ?3, image = ?4, state = ?5, updated_at = ?6
                 WHERE id = ?7 RETURNING {}",
                OFFER_COLS
            ),
            params![
                &input.name,
                &input.slug,
                &input.description,
                image,
                input.state.as_str(),
                now(),
                id
            ],
        ),
        None => query_one(
            conn,
            &format!(
                "UPDATE offers SET name = ?1, slug = ?2, description = ?3, state = ?4, updated_at = ?5
                 WHERE id = ?6 RETURNING {}",
                OFFER_COLS
            ),
            params![
                &input.name,
                &input.slug,
                &input.description,
                input.state.as_str(),
                now(),
                id
            ],
        ),
    }
}

/// Delete an offer and every product that belongs to it.
/// Returns true if the offer existed.
pub fn delete_offer(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM products WHERE offer_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM offers WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

// ============ Products ============

/// Create a product under an offer. The caller has already checked that the
/// offer exists.
pub fn create_product(
    conn: &Connection,
    offer_id: &str,
    input: &ProductInput,
    image: &str,
) -> Result<Product> {
    let id = gen_id();
    let now = now();
    let price = canonical_price(input.price);

    conn.execute(
        "INSERT INTO products (id, offer_id, name, sku, image, price, state, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &id,
            offer_id,
            &input.name,
            &input.sku,
            image,
            price.to_string(),
            input.state.as_str(),
            now,
            now
        ],
    )?;

    Ok(Product {
        id,
        offer_id: offer_id.to_string(),
        name: input.name.clone(),
        sku: input.sku.clone(),
        image: image.to_string(),
        price,
        state: input.state,
        created_at: now,
        updated_at: now,
    })
}

/// Look up a product scoped to its offer, so nested routes 404 when the
/// product exists under a different offer.
pub fn get_product_in_offer(
    conn: &Connection,
    offer_id: &str,
    product_id: &str,
) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM products WHERE id = ?1 AND offer_id = ?2",
            PRODUCT_COLS
        ),
        &[&product_id, &offer_id],
    )
}

/// Check whether a SKU is already used, optionally ignoring one product
/// (the product being updated).
pub fn sku_taken(conn: &Connection, sku: &str, exclude: Option<&str>) -> Result<bool> {
    let count: i64 = match exclude {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM products WHERE sku = ?1 AND id != ?2",
            params![sku, id],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM products WHERE sku = ?1",
            params![sku],
            |row| row.get(0),
        )?,
    };
    Ok(count > 0)
}

/// Every product under an offer, newest first, for the back-office detail
/// view of the offer.
pub fn products_for_offer(conn: &Connection, offer_id: &str) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM products WHERE offer_id = ?1 ORDER BY created_at DESC, id DESC",
            PRODUCT_COLS
        ),
        &[&offer_id],
    )
}

pub fn list_products_paginated(
    conn: &Connection,
    offer_id: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Product>, i64)> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM products WHERE offer_id = ?1",
        params![offer_id],
        |row| row.get(0),
    )?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM products WHERE offer_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            PRODUCT_COLS
        ),
        params![offer_id, limit, offset],
    )?;
    Ok((items, total))
}

/// Stored image paths for every product under an offer, fetched before a
/// cascade delete so the files can be cleaned up afterwards.
pub fn product_images_for_offer(conn: &Connection, offer_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT image FROM products WHERE offer_id = ?1")?;
    let images = stmt
        .query_map(params![offer_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(images)
}

/// Replace a product's fields, scoped to its offer. The image only changes
/// when a new file was uploaded. Returns the updated product, or None if not
/// found under that offer.
pub fn update_product(
    conn: &Connection,
    offer_id: &str,
    product_id: &str,
    input: &ProductInput,
    image: Option<&str>,
) -> Result<Option<Product>> {
    let price = canonical_price(input.price).to_string();
    match image {
        Some(image) => query_one(
            conn,
            &format!(
                "UPDATE products SET name = ?1, sku = ?2, image = ?3, price = ?4, state = ?5, updated_at = ?6
                 WHERE id = ?7 AND offer_id = ?8 RETURNING {}",
                PRODUCT_COLS
            ),
            params![
                &input.name,
                &input.sku,
                image,
                price,
                input.state.as_str(),
                now(),
                product_id,
                offer_id
            ],
        ),
        None => query_one(
            conn,
            &format!(
                "UPDATE products SET name = ?1, sku = ?2, price = ?3, state = ?4, updated_at = ?5
                 WHERE id = ?6 AND offer_id = ?7 RETURNING {}",
                PRODUCT_COLS
            ),
            params![
                &input.name,
                &input.sku,
                price,
                input.state.as_str(),
                now(),
                product_id,
                offer_id
            ],
        ),
    }
}

pub fn delete_product(conn: &Connection, offer_id: &str, product_id: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM products WHERE id = ?1 AND offer_id = ?2",
        params![product_id, offer_id],
    )?;
    Ok(deleted > 0)
}

// ============ Staff ============

/// Generate a staff API key with vt_ prefix.
pub fn generate_staff_key() -> String {
    format!("vt_{}", Uuid::new_v4().to_string().replace("-", ""))
}

/// Hash a staff API key for storage and lookup.
pub fn hash_staff_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"vitrine-v1:");
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a staff member. Returns the record and the plaintext key, which is
/// shown once and never stored.
pub fn create_staff(conn: &Connection, input: &CreateStaff) -> Result<(Staff, String)> {
    let id = gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();
    let key = generate_staff_key();
    let key_hash = hash_staff_key(&key);

    conn.execute(
        "INSERT INTO staff (id, email, name, api_key_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, &email, &input.name, &key_hash, now],
    )?;

    Ok((
        Staff {
            id,
            email,
            name: input.name.clone(),
            api_key_hash: key_hash,
            created_at: now,
        },
        key,
    ))
}

pub fn get_staff_by_api_key(conn: &Connection, key: &str) -> Result<Option<Staff>> {
    let hash = hash_staff_key(key);
    query_one(
        conn,
        &format!("SELECT {} FROM staff WHERE api_key_hash = ?1", STAFF_COLS),
        &[&hash],
    )
}

pub fn count_staff(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM staff", [], |row| row.get(0))
        .map_err(Into::into)
}
