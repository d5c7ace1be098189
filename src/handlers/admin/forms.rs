//! Multipart form decoding and validation for the back-office write
//! endpoints.
//!
//! Offers and products arrive as multipart form data: text fields plus an
//! optional `image` file part. Validation accumulates every failing field
//! into one response instead of stopping at the first, and uniqueness checks
//! run here so a duplicate slug or sku reports like any other field problem.

use std::collections::HashMap;

use axum::body::Bytes;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::queries;
use crate::error::{AppError, FieldError, Result};
use crate::extractors::Multipart;
use crate::models::{OfferInput, OfferState, ProductInput, ProductState, is_url_safe_slug};
use crate::uploads::{MAX_IMAGE_BYTES, extension_for};

/// Longest accepted value for single-line string fields.
const MAX_STRING_CHARS: usize = 255;

/// A decoded multipart form: text fields plus at most one image file.
pub(super) struct FormData {
    fields: HashMap<String, String>,
    image: Option<UploadedImage>,
}

struct UploadedImage {
    bytes: Bytes,
    content_type: Option<String>,
}

/// An image that passed validation, ready to be stored.
#[derive(Debug)]
pub(super) struct ValidImage<'a> {
    pub bytes: &'a [u8],
    pub ext: &'static str,
}

impl FormData {
    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Drain a multipart request into text fields and the image part.
pub(super) async fn read_form(multipart: Multipart) -> Result<FormData> {
    let Multipart(mut multipart) = multipart;
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        if name == "image" {
            let content_type = field.content_type().map(String::from);
            let bytes = field.bytes().await?;
            // Browsers submit an empty file part when nothing was picked
            if !bytes.is_empty() {
                image = Some(UploadedImage {
                    bytes,
                    content_type,
                });
            }
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    Ok(FormData { fields, image })
}

fn required_string(
    form: &FormData,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(value) = form.text(field) else {
        errors.push(FieldError::new(field, format!("{} is required", field)));
        return None;
    };
    if value.chars().count() > MAX_STRING_CHARS {
        errors.push(FieldError::new(
            field,
            format!(
                "{} may not be longer than {} characters",
                field, MAX_STRING_CHARS
            ),
        ));
        return None;
    }
    Some(value.to_string())
}

/// Like [`required_string`], but absence is fine.
fn optional_string(
    form: &FormData,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = form.text(field)?;
    if value.chars().count() > MAX_STRING_CHARS {
        errors.push(FieldError::new(
            field,
            format!(
                "{} may not be longer than {} characters",
                field, MAX_STRING_CHARS
            ),
        ));
        return None;
    }
    Some(value.to_string())
}

fn validate_image<'a>(
    form: &'a FormData,
    required: bool,
    errors: &mut Vec<FieldError>,
) -> Option<ValidImage<'a>> {
    let upload = match &form.image {
        Some(upload) => upload,
        None => {
            if required {
                errors.push(FieldError::new("image", "image is required"));
            }
            return None;
        }
    };
    let Some(ext) = upload.content_type.as_deref().and_then(extension_for) else {
        errors.push(FieldError::new(
            "image",
            "image must be a jpeg, png, gif, webp or svg file",
        ));
        return None;
    };
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        errors.push(FieldError::new(
            "image",
            "image may not be larger than 2048 kilobytes",
        ));
        return None;
    }
    Some(ValidImage {
        bytes: &upload.bytes,
        ext,
    })
}

// ============ Offers ============

struct OfferFields<'a> {
    name: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    state: Option<OfferState>,
    image: Option<ValidImage<'a>>,
    errors: Vec<FieldError>,
}

fn collect_offer<'a>(
    conn: &Connection,
    form: &'a FormData,
    image_required: bool,
    exclude: Option<&str>,
) -> Result<OfferFields<'a>> {
    let mut errors = Vec::new();

    let name = required_string(form, "name", &mut errors);

    let slug = match required_string(form, "slug", &mut errors) {
        Some(slug) if !is_url_safe_slug(&slug) => {
            errors.push(FieldError::new(
                "slug",
                "slug may only contain lowercase letters, digits, hyphens and underscores",
            ));
            None
        }
        Some(slug) => {
            if queries::slug_taken(conn, &slug, exclude)? {
                errors.push(FieldError::new("slug", "slug is already taken"));
                None
            } else {
                Some(slug)
            }
        }
        None => None,
    };

    let description = optional_string(form, "description", &mut errors);

    let state = match form.text("state") {
        None => {
            errors.push(FieldError::new("state", "state is required"));
            None
        }
        Some(raw) => match raw.parse::<OfferState>() {
            Ok(state) => Some(state),
            Err(()) => {
                errors.push(FieldError::new(
                    "state",
                    format!("state must be {}", OfferState::expected()),
                ));
                None
            }
        },
    };

    let image = validate_image(form, image_required, &mut errors);

    Ok(OfferFields {
        name,
        slug,
        description,
        state,
        image,
        errors,
    })
}

/// Validate a create form. The image is mandatory.
pub(super) fn offer_create_input<'a>(
    conn: &Connection,
    form: &'a FormData,
) -> Result<(OfferInput, ValidImage<'a>)> {
    let fields = collect_offer(conn, form, true, None)?;
    match (fields.name, fields.slug, fields.state, fields.image) {
        (Some(name), Some(slug), Some(state), Some(image)) if fields.errors.is_empty() => Ok((
            OfferInput {
                name,
                slug,
                description: fields.description,
                state,
            },
            image,
        )),
        _ => Err(AppError::Validation(fields.errors)),
    }
}

/// Validate an update form. The image is optional and the slug uniqueness
/// check ignores the offer being updated.
pub(super) fn offer_update_input<'a>(
    conn: &Connection,
    form: &'a FormData,
    offer_id: &str,
) -> Result<(OfferInput, Option<ValidImage<'a>>)> {
    let fields = collect_offer(conn, form, false, Some(offer_id))?;
    match (fields.name, fields.slug, fields.state) {
        (Some(name), Some(slug), Some(state)) if fields.errors.is_empty() => Ok((
            OfferInput {
                name,
                slug,
                description: fields.description,
                state,
            },
            fields.image,
        )),
        _ => Err(AppError::Validation(fields.errors)),
    }
}

// ============ Products ============

struct ProductFields<'a> {
    name: Option<String>,
    sku: Option<String>,
    price: Option<Decimal>,
    state: Option<ProductState>,
    image: Option<ValidImage<'a>>,
    errors: Vec<FieldError>,
}

fn collect_product<'a>(
    conn: &Connection,
    form: &'a FormData,
    image_required: bool,
    exclude: Option<&str>,
) -> Result<ProductFields<'a>> {
    let mut errors = Vec::new();

    let name = required_string(form, "name", &mut errors);

    let sku = match required_string(form, "sku", &mut errors) {
        Some(sku) => {
            if queries::sku_taken(conn, &sku, exclude)? {
                errors.push(FieldError::new("sku", "sku is already taken"));
                None
            } else {
                Some(sku)
            }
        }
        None => None,
    };

    let price = match form.text("price") {
        None => {
            errors.push(FieldError::new("price", "price is required"));
            None
        }
        Some(raw) => match raw.parse::<Decimal>() {
            Err(_) => {
                errors.push(FieldError::new("price", "price must be a number"));
                None
            }
            Ok(price) if price < Decimal::ZERO => {
                errors.push(FieldError::new("price", "price may not be negative"));
                None
            }
            Ok(price) if price.scale() > 2 => {
                errors.push(FieldError::new(
                    "price",
                    "price may not have more than 2 decimal places",
                ));
                None
            }
            Ok(price) => Some(price),
        },
    };

    let state = match form.text("state") {
        None => {
            errors.push(FieldError::new("state", "state is required"));
            None
        }
        Some(raw) => match raw.parse::<ProductState>() {
            Ok(state) => Some(state),
            Err(()) => {
                errors.push(FieldError::new(
                    "state",
                    format!("state must be {}", ProductState::expected()),
                ));
                None
            }
        },
    };

    let image = validate_image(form, image_required, &mut errors);

    Ok(ProductFields {
        name,
        sku,
        price,
        state,
        image,
        errors,
    })
}

/// Validate a create form. The image is mandatory.
pub(super) fn product_create_input<'a>(
    conn: &Connection,
    form: &'a FormData,
) -> Result<(ProductInput, ValidImage<'a>)> {
    let fields = collect_product(conn, form, true, None)?;
    match (
        fields.name,
        fields.sku,
        fields.price,
        fields.state,
        fields.image,
    ) {
        (Some(name), Some(sku), Some(price), Some(state), Some(image))
            if fields.errors.is_empty() =>
        {
            Ok((
                ProductInput {
                    name,
                    sku,
                    price,
                    state,
                },
                image,
            ))
        }
        _ => Err(AppError::Validation(fields.errors)),
    }
}

/// Validate an update form. The image is optional and the sku uniqueness
/// check ignores the product being updated.
pub(super) fn product_update_input<'a>(
    conn: &Connection,
    form: &'a FormData,
    product_id: &str,
) -> Result<(ProductInput, Option<ValidImage<'a>>)> {
    let fields = collect_product(conn, form, false, Some(product_id))?;
    match (fields.name, fields.sku, fields.price, fields.state) {
        (Some(name), Some(sku), Some(price), Some(state)) if fields.errors.is_empty() => Ok((
            ProductInput {
                name,
                sku,
                price,
                state,
            },
            fields.image,
        )),
        _ => Err(AppError::Validation(fields.errors)),
    }
}
