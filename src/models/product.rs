use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Publication state of a product, independent of its parent offer's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductState {
    Draft,
    Published,
    Invisible,
}

impl ProductState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Invisible => "invisible",
        }
    }

    /// Accepted values, for validation messages.
    pub fn expected() -> &'static str {
        "draft, published or invisible"
    }
}

impl std::str::FromStr for ProductState {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "invisible" => Ok(Self::Invisible),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ProductState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An item sold within exactly one offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub offer_id: String,
    pub name: String,
    pub sku: String,
    /// Relative path of the stored image, e.g. `products/<uuid>.png`.
    pub image: String,
    /// Canonical price with exactly two fractional digits. Serialized as a
    /// string (`"19.90"`) so no precision is lost in JSON.
    pub price: Decimal,
    pub state: ProductState,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated write payload for a product. Creates and updates share the same
/// shape: an update replaces every field, while the image travels as a
/// separate multipart file part and is only replaced when a new file arrives.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub state: ProductState,
}

/// Pin a validated price to exactly two fractional digits so `12` persists
/// and serializes as `12.00`. Callers must have checked `scale() <= 2`;
/// rescaling then only pads zeros and never rounds.
pub fn canonical_price(price: Decimal) -> Decimal {
    let mut canonical = price;
    canonical.rescale(2);
    canonical
}
