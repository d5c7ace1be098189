use serde::{Deserialize, Serialize};

/// Publication state of an offer.
///
/// A closed set, persisted as its lowercase string value. Only `Published`
/// makes an offer eligible for the public catalogue; `Draft` and `Hidden`
/// behave identically there and exist to distinguish "not ready yet" from
/// "withdrawn" in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferState {
    Draft,
    Published,
    Hidden,
}

impl OfferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Hidden => "hidden",
        }
    }

    /// Accepted values, for validation messages.
    pub fn expected() -> &'static str {
        "draft, published or hidden"
    }
}

impl std::str::FromStr for OfferState {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "hidden" => Ok(Self::Hidden),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sellable bundle, the top-level catalogue entry.
///
/// Serialized as-is in back-office responses; the public catalogue exposes
/// the reduced `catalogue::OfferView` projection instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Relative path of the stored image, e.g. `offers/<uuid>.jpg`.
    pub image: String,
    pub state: OfferState,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated write payload for an offer. Creates and updates share the same
/// shape: an update replaces every text field, while the image travels as a
/// separate multipart file part and is only replaced when a new file arrives.
#[derive(Debug, Clone)]
pub struct OfferInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub state: OfferState,
}

/// Query parameters for the back-office offer list.
///
/// `state` matches exactly; `name` and `slug` are substring matches.
#[derive(Debug, Default, Deserialize)]
pub struct OfferFilter {
    pub state: Option<OfferState>,
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl OfferFilter {
    pub fn limit(&self) -> i64 {
        crate::pagination::clamp_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        crate::pagination::clamp_offset(self.offset)
    }
}

/// Slugs must be usable verbatim in URLs: lowercase ASCII letters, digits,
/// hyphens and underscores only.
pub fn is_url_safe_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
