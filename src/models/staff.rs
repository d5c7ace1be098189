use serde::{Deserialize, Serialize};

/// A back-office actor. Staff authenticate with a bearer API key whose
/// SHA-256 hash is stored here; the key itself is shown once at creation
/// and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaff {
    pub email: String,
    pub name: String,
}
