use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        -- Offers (sellable bundles, the top-level catalogue entries)
        -- state is the publication state, stored as its string value
        CREATE TABLE IF NOT EXISTS offers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            image TEXT NOT NULL,
            state TEXT NOT NULL CHECK (state IN ('draft', 'published', 'hidden')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_offers_state ON offers(state);

        -- Products (items belonging to exactly one offer)
        -- price is the canonical decimal string with two fractional digits
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            offer_id TEXT NOT NULL REFERENCES offers(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            sku TEXT NOT NULL UNIQUE,
            image TEXT NOT NULL,
            price TEXT NOT NULL,
            state TEXT NOT NULL CHECK (state IN ('draft', 'published', 'invisible')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_products_offer ON products(offer_id);
        CREATE INDEX IF NOT EXISTS idx_products_offer_state ON products(offer_id, state);

        -- Staff (back-office actors; api_key_hash is the SHA-256 of the key)
        CREATE TABLE IF NOT EXISTS staff (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            api_key_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );
        "#,
    )
}
