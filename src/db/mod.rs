pub(crate) mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::path::PathBuf;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Catalogue database pool (offers, products, staff)
    pub db: DbPool,
    /// Root directory where uploaded images are stored
    pub upload_dir: PathBuf,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    // Cascade from offers to products relies on foreign keys, which SQLite
    // enforces per connection.
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    Pool::builder().max_size(10).build(manager)
}
