use axum::Router;
use clap::Parser;
use rust_decimal::Decimal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::config::Config;
use vitrine::db::{AppState, create_pool, init_db, queries};
use vitrine::handlers;
use vitrine::models::{CreateStaff, OfferInput, OfferState, ProductInput, ProductState};
use vitrine::uploads;

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Catalogue back-office with a public storefront feed")]
struct Cli {
    /// Seed the database with dev data (staff account, offers, products)
    #[arg(long)]
    seed: bool,

    /// Delete the database and uploads on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn bootstrap_first_staff(state: &AppState, email: &str) {
    let conn = state.db.get().expect("Failed to get db connection for bootstrap");

    let count = queries::count_staff(&conn).expect("Failed to count staff");
    if count > 0 {
        tracing::info!("Staff accounts already exist, skipping bootstrap");
        return;
    }

    let input = CreateStaff {
        email: email.to_string(),
        name: "Bootstrap Staff".to_string(),
    };
    let (staff, api_key) =
        queries::create_staff(&conn, &input).expect("Failed to create bootstrap staff");

    tracing::info!("============================================");
    tracing::info!("BOOTSTRAP STAFF CREATED");
    tracing::info!("Email: {}", staff.email);
    tracing::info!("API Key: {}", api_key);
    tracing::info!("============================================");
    tracing::info!("SAVE THIS API KEY - IT WILL NOT BE SHOWN AGAIN");
    tracing::info!("============================================");
}

/// Tiny inline SVG so seeded rows point at an image file that actually exists.
fn placeholder_svg(label: &str) -> Vec<u8> {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"320\" height=\"200\">\
         <rect width=\"100%\" height=\"100%\" fill=\"#e2e8f0\"/>\
         <text x=\"50%\" y=\"50%\" dominant-baseline=\"middle\" text-anchor=\"middle\" \
         font-family=\"sans-serif\" fill=\"#475569\">{}</text></svg>",
        label
    )
    .into_bytes()
}

/// Seeds the database with dev data for testing.
/// Creates a staff account plus offers and products covering every state,
/// so the public feed has something to filter right away.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    // Check if already seeded (any staff exist)
    let count = queries::count_staff(&conn).expect("Failed to count staff");
    if count > 0 {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    tracing::info!("============================================");
    tracing::info!("SEEDING DEV DATA");
    tracing::info!("============================================");

    // 1. Staff account
    let staff_input = CreateStaff {
        email: "dev@vitrine.local".to_string(),
        name: "Dev Staff".to_string(),
    };
    let (staff, staff_api_key) =
        queries::create_staff(&conn, &staff_input).expect("Failed to create dev staff");

    tracing::info!("Staff: {} ({})", staff.email, staff.name);
    tracing::info!("Staff API Key: {}", staff_api_key);
    tracing::info!("");

    let seed_image = |subdir: &str, label: &str| -> String {
        uploads::store_image(&state.upload_dir, subdir, "svg", &placeholder_svg(label))
            .expect("Failed to write seed image")
    };

    // 2. Published offer with one product per state
    let summer = queries::create_offer(
        &conn,
        &OfferInput {
            name: "Summer Essentials".to_string(),
            slug: "summer-essentials".to_string(),
            description: Some("Light pieces for warm days".to_string()),
            state: OfferState::Published,
        },
        &seed_image("offers", "Summer"),
    )
    .expect("Failed to create dev offer");

    let shirt = queries::create_product(
        &conn,
        &summer.id,
        &ProductInput {
            name: "Linen Shirt".to_string(),
            sku: "SUM-001".to_string(),
            price: Decimal::new(5990, 2),
            state: ProductState::Published,
        },
        &seed_image("products", "Shirt"),
    )
    .expect("Failed to create dev product");

    queries::create_product(
        &conn,
        &summer.id,
        &ProductInput {
            name: "Straw Hat".to_string(),
            sku: "SUM-002".to_string(),
            price: Decimal::new(2400, 2),
            state: ProductState::Draft,
        },
        &seed_image("products", "Hat"),
    )
    .expect("Failed to create dev product");

    queries::create_product(
        &conn,
        &summer.id,
        &ProductInput {
            name: "Canvas Tote".to_string(),
            sku: "SUM-003".to_string(),
            price: Decimal::new(3250, 2),
            state: ProductState::Invisible,
        },
        &seed_image("products", "Tote"),
    )
    .expect("Failed to create dev product");

    tracing::info!("Offer: {} ({}, id: {})", summer.name, summer.state.as_str(), summer.id);
    tracing::info!("  3 products: published, draft, invisible");

    // 3. Draft offer, stays out of the public feed even with a published product
    let autumn = queries::create_offer(
        &conn,
        &OfferInput {
            name: "Autumn Lookbook".to_string(),
            slug: "autumn-lookbook".to_string(),
            description: None,
            state: OfferState::Draft,
        },
        &seed_image("offers", "Autumn"),
    )
    .expect("Failed to create dev offer");

    queries::create_product(
        &conn,
        &autumn.id,
        &ProductInput {
            name: "Wool Scarf".to_string(),
            sku: "AUT-001".to_string(),
            price: Decimal::new(4500, 2),
            state: ProductState::Published,
        },
        &seed_image("products", "Scarf"),
    )
    .expect("Failed to create dev product");

    tracing::info!("Offer: {} ({}, id: {})", autumn.name, autumn.state.as_str(), autumn.id);

    // 4. Hidden offer
    let winter = queries::create_offer(
        &conn,
        &OfferInput {
            name: "Winter Archive".to_string(),
            slug: "winter-archive".to_string(),
            description: Some("Last season, kept for reference".to_string()),
            state: OfferState::Hidden,
        },
        &seed_image("offers", "Winter"),
    )
    .expect("Failed to create dev offer");

    queries::create_product(
        &conn,
        &winter.id,
        &ProductInput {
            name: "Down Jacket".to_string(),
            sku: "WIN-001".to_string(),
            price: Decimal::new(18999, 2),
            state: ProductState::Published,
        },
        &seed_image("products", "Jacket"),
    )
    .expect("Failed to create dev product");

    tracing::info!("Offer: {} ({}, id: {})", winter.name, winter.state.as_str(), winter.id);

    // 5. Published offer whose products are all unpublished, shows up empty
    let spring = queries::create_offer(
        &conn,
        &OfferInput {
            name: "Spring Preview".to_string(),
            slug: "spring-preview".to_string(),
            description: None,
            state: OfferState::Published,
        },
        &seed_image("offers", "Spring"),
    )
    .expect("Failed to create dev offer");

    queries::create_product(
        &conn,
        &spring.id,
        &ProductInput {
            name: "Rain Poncho".to_string(),
            sku: "SPR-001".to_string(),
            price: Decimal::new(3900, 2),
            state: ProductState::Draft,
        },
        &seed_image("products", "Poncho"),
    )
    .expect("Failed to create dev product");

    tracing::info!("Offer: {} ({}, id: {})", spring.name, spring.state.as_str(), spring.id);
    tracing::info!("");

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED SUCCESSFULLY");
    tracing::info!("============================================");

    // Print the seeded credentials copy-paste friendly, outside the log format
    println!();
    println!("--- COPY FROM HERE ---");
    println!("  staff_api_key: {}", staff_api_key);
    println!("  offer_id: {}", summer.id);
    println!("  product_id: {}", shirt.id);
    println!("--- END COPY ---");
    println!();
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    // Create the database connection pool
    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");

    // Initialize the database schema
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        upload_dir: config.upload_dir.clone(),
    };

    // Seed dev data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set VITRINE_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    // Bootstrap first staff account if configured (fallback for non-seed usage)
    if let Some(ref email) = config.bootstrap_staff_email {
        bootstrap_first_staff(&state, email);
    }

    // Build the application router
    let app = Router::new()
        // Public storefront endpoints (no auth)
        .merge(handlers::public::router())
        // Back-office API (staff key auth)
        .merge(handlers::admin::router(state.clone()))
        // Uploaded images are served as plain static files
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Track if we should clean up on exit
    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();
    let upload_dir = config.upload_dir.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database and uploads will be deleted on exit");
    }

    tracing::info!("Vitrine server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    // Cleanup on exit if ephemeral mode
    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral data...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        // Also remove WAL and SHM files if they exist
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
        if upload_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&upload_dir) {
                tracing::warn!("Failed to remove {}: {}", upload_dir.display(), e);
            } else {
                tracing::info!("Removed {}", upload_dir.display());
            }
        }
        tracing::info!("Ephemeral cleanup complete");
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
