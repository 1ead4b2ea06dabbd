use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomkeeper::infrastructure::AppState;
use roomkeeper::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomkeeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    if config.seed_global_amenities {
        if let Err(e) = seed::seed_global_amenities(&db).await {
            tracing::error!("Failed to seed global amenities: {}", e);
        }
    }

    tracing::info!(
        storage = ?config.storage,
        min_rooms = config.publish_policy.min_rooms,
        "Starting roomkeeper"
    );

    let state = AppState::new(db, &config);
    let app = server::build_router(state, &config);

    server::serve(app, config.port)
        .await
        .expect("Failed to start server");
}
