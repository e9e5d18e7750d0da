use rusty_library_loans::{
    adapters::postgres::{
        PostgresBookRepository, PostgresBorrowerRepository, PostgresBranchRepository,
        PostgresTransactionManager, database,
    },
    api::{handlers::AppState, router::create_router},
    application::borrowing::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool
    let pool = database::connect(&config).await?;
    database::run_migrations(&pool).await?;

    // Initialize adapters
    let service_deps = ServiceDependencies {
        transactions: Arc::new(PostgresTransactionManager::new(pool.clone())),
        borrowers: Arc::new(PostgresBorrowerRepository::new(pool.clone())),
        books: Arc::new(PostgresBookRepository::new(pool.clone())),
        branches: Arc::new(PostgresBranchRepository::new(pool)),
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
