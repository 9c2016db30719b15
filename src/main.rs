use rusty_book_catalog::{
    adapters::{
        http::HttpRatingClient, memory::InMemoryBookRepository,
        postgres::PostgresBookRepository,
    },
    api::{AppState, create_router},
    application::book::ServiceDependencies,
    config::AppConfig,
    ports::BookRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_book_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // DATABASE_URLがなければインメモリストアで起動する
    let book_repository: Arc<dyn BookRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Using PostgreSQL book store");

            Arc::new(PostgresBookRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, books are kept in memory only");
            Arc::new(InMemoryBookRepository::new())
        }
    };

    let rating_service = Arc::new(HttpRatingClient::new(
        config.rating_service_url.clone(),
        config.rating_timeout,
    )?);

    tracing::info!(
        rating_service_url = %config.rating_service_url,
        rating_timeout_ms = config.rating_timeout.as_millis() as u64,
        "Rating service configured"
    );

    let service_deps = ServiceDependencies {
        book_repository,
        rating_service,
        rating_timeout: config.rating_timeout,
    };

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        csrf_cookie_secure: config.csrf_cookie_secure,
    });

    let app = create_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
