use std::str::FromStr;
use std::sync::Arc;

use reiseblog::{
    AppState, CredentialState, CredentialStore, RepositoryState, S3StorageClient,
    SqliteRepository, StorageState, TemplateRegistry, TemplateState,
    config::{AppConfig, Env},
    create_router, repository,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The asynchronous entry point: configuration, logging, database, credential
/// seed, storage, and the HTTP server, in that order.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter setup. RUST_LOG wins; defaults cover local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reiseblog=debug,tower_http=info,axum=trace".into());

    // 3. Log format per environment: pretty for humans, JSON for aggregators.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database initialization (SQLite). Foreign keys are enforced so a
    // content row can never reference a missing post.
    let connect_options = SqliteConnectOptions::from_str(&config.db_url)
        .expect("FATAL: DATABASE_URL is not a valid sqlite URL")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .expect("FATAL: Failed to open the SQLite database. Check DATABASE_URL.");

    repository::init_schema(&pool)
        .await
        .expect("FATAL: Failed to initialize the database schema.");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;

    // 5. Credential seed. The user list is read-only and loaded exactly once.
    let credentials = Arc::new(
        CredentialStore::from_file(&config.users_file)
            .unwrap_or_else(|e| panic!("FATAL: Failed to load {}: {e}", config.users_file)),
    ) as CredentialState;
    tracing::info!("Loaded {} seeded users", credentials.len());

    // 6. Storage initialization (R2/MinIO via the S3 API).
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // LOCAL-ONLY: provision the MinIO bucket for the Dockerized setup.
    if config.env == Env::Local {
        use reiseblog::storage::StorageService;
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    // 7. Template registry: fixed dispatch table, built once.
    let templates = Arc::new(TemplateRegistry::new()) as TemplateState;

    // 8. Unified state assembly and server startup.
    let app_state = AppState {
        repo,
        storage,
        credentials,
        templates,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
