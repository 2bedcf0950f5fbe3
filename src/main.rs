use content_portal::{
    AppState, auth,
    config::{AppConfig, Env},
    create_router,
    models::NewUser,
    repository::{PostgresRepository, RepositoryState},
    storage::{S3StorageClient, StorageState},
    validate,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// seed_admin
///
/// Ensures the configured admin account exists. Runs once at startup, only
/// when both ADMIN_EMAIL and ADMIN_PASSWORD are set, and is idempotent: an
/// existing account with the seed email is left untouched. The seeded user
/// carries the staff/superuser flags and not the author flag.
async fn seed_admin(repo: &RepositoryState, config: &AppConfig) {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return;
    };

    let email = validate::normalize_email(email);
    if repo.find_user_by_email(&email).await.is_some() {
        tracing::info!(%email, "admin user already exists, skipping seed");
        return;
    }

    let password_hash = match auth::hash_password(password) {
        Ok(hash) => hash,
        Err(_) => {
            tracing::error!("admin seed skipped: could not hash configured password");
            return;
        }
    };

    let admin = NewUser {
        email: email.clone(),
        password_hash,
        full_name: "Portal Admin".to_string(),
        phone: "0000000000".to_string(),
        address: None,
        city: None,
        state: None,
        country: None,
        pincode: "000000".to_string(),
        is_staff: true,
        is_superuser: true,
        is_author: false,
    };

    match repo.create_user(admin).await {
        Ok(user) => tracing::info!(user_id = %user.id, %email, "admin user seeded"),
        Err(e) => tracing::error!("admin seed failed: {:?}", e),
    }
}

/// main
///
/// Asynchronous entry point: configuration, logging, database, migrations,
/// storage, admin seed, and the HTTP server, in that order.
#[tokio::main]
async fn main() {
    // Configuration and environment loading (fail-fast on missing secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // Log filter: RUST_LOG wins, with sensible local defaults otherwise.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "content_portal=debug,tower_http=info,axum=trace".into());

    // Pretty output locally, JSON for log aggregation in production.
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

    // Database pool and schema migrations.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: database migrations failed");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // Object storage for PDF documents.
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // Local-only convenience: provision the MinIO bucket on startup.
    if config.env == Env::Local {
        use content_portal::storage::StorageService;
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    seed_admin(&repo, &config).await;

    let app_state = AppState {
        repo,
        storage,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
