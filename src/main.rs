use actix_web::{App, HttpServer, middleware::Logger, web};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicer::{
  adapters::http::{ApiDependencies, RequestIdMiddleware, configure_api_routes},
  domain::backup::{BackupService, DatasetRepository},
  domain::invoice::{
    InvoiceService, InvoiceServiceConfig, InvoiceServiceDependencies,
    ports::{ClientRepository, InvoiceRepository, SettingsRepository},
  },
  infrastructure::{
    config::{Config, DatabaseConfig, StorageBackend},
    notifications::WebhookNotificationGateway,
    persistence::{
      InMemoryDatabase,
      postgres::{
        PostgresClientRepository, PostgresDatasetRepository, PostgresInvoiceRepository,
        PostgresSettingsRepository,
      },
    },
  },
};

/// Storage adapters behind the repository ports.
struct Repositories {
  clients: Arc<dyn ClientRepository>,
  invoices: Arc<dyn InvoiceRepository>,
  settings: Arc<dyn SettingsRepository>,
  dataset: Arc<dyn DatasetRepository>,
}

impl Repositories {
  fn in_memory() -> Self {
    let db = Arc::new(InMemoryDatabase::new());
    Self {
      clients: db.clone(),
      invoices: db.clone(),
      settings: db.clone(),
      dataset: db,
    }
  }

  fn postgres(pool: PgPool) -> Self {
    Self {
      clients: Arc::new(PostgresClientRepository::new(pool.clone())),
      invoices: Arc::new(PostgresInvoiceRepository::new(pool.clone())),
      settings: Arc::new(PostgresSettingsRepository::new(pool.clone())),
      dataset: Arc::new(PostgresDatasetRepository::new(pool)),
    }
  }
}

async fn connect_database(database: &DatabaseConfig) -> std::io::Result<PgPool> {
  tracing::info!("Connecting to database");

  let db_pool = tokio::time::timeout(
    Duration::from_secs(database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(database.max_connections)
      .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
      .connect(&database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      database.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Database connection timed out after {} seconds",
        database.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    match e {
      sqlx::Error::Io(_) => std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Could not connect to database. Is PostgreSQL running?",
      ),
      _ => std::io::Error::other(format!("Database error: {}", e)),
    }
  })?;

  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .map_err(|e| std::io::Error::other(format!("Failed to run database migrations: {}", e)))?;
  tracing::info!("Database migrations completed");

  Ok(db_pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoicer=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting invoicer");

  let config = Config::load().expect("Failed to load configuration");
  tracing::info!(backend = ?config.storage.backend, "Configuration loaded successfully");

  let repositories = match (config.storage.backend, &config.database) {
    (StorageBackend::Postgres, Some(database)) => {
      Repositories::postgres(connect_database(database).await?)
    }
    (StorageBackend::Postgres, None) => {
      return Err(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "storage.backend = \"postgres\" requires a [database] section",
      ));
    }
    (StorageBackend::Memory, _) => {
      tracing::warn!("Using in-memory storage; data is lost on restart");
      Repositories::in_memory()
    }
  };

  let notifier = Arc::new(
    WebhookNotificationGateway::new(config.notifications.timeout())
      .map_err(|e| std::io::Error::other(e.to_string()))?,
  );

  let invoice_service = Arc::new(InvoiceService::new(
    InvoiceServiceDependencies {
      client_repo: repositories.clients,
      invoice_repo: repositories.invoices,
      settings_repo: repositories.settings,
      notifier,
    },
    InvoiceServiceConfig {
      notification_timeout: config.notifications.timeout(),
      default_payment_days: config.invoicing.default_payment_days,
    },
  ));
  let backup_service = Arc::new(BackupService::new(repositories.dataset));

  let api = ApiDependencies::new(invoice_service, backup_service);

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let api = api.clone();
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .service(web::scope("/api/v1").configure(|cfg| configure_api_routes(cfg, api)))
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await
}
