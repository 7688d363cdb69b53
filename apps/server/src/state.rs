//! Shared application state

use crate::{
    auth::AuthManager,
    config::{Config, DatabaseConfig, StorageBackend},
    db::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore},
    services::{ClinicService, DoctorService, HealthServiceService, Services},
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct AppStateOptions {
    /// Overrides `database.run_migrations` when set.
    pub run_migrations: Option<bool>,
    /// Overrides `database.backend` when set (tests force `Memory`).
    pub backend: Option<StorageBackend>,
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthManager>,
    pub store: Arc<dyn DocumentStore>,
    pub clinic_service: Arc<ClinicService>,
    pub doctor_service: Arc<DoctorService>,
    pub health_service_service: Arc<HealthServiceService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        Self::new_with_options(config, AppStateOptions::default()).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let config_arc = Arc::new(config);
        let backend = options.backend.unwrap_or(config_arc.database.backend);

        let store: Arc<dyn DocumentStore> = match backend {
            StorageBackend::Postgres => {
                let db_pool = create_db_pool(&config_arc.database).await?;

                if options
                    .run_migrations
                    .unwrap_or(config_arc.database.run_migrations)
                {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations")
                        .run(&db_pool)
                        .await
                        .map_err(|e| crate::Error::Internal(format!("Migration failed: {}", e)))?;
                }

                Arc::new(PostgresDocumentStore::new(db_pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Ok(Self::from_store(config_arc, store))
    }

    /// Wire services over an existing store.
    pub fn from_store(config: Arc<Config>, store: Arc<dyn DocumentStore>) -> Self {
        let auth = Arc::new(AuthManager::new(&config.auth));
        let Services {
            clinics,
            doctors,
            health_services,
        } = Services::new(store.clone());

        tracing::info!(
            auth_enabled = auth.enabled(),
            "Application state initialized"
        );

        Self {
            config,
            auth,
            store,
            clinic_service: clinics,
            doctor_service: doctors,
            health_service_service: health_services,
        }
    }
}

async fn create_db_pool(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.statement_timeout_seconds;
    let lock_timeout = config.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Set statement timeout (max query execution time)
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;

                // Set lock timeout (max lock wait time - fail fast)
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect(&config.url)
        .await
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.pool_min_size,
        config.pool_max_size
    );

    Ok(pool)
}
