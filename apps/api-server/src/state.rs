//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::PostService;
use quill_core::ports::PostRepository;
use quill_infra::InMemoryPostStore;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use migration::DbErr;
#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, PostgresPostRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with the configured post store.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repo): (Option<Arc<DatabaseConnections>>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match connect(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let repo = Arc::new(PostgresPostRepository::new(conn.main.clone()));
                        (Some(conn), repo)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        (None, Arc::new(InMemoryPostStore::new()))
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    (None, Arc::new(InMemoryPostStore::new()))
                }
            };

        #[cfg(not(feature = "postgres"))]
        let repo: Arc<dyn PostRepository> = {
            tracing::info!("Running without postgres feature - using in-memory post store");
            Arc::new(InMemoryPostStore::new())
        };

        let posts = PostService::new(repo).with_excerpt_len(config.excerpt_len);
        tracing::info!(storage = posts.backend(), "Application state initialized");

        Self {
            posts,
            #[cfg(feature = "postgres")]
            db,
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(excerpt_len: usize) -> Self {
        let repo: Arc<dyn PostRepository> = Arc::new(InMemoryPostStore::new());
        Self {
            posts: PostService::new(repo).with_excerpt_len(excerpt_len),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Whether the storage backend is reachable.
    pub async fn storage_healthy(&self) -> bool {
        #[cfg(feature = "postgres")]
        let healthy = match &self.db {
            Some(db) => db.ping().await,
            None => true,
        };
        #[cfg(not(feature = "postgres"))]
        let healthy = true;
        healthy
    }
}

#[cfg(feature = "postgres")]
async fn connect(config: &quill_infra::DatabaseConfig) -> Result<DatabaseConnections, DbErr> {
    use migration::{Migrator, MigratorTrait};

    let connections = DatabaseConnections::init(config).await?;
    if config.auto_migrate {
        tracing::info!("Applying pending migrations");
        Migrator::up(&connections.main, None).await?;
    }
    Ok(connections)
}
