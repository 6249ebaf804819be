//! Dependency wiring for one process.

use crate::config::AppConfig;
use crate::controller::ApiController;
use crate::datastore::SqliteDatastore;
use crate::repository::{ApiRepository, DatabaseRepository};
use crate::vision::{FileVisionService, VisionService};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything an operation needs, built once from the configuration.
pub struct AppContext {
    pub config: AppConfig,
    pub base_dir: PathBuf,
    pub datastore: Arc<SqliteDatastore>,
    pub controller: Arc<ApiController>,
}

impl AppContext {
    /// Wires the SQLite store and the file-backed vision service.
    /// Relative paths in `config` resolve against `base_dir`.
    pub fn new(config: AppConfig, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let vision: Arc<dyn VisionService> =
            Arc::new(FileVisionService::new(config.encoding_file(&base_dir)));
        Self::with_vision(config, base_dir, vision)
    }

    /// Same wiring with a caller-supplied vision collaborator.
    pub fn with_vision(
        config: AppConfig,
        base_dir: impl Into<PathBuf>,
        vision: Arc<dyn VisionService>,
    ) -> Self {
        let base_dir = base_dir.into();
        let datastore = Arc::new(SqliteDatastore::new(config.database_path(&base_dir)));
        let database = DatabaseRepository::new(datastore.clone());
        let repository = ApiRepository::new(database, vision.clone(), config.tables.clone())
            .with_tolerance(config.vision.tolerance);
        let controller = Arc::new(ApiController::new(repository, vision));
        Self {
            config,
            base_dir,
            datastore,
            controller,
        }
    }

    /// Creates the database file and the three tables if missing.
    pub async fn init_schema(&self) -> Result<()> {
        self.datastore
            .apply_schema(&self.config.tables)
            .await
            .with_context(|| {
                format!(
                    "Failed to initialize schema at {}",
                    self.datastore.path().display()
                )
            })
    }

    pub fn audit_log_dir(&self) -> PathBuf {
        self.config.audit_log_dir(&self.base_dir)
    }

    pub fn database_path(&self) -> &Path {
        self.datastore.path()
    }
}
