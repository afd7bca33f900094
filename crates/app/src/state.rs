//! Application state management

use std::sync::{Arc, Mutex};

use qrattend_core::{AppConfig, Database, Error, Result};
use tokio::runtime::Handle;
use tracing::info;

/// Main application state
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: AppConfig,
    runtime: Handle,
}

impl AppState {
    /// Open the configured database, creating its directory if needed
    pub fn new(config: AppConfig, runtime: Handle) -> Result<Self> {
        let db_path = config.database_path()?;

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;
        info!(path = %db_path.display(), "Opened attendance database");

        Ok(Self::with_database(db, config, runtime))
    }

    pub fn with_database(db: Database, config: AppConfig, runtime: Handle) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
            runtime,
        }
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Run `f` with the database locked
    pub fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let db = self
            .db
            .lock()
            .map_err(|_| Error::InvalidOperation("Database lock poisoned".to_string()))?;
        f(&db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrattend_core::StudentRepository;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_database_directory() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.database = Some(dir.path().join("nested").join("qrattend.db"));

        let state = AppState::new(config, runtime.handle().clone()).unwrap();
        assert!(dir.path().join("nested").join("qrattend.db").exists());
        assert_eq!(state.with_db(|db| db.count_students()).unwrap(), 0);
    }
}
