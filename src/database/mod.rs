/*!
 * Database module for the vocabulary store.
 *
 * This module provides persistence for:
 * - Languages and corpus categories (find-or-create)
 * - Imported words and their derived short glosses
 * - Gloss coverage statistics
 *
 * Two backends implement `VocabStore`: MySQL for the production database and
 * SQLite for local runs and tests.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;
pub mod mysql;

use anyhow::Result;
use log::info;

use crate::app_config::{DatabaseBackend, DatabaseConfig};

// Re-export main types
pub use connection::DatabaseConnection;
pub use mysql::MySqlStore;
pub use repository::{SqliteStore, VocabStore};

/// Open the store selected by the configuration
pub async fn open_store(config: &DatabaseConfig) -> Result<Box<dyn VocabStore>> {
    match config.backend {
        DatabaseBackend::MySql => Ok(Box::new(MySqlStore::connect(config).await?)),
        DatabaseBackend::Sqlite => {
            let path = match &config.sqlite_path {
                Some(path) => path.clone(),
                None => DatabaseConnection::default_database_path()?,
            };
            info!("Using SQLite store at {:?}", path);
            Ok(Box::new(SqliteStore::open(path)?))
        }
    }
}
