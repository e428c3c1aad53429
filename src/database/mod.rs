pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{Fields, Filter, FilterError};

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

/// A stored row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Generic table access. Knows nothing about owners; the repository layer
/// adds that predicate.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn insert(&self, table: &str, fields: Fields) -> Result<Row, StorageError>;

    async fn select_where(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StorageError>;

    /// Applies `patch` to every matching row and returns the first updated
    /// row, or `None` when nothing matched.
    async fn update_where(&self, table: &str, filter: &Filter, patch: Fields) -> Result<Option<Row>, StorageError>;

    /// Returns the number of rows removed.
    async fn delete_where(&self, table: &str, filter: &Filter) -> Result<u64, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}
