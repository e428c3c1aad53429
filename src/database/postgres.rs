use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgRow},
    PgPool, Postgres, Row as _,
};
use tracing::{debug, info};

use super::{schema, Row, Storage, StorageError};
use crate::config::DatabaseConfig;
use crate::filter::{Fields, Filter, Param, SqlResult};

/// Postgres-backed storage over a shared connection pool.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(max_connections = config.max_connections, "Created database pool");
        Ok(Self { pool })
    }

    fn build_connection_string(config: &DatabaseConfig) -> Result<String, StorageError> {
        let base = config.url.as_deref().ok_or(StorageError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(base).map_err(|_| StorageError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(StorageError::InvalidDatabaseUrl),
        }
    }

    /// Creates missing tables and indexes.
    pub async fn bootstrap(&self) -> Result<(), StorageError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!(tables = schema::TABLES.len(), "Database schema ensured");
        Ok(())
    }

    async fn fetch_rows(&self, sql: &SqlResult) -> Result<Vec<Row>, StorageError> {
        debug!(query = %sql.query, params = sql.params.len(), "Executing query");
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}

/// Wraps a `... RETURNING *` statement so written rows come back as JSON objects.
fn returning_json(sql: SqlResult) -> SqlResult {
    SqlResult {
        query: format!("WITH written AS ({}) SELECT row_to_json(written) AS row FROM written", sql.query),
        params: sql.params,
    }
}

fn decode_row(row: &PgRow) -> Result<Row, StorageError> {
    match row.try_get::<Value, _>("row")? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Decode(format!("expected JSON object row, got {}", other))),
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn insert(&self, table: &str, fields: Fields) -> Result<Row, StorageError> {
        let sql = returning_json(Filter::to_insert_sql(table, &fields)?);
        self.fetch_rows(&sql)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::QueryError(format!("insert into {} returned no row", table)))
    }

    async fn select_where(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StorageError> {
        let sql = filter.to_json_select_sql(table)?;
        self.fetch_rows(&sql).await
    }

    async fn update_where(&self, table: &str, filter: &Filter, patch: Fields) -> Result<Option<Row>, StorageError> {
        let sql = returning_json(filter.to_update_sql(table, &patch)?);
        Ok(self.fetch_rows(&sql).await?.into_iter().next())
    }

    async fn delete_where(&self, table: &str, filter: &Filter) -> Result<u64, StorageError> {
        let sql = filter.to_delete_sql(table)?;
        debug!(query = %sql.query, params = sql.params.len(), "Executing delete");
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    p: &'q Param,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match p {
        // Nulls are inlined as SQL literals by the filter; this arm is a fallback
        Param::Null => q.bind(None::<String>),
        Param::Bool(b) => q.bind(*b),
        Param::Int(i) => q.bind(*i),
        Param::Float(f) => q.bind(*f),
        Param::Text(s) => q.bind(s.as_str()),
        Param::Uuid(u) => q.bind(*u),
        Param::Timestamp(t) => q.bind(*t),
        Param::Json(v) => q.bind(v),
    }
}
