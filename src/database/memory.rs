use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{schema, Row, Storage, StorageError};
use crate::filter::{Fields, Filter, FilterWhereInfo, SortDirection};

/// In-process storage. Rows keep insertion order per table.
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Empty storage with the standard tables.
    pub fn new() -> Self {
        let tables = schema::TABLES.iter().map(|t| (t.to_string(), Vec::new())).collect();
        Self { tables: RwLock::new(tables) }
    }

    /// Number of rows in `table`, zero for unknown tables.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map(Vec::len).unwrap_or(0)
    }
}

fn matches(row: &Row, conditions: &[FilterWhereInfo]) -> bool {
    conditions.iter().all(|condition| {
        let actual = row.get(&condition.column).unwrap_or(&Value::Null);
        *actual == condition.data.to_json()
    })
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater, // NULLS LAST, as Postgres does for ASC
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn apply_order(rows: &mut [Row], filter: &Filter) {
    if filter.order().is_empty() {
        return;
    }
    // Stable sort, so ties keep insertion order
    rows.sort_by(|a, b| {
        for info in filter.order() {
            let ord = compare_values(
                a.get(&info.column).unwrap_or(&Value::Null),
                b.get(&info.column).unwrap_or(&Value::Null),
            );
            let ord = match info.sort {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert(&self, table: &str, fields: Fields) -> Result<Row, StorageError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;

        let row: Row = fields.iter().map(|(c, v)| (c.to_string(), v.to_json())).collect();
        if let Some(id) = row.get("id") {
            if rows.iter().any(|r| r.get("id") == Some(id)) {
                return Err(StorageError::QueryError(format!("duplicate id in {}", table)));
            }
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn select_where(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StorageError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;

        let mut selected: Vec<Row> = rows
            .iter()
            .filter(|row| matches(row, filter.conditions()))
            .cloned()
            .collect();
        apply_order(&mut selected, filter);
        let offset = filter.offset_value().unwrap_or(0) as usize;
        let limit = filter.limit_value().map_or(usize::MAX, |l| l as usize);
        Ok(selected.into_iter().skip(offset).take(limit).collect())
    }

    async fn update_where(&self, table: &str, filter: &Filter, patch: Fields) -> Result<Option<Row>, StorageError> {
        if patch.is_empty() {
            return Err(StorageError::QueryError("empty update".to_string()));
        }
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;

        let mut first = None;
        for row in rows.iter_mut().filter(|row| matches(row, filter.conditions())) {
            for (column, value) in patch.iter() {
                row.insert(column.to_string(), value.to_json());
            }
            if first.is_none() {
                first = Some(row.clone());
            }
        }
        Ok(first)
    }

    async fn delete_where(&self, table: &str, filter: &Filter) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;

        let before = rows.len();
        rows.retain(|row| !matches(row, filter.conditions()));
        Ok((before - rows.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
