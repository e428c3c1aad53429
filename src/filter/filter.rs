use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Fields, FilterOrderInfo, FilterWhereInfo, Param, SortDirection, SqlResult};

/// Row predicate plus ordering and paging, shared by every storage backend.
///
/// Conditions are ANDed. SQL is generated with `$n` placeholders and
/// validated identifiers only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FilterWhereInfo>,
    order: Vec<FilterOrderInfo>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Param>) -> Self {
        self.conditions.push(FilterWhereInfo { column: column.into(), data: value.into() });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo { column: column.into(), sort });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rows to skip after ordering.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset).filter(|o| *o > 0);
        self
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn order(&self) -> &[FilterOrderInfo] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u32> {
        self.offset
    }

    /// Fold another filter's conditions and ordering into this one.
    pub fn merge(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self.order.extend(other.order);
        if other.limit.is_some() {
            self.limit = other.limit;
        }
        if other.offset.is_some() {
            self.offset = other.offset;
        }
        self
    }

    /// Each matching row projected as a single JSON object column `row`.
    pub fn to_json_select_sql(&self, table: &str) -> Result<SqlResult, FilterError> {
        validate_table_name(table)?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let order_clause = FilterOrder::generate(&self.order)?;
        let limit_clause = self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
        let offset_clause = self.offset.map(|o| format!("OFFSET {}", o)).unwrap_or_default();

        let query = [
            "SELECT row_to_json(t) AS row".to_string(),
            format!("FROM \"{}\" t", table),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
            offset_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_update_sql(&self, table: &str, patch: &Fields) -> Result<SqlResult, FilterError> {
        validate_table_name(table)?;
        if patch.is_empty() {
            return Err(FilterError::EmptyFields("UPDATE"));
        }

        let mut params = Vec::new();
        let mut assignments = Vec::with_capacity(patch.len());
        for (column, value) in patch.iter() {
            validate_identifier(column).map_err(FilterError::InvalidColumn)?;
            if value.is_null() {
                assignments.push(format!("\"{}\" = NULL", column));
            } else {
                params.push(value.clone());
                assignments.push(format!("\"{}\" = ${}", column, params.len()));
            }
        }

        let (where_clause, where_params) = FilterWhere::generate(&self.conditions, params.len())?;
        params.extend(where_params);

        let query = format!(
            "UPDATE \"{}\" SET {} WHERE {} RETURNING *",
            table,
            assignments.join(", "),
            where_clause
        );
        Ok(SqlResult { query, params })
    }

    pub fn to_delete_sql(&self, table: &str) -> Result<SqlResult, FilterError> {
        validate_table_name(table)?;
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        Ok(SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE {}", table, where_clause),
            params,
        })
    }

    pub fn to_insert_sql(table: &str, fields: &Fields) -> Result<SqlResult, FilterError> {
        validate_table_name(table)?;
        if fields.is_empty() {
            return Err(FilterError::EmptyFields("INSERT"));
        }

        let mut params = Vec::new();
        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (column, value) in fields.iter() {
            validate_identifier(column).map_err(FilterError::InvalidColumn)?;
            columns.push(format!("\"{}\"", column));
            if value.is_null() {
                values.push("NULL".to_string());
            } else {
                params.push(value.clone());
                values.push(format!("${}", params.len()));
            }
        }

        let query = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            table,
            columns.join(", "),
            values.join(", ")
        );
        Ok(SqlResult { query, params })
    }
}

fn validate_table_name(name: &str) -> Result<(), FilterError> {
    validate_identifier(name).map_err(FilterError::InvalidTableName)
}

/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("identifier cannot be empty".to_string()),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(format!("invalid identifier format: {}", name))
        }
        _ => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid identifier format: {}", name));
    }
    Ok(())
}
