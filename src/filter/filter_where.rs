use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterWhereInfo, Param};

/// Renders equality conditions into a parameterized WHERE body.
pub struct FilterWhere {
    param_values: Vec<Param>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (without the `WHERE` keyword) and its parameters.
    /// Placeholders continue from `starting_param_index`.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<Param>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            parts.push(filter_where.build_sql_condition(condition)?);
        }
        let clause = if parts.is_empty() { "1=1".to_string() } else { parts.join(" AND ") };
        Ok((clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        validate_identifier(&condition.column).map_err(FilterError::InvalidColumn)?;
        let quoted_column = format!("\"{}\"", condition.column);

        Ok(if condition.data.is_null() {
            format!("{} IS NULL", quoted_column)
        } else {
            format!("{} = {}", quoted_column, self.param(condition.data.clone()))
        })
    }

    fn param(&mut self, value: Param) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn numbers_placeholders_from_offset() {
        let owner = Uuid::new_v4();
        let conditions = vec![
            FilterWhereInfo { column: "owner_id".into(), data: Param::Uuid(owner) },
            FilterWhereInfo { column: "note_id".into(), data: Param::Text("n".into()) },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 2).unwrap();
        assert_eq!(sql, "\"owner_id\" = $3 AND \"note_id\" = $4");
        assert_eq!(params, vec![Param::Uuid(owner), Param::Text("n".into())]);
    }

    #[test]
    fn null_comparisons_do_not_bind() {
        let conditions = vec![FilterWhereInfo { column: "task_id".into(), data: Param::Null }];
        let (sql, params) = FilterWhere::generate(&conditions, 0).unwrap();
        assert_eq!(sql, "\"task_id\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_injected_column_names() {
        let conditions = vec![FilterWhereInfo {
            column: "id\" OR 1=1 --".into(),
            data: Param::Int(1),
        }];
        assert!(matches!(FilterWhere::generate(&conditions, 0), Err(FilterError::InvalidColumn(_))));
    }
}
