//! Result types for query execution

use serde::Serialize;

use super::registry::QueryKind;

/// Type of a result column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Int,
    Float,
}

/// One named, typed result column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultColumn {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl ResultColumn {
    pub const fn new(name: &'static str, value_type: ValueType) -> Self {
        Self { name, value_type }
    }
}

/// A single result cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Text(_) => ValueType::Text,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Tabular result of one query
///
/// Columns always follow the query's contract, even with zero rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: QueryKind,
    pub columns: &'static [ResultColumn],
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Creates a result with no rows
    pub fn empty(query: QueryKind) -> Self {
        Self {
            query,
            columns: query.columns(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; cells must follow the column contract
    pub(crate) fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        debug_assert!(row
            .iter()
            .zip(self.columns)
            .all(|(cell, col)| cell.value_type() == col.value_type));
        self.rows.push(row);
    }

    /// Returns true if no rows matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at `row` in column `name`
    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_keeps_columns() {
        let result = QueryResult::empty(QueryKind::AirportTraffic);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.columns.len(), 2);
        assert_eq!(result.column_index("trips"), Some(1));
    }

    #[test]
    fn test_cell_lookup() {
        let mut result = QueryResult::empty(QueryKind::TopPickups);
        result.push_row(vec!["JFK Airport".into(), 12i64.into()]);
        assert_eq!(result.cell(0, "pickups"), Some(&Value::Int(12)));
        assert_eq!(result.cell(0, "pickup_zone").and_then(Value::as_text), Some("JFK Airport"));
        assert_eq!(result.cell(1, "pickups"), None);
    }

    #[test]
    fn test_json_shape() {
        let mut result = QueryResult::empty(QueryKind::TipAnalysis);
        result.push_row(vec!["Astoria".into(), 2.5f64.into(), 4i64.into()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["query"], "tips");
        assert_eq!(json["columns"][1]["name"], "avg_tip");
        assert_eq!(json["columns"][1]["type"], "float");
        assert_eq!(json["rows"][0], serde_json::json!(["Astoria", 2.5, 4]));
    }
}
