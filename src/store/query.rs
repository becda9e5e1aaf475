//! Query description shared by all row store backends: select / eq / in / order / limit.

use super::Row;
use crate::table::Table;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// Evaluate against an in-memory row. Values compare by their text form, as the SQL backend does.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq { value, .. } => same_value(cell, value),
            Filter::In { values, .. } => values.iter().any(|v| same_value(cell, v)),
        }
    }
}

/// Text form of a scalar as Postgres renders it with `::text`. None for null.
pub fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (scalar_text(a), scalar_text(b)) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

/// Ordering used by in-memory evaluation: numbers numerically, everything else by text, nulls last.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => scalar_text(a).cmp(&scalar_text(b)),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read against one table. No columns means every column.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectQuery {
    pub table: Table,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn from(table: Table) -> Self {
        SelectQuery {
            table,
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn in_(mut self, column: &str, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In {
            column: column.to_string(),
            values,
        });
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }
}
