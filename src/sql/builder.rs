//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a `SelectQuery` or a filter.
//! Every statement returns rows as a single `jsonb` column named `row`.

use crate::store::{scalar_text, Filter, Row, SelectQuery};
use crate::table::Table;
use serde_json::Value;

/// Alias used for the target table in every statement.
const ALIAS: &str = "t";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a string literal (used for jsonb object keys).
fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn aliased(column: &str) -> String {
    format!("{}.{}", ALIAS, quoted(column))
}

#[derive(Clone, Debug, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, p: SqlParam) -> usize {
        self.params.push(p);
        self.params.len()
    }

    /// Binds `text` and converts it to the declared type of `table.column`, leaving the column itself bare.
    fn typed_param(&mut self, table: Table, column: &str, text: String) -> String {
        let n = self.push_param(SqlParam::Text(text));
        format!(
            "(jsonb_populate_record(NULL::{}, jsonb_build_object({}, ${}::text))).{}",
            quoted(table.as_str()),
            literal(column),
            n,
            quoted(column)
        )
    }

    fn filter_clause(&mut self, table: Table, filter: &Filter) -> String {
        match filter {
            Filter::Eq { column, value } => match scalar_text(value) {
                Some(text) => {
                    let rhs = self.typed_param(table, column, text);
                    format!("{} = {}", aliased(column), rhs)
                }
                None => format!("{} IS NULL", aliased(column)),
            },
            Filter::In { column, values } => {
                let items: Vec<String> = values
                    .iter()
                    .filter_map(scalar_text)
                    .map(|text| self.typed_param(table, column, text))
                    .collect();
                if items.is_empty() {
                    "FALSE".to_string()
                } else {
                    format!("{} IN ({})", aliased(column), items.join(", "))
                }
            }
        }
    }

    fn where_clause(&mut self, table: Table, filters: &[Filter]) -> String {
        let parts: Vec<String> = filters.iter().map(|f| self.filter_clause(table, f)).collect();
        if parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", parts.join(" AND "))
        }
    }
}

fn returning() -> String {
    format!(" RETURNING to_jsonb({}) AS row", ALIAS)
}

fn target(table: Table) -> String {
    format!("{} AS {}", quoted(table.as_str()), ALIAS)
}

/// SELECT with projection, filters, ORDER BY and LIMIT.
pub fn select(query: &SelectQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let projection = if query.columns.is_empty() {
        format!("to_jsonb({})", ALIAS)
    } else {
        let pairs: Vec<String> = query
            .columns
            .iter()
            .map(|c| format!("{}, {}", literal(c), aliased(c)))
            .collect();
        format!("jsonb_build_object({})", pairs.join(", "))
    };
    let where_clause = q.where_clause(query.table, &query.filters);
    let order_clause = query
        .order
        .as_ref()
        .map(|o| {
            format!(
                " ORDER BY {} {}",
                aliased(&o.column),
                if o.ascending { "ASC" } else { "DESC" }
            )
        })
        .unwrap_or_default();
    let limit_clause = query.limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} AS row FROM {}{}{}{}",
        projection,
        target(query.table),
        where_clause,
        order_clause,
        limit_clause
    );
    q
}

/// INSERT one row. Values go through `jsonb_populate_record` so each column gets its declared type.
pub fn insert(table: Table, row: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    if row.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES{}", target(table), returning());
        return q;
    }
    let cols: Vec<String> = row.keys().map(|k| quoted(k)).collect();
    let cols = cols.join(", ");
    let n = q.push_param(SqlParam::Json(Value::Object(row.clone())));
    q.sql = format!(
        "INSERT INTO {} ({}) SELECT {} FROM jsonb_populate_record(NULL::{}, ${}::jsonb){}",
        target(table),
        cols,
        cols,
        quoted(table.as_str()),
        n,
        returning()
    );
    q
}

/// UPDATE rows matching `filter`. Caller guarantees `patch` is non-empty.
pub fn update(table: Table, filter: &Filter, patch: &Row) -> QueryBuf {
    let mut q = QueryBuf::new();
    let cols: Vec<String> = patch.keys().map(|k| quoted(k)).collect();
    let cols = cols.join(", ");
    let n = q.push_param(SqlParam::Json(Value::Object(patch.clone())));
    let where_clause = q.where_clause(table, std::slice::from_ref(filter));
    q.sql = format!(
        "UPDATE {} SET ({}) = (SELECT {} FROM jsonb_populate_record(NULL::{}, ${}::jsonb)){}{}",
        target(table),
        cols,
        cols,
        quoted(table.as_str()),
        n,
        where_clause,
        returning()
    );
    q
}

/// DELETE rows matching `filter`.
pub fn delete(table: Table, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(table, std::slice::from_ref(filter));
    q.sql = format!("DELETE FROM {}{}{}", target(table), where_clause, returning());
    q
}
