//! In-process row store for tests and local runs without a database.

use super::{compare_values, Filter, Row, RowStore, SelectQuery};
use crate::error::StoreError;
use crate::table::Table;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, Vec<Row>>>,
    calls: AtomicUsize,
    /// Calls numbered at or past the threshold fail with the message.
    failure: Mutex<Option<(usize, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table. Non-object values are ignored.
    pub fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(m) => Some(m),
                _ => None,
            })
            .collect();
        self.lock().insert(table, rows);
        self
    }

    /// Make every following call fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.fail_after(self.calls(), message);
    }

    /// Let the first `calls` calls (counted from creation) succeed and fail every later one.
    pub fn fail_after(&self, calls: usize, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some((calls, message.into()));
    }

    /// Number of store calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.lock().get(&table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Table, Vec<Row>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_call(&self) -> Result<(), StoreError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some((threshold, message)) if index >= *threshold => Err(StoreError::Rejected {
                status: 500,
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }
}

fn next_id(rows: &[Row]) -> Value {
    let max = rows
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0);
    Value::from(max + 1)
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        self.begin_call()?;
        let tables = self.lock();
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.filters.iter().all(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let a = a.get(&order.column).unwrap_or(&Value::Null);
                let b = b.get(&order.column).unwrap_or(&Value::Null);
                let ord = compare_values(a, b);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        if !query.columns.is_empty() {
            for row in rows.iter_mut() {
                row.retain(|k, _| query.columns.iter().any(|c| c == k));
            }
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: &Row) -> Result<Row, StoreError> {
        self.begin_call()?;
        let mut tables = self.lock();
        let rows = tables.entry(table).or_default();
        let mut row = row.clone();
        if !row.contains_key("id") {
            row.insert("id".into(), next_id(rows));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError> {
        self.begin_call()?;
        let mut tables = self.lock();
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if filter.matches(row) {
                for (k, v) in patch {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.begin_call()?;
        let mut tables = self.lock();
        let rows = tables.entry(table).or_default();
        let (deleted, kept): (Vec<Row>, Vec<Row>) = std::mem::take(rows).into_iter().partition(|r| filter.matches(r));
        *rows = kept;
        Ok(deleted)
    }
}
