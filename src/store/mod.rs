//! Row store gateway: a thin call-through to the managed database. Backends hold no logic of their own.

mod memory;
mod postgres;
mod postgrest;
mod query;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use postgrest::PostgrestStore;
pub use query::{compare_values, scalar_text, Filter, Order, SelectQuery};

use crate::error::StoreError;
use crate::table::Table;
use async_trait::async_trait;

/// One stored row as returned by the store, keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait RowStore: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError>;

    /// Insert one row and return it as stored (defaults filled in).
    async fn insert(&self, table: Table, row: &Row) -> Result<Row, StoreError>;

    /// Patch every row matching `filter`; returns the updated rows.
    async fn update(&self, table: Table, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError>;

    /// Delete every row matching `filter`; returns the deleted rows.
    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError>;
}
