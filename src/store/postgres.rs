//! Direct Postgres backend: runs builder SQL on a sqlx pool.

use super::{Filter, Row, RowStore, SelectQuery};
use crate::error::StoreError;
use crate::sql::{self, QueryBuf, SqlParam};
use crate::table::Table;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Lazily connecting pool; the first query opens the first connection.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;
        Ok(PgStore { pool })
    }

    async fn fetch_rows(&self, q: &QueryBuf) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in &q.params {
            query = match p {
                SqlParam::Text(s) => query.bind(s.as_str()),
                SqlParam::Json(v) => query.bind(v),
            };
        }
        let values = query.fetch_all(&self.pool).await?;
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::Decode(format!("expected a row object, got {}", other))),
            })
            .collect()
    }
}

#[async_trait]
impl RowStore for PgStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        self.fetch_rows(&sql::select(query)).await
    }

    async fn insert(&self, table: Table, row: &Row) -> Result<Row, StoreError> {
        self.fetch_rows(&sql::insert(table, row))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError> {
        self.fetch_rows(&sql::update(table, filter, patch)).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.fetch_rows(&sql::delete(table, filter)).await
    }
}
