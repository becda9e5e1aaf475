//! Supabase / PostgREST backend over HTTP.

use super::{scalar_text, Filter, Row, RowStore, SelectQuery};
use crate::error::StoreError;
use crate::table::Table;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    /// `project_url` is the project root (e.g. `https://xyz.supabase.co`); `/rest/v1` is appended.
    pub fn new(project_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(PostgrestStore {
            client,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.as_str())
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn returning(req: RequestBuilder) -> RequestBuilder {
        req.header("Prefer", "return=representation")
    }

    async fn rows(res: Response) -> Result<Vec<Row>, StoreError> {
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        match res.json::<Value>().await? {
            Value::Array(items) => items
                .into_iter()
                .map(|v| match v {
                    Value::Object(row) => Ok(row),
                    other => Err(StoreError::Decode(format!("expected a row object, got {}", other))),
                })
                .collect(),
            other => Err(StoreError::Decode(format!("expected an array of rows, got {}", other))),
        }
    }
}

/// The `message` field of a PostgREST error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Operand inside `in.(...)`. Strings are double-quoted so commas and parentheses survive.
fn list_item(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))),
        other => scalar_text(other),
    }
}

fn filter_pair(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq { column, value } => match scalar_text(value) {
            Some(text) => (column.clone(), format!("eq.{}", text)),
            None => (column.clone(), "is.null".to_string()),
        },
        Filter::In { column, values } => {
            let items: Vec<String> = values.iter().filter_map(list_item).collect();
            (column.clone(), format!("in.({})", items.join(",")))
        }
    }
}

/// Query-string pairs for a select.
pub(crate) fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let columns = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query.columns.join(",")
    };
    params.push(("select".to_string(), columns));
    params.extend(query.filters.iter().map(filter_pair));
    if let Some(order) = &query.order {
        let dir = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl RowStore for PostgrestStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let params = select_params(query);
        tracing::debug!(table = %query.table, ?params, "postgrest select");
        let req = self.client.get(self.table_url(query.table)).query(&params);
        Self::rows(self.authorized(req).send().await?).await
    }

    async fn insert(&self, table: Table, row: &Row) -> Result<Row, StoreError> {
        tracing::debug!(%table, "postgrest insert");
        let req = self.client.post(self.table_url(table)).json(row);
        let res = Self::returning(self.authorized(req)).send().await?;
        Self::rows(res)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError> {
        let pair = filter_pair(filter);
        tracing::debug!(%table, filter = ?pair, "postgrest update");
        let req = self.client.patch(self.table_url(table)).query(&[pair]).json(patch);
        Self::rows(Self::returning(self.authorized(req)).send().await?).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let pair = filter_pair(filter);
        tracing::debug!(%table, filter = ?pair, "postgrest delete");
        let req = self.client.delete(self.table_url(table)).query(&[pair]);
        Self::rows(Self::returning(self.authorized(req)).send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, Method, StatusCode};
    use axum::routing::any;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn login_lookup_params() {
        let q = SelectQuery::from(Table::Users).eq("email", "ann@example.com").limit(1);
        assert_eq!(
            select_params(&q),
            pairs(&[("select", "*"), ("email", "eq.ann@example.com"), ("limit", "1")])
        );
    }

    #[test]
    fn join_lookup_params() {
        let q = SelectQuery::from(Table::Users)
            .select(&["id", "name", "department"])
            .in_("id", vec![json!("u1"), json!("a,b"), json!(7)])
            .order("created_at", false);
        assert_eq!(
            select_params(&q),
            pairs(&[
                ("select", "id,name,department"),
                ("id", "in.(\"u1\",\"a,b\",7)"),
                ("order", "created_at.desc"),
            ])
        );
    }

    #[test]
    fn null_filter_uses_is() {
        assert_eq!(
            filter_pair(&Filter::eq("user_id", Value::Null)),
            ("user_id".to_string(), "is.null".to_string())
        );
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"code":"42P01","message":"relation does not exist"}"#),
            "relation does not exist"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    /// One request as seen by the stub server.
    #[derive(Clone, Debug)]
    struct Seen {
        method: Method,
        table: String,
        query: Vec<(String, String)>,
        apikey: Option<String>,
        authorization: Option<String>,
        prefer: Option<String>,
        body: String,
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }

    async fn record(
        State(log): State<Log>,
        method: Method,
        Path(table): Path<String>,
        Query(query): Query<Vec<(String, String)>>,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, Json<Value>) {
        log.lock().unwrap().push(Seen {
            method: method.clone(),
            table: table.clone(),
            query,
            apikey: header(&headers, "apikey"),
            authorization: header(&headers, "authorization"),
            prefer: header(&headers, "prefer"),
            body,
        });
        match table.as_str() {
            "inventory" => (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad filter" }))),
            "notifications" => (StatusCode::OK, Json(json!({ "not": "an array" }))),
            _ if method == Method::POST => (StatusCode::CREATED, Json(json!([{ "id": 1, "item_name": "Pen" }]))),
            _ if method == Method::GET => (StatusCode::OK, Json(json!([{ "id": "u1", "name": "Ann" }]))),
            _ => (StatusCode::OK, Json(json!([{ "id": 1 }]))),
        }
    }

    async fn stub() -> (PostgrestStore, Log) {
        let log: Log = Arc::default();
        let router = Router::new()
            .route("/rest/v1/:table", any(record))
            .with_state(log.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        let store = PostgrestStore::new(&format!("http://{}/", addr), "anon-key").unwrap();
        (store, log)
    }

    fn object(v: Value) -> Row {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn http_calls_carry_credentials_and_filters() {
        let (store, log) = stub().await;

        let users = store
            .select(&SelectQuery::from(Table::Users).eq("email", "ann@example.com").limit(1))
            .await
            .unwrap();
        assert_eq!(users[0]["name"], "Ann");

        let created = store
            .insert(Table::ItemRequests, &object(json!({ "item_name": "Pen" })))
            .await
            .unwrap();
        assert_eq!(created["id"], 1);

        let patch = object(json!({ "status": "approved" }));
        let updated = store.update(Table::ItemRequests, &Filter::eq("id", 1), &patch).await.unwrap();
        assert_eq!(updated.len(), 1);
        let deleted = store.delete(Table::ItemRequests, &Filter::eq("id", 1)).await.unwrap();
        assert_eq!(deleted.len(), 1);

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 4);
        for s in &seen {
            assert_eq!(s.apikey.as_deref(), Some("anon-key"));
            assert_eq!(s.authorization.as_deref(), Some("Bearer anon-key"));
        }

        assert_eq!(seen[0].method, Method::GET);
        assert_eq!(seen[0].table, "users");
        assert_eq!(
            seen[0].query,
            pairs(&[("select", "*"), ("email", "eq.ann@example.com"), ("limit", "1")])
        );
        assert_eq!(seen[0].prefer, None);

        assert_eq!(seen[1].method, Method::POST);
        assert_eq!(serde_json::from_str::<Value>(&seen[1].body).unwrap(), json!({ "item_name": "Pen" }));
        assert_eq!(seen[2].method, Method::PATCH);
        assert_eq!(seen[2].query, pairs(&[("id", "eq.1")]));
        assert_eq!(serde_json::from_str::<Value>(&seen[2].body).unwrap(), json!({ "status": "approved" }));
        assert_eq!(seen[3].method, Method::DELETE);
        assert_eq!(seen[3].query, pairs(&[("id", "eq.1")]));
        for s in &seen[1..] {
            assert_eq!(s.table, "item_requests");
            assert_eq!(s.prefer.as_deref(), Some("return=representation"));
        }
    }

    #[tokio::test]
    async fn error_status_and_non_array_bodies_are_store_errors() {
        let (store, _log) = stub().await;

        let err = store.select(&SelectQuery::from(Table::Inventory)).await.unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad filter");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = store.select(&SelectQuery::from(Table::Notifications)).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)), "{err:?}");
    }

    #[test]
    fn base_url_is_normalized() {
        let store = PostgrestStore::new("https://xyz.supabase.co/", "key").unwrap();
        assert_eq!(store.table_url(Table::ItemRequests), "https://xyz.supabase.co/rest/v1/item_requests");
    }
}
