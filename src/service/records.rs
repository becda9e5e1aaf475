//! Per-table CRUD over the row store. Every result passes through the table's transform.

use super::action::DbAction;
use crate::case::keys_to_columns;
use crate::error::AppError;
use crate::password::PasswordPolicy;
use crate::response::Deleted;
use crate::store::{Filter, Row, RowStore, SelectQuery};
use crate::table::Table;
use crate::transform::{join_item_requests, referenced_user_ids, ItemRequestWithUser, Record};
use serde::Serialize;
use serde_json::Value;

const NOT_FOUND: &str = "Record not found";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionOutput {
    Joined(Vec<ItemRequestWithUser>),
    Many(Vec<Record>),
    One(Record),
    Deleted(Deleted),
}

pub struct RecordService;

impl RecordService {
    pub async fn dispatch(
        store: &dyn RowStore,
        passwords: &PasswordPolicy,
        table: Table,
        action: DbAction,
    ) -> Result<ActionOutput, AppError> {
        tracing::debug!(%table, action = action.name(), "db action");
        Ok(match action {
            DbAction::GetAll if table == Table::ItemRequests => {
                ActionOutput::Joined(Self::list_item_requests(store).await?)
            }
            DbAction::GetAll => ActionOutput::Many(Self::get_all(store, table).await?),
            DbAction::GetById { id } => ActionOutput::One(Self::get_by_id(store, table, id).await?),
            DbAction::Create { data } => ActionOutput::One(Self::create(store, passwords, table, data).await?),
            DbAction::Update { id, data } => {
                ActionOutput::One(Self::update(store, passwords, table, id, data).await?)
            }
            DbAction::Delete { id } => ActionOutput::Deleted(Self::delete(store, table, id).await?),
        })
    }

    /// Every row of a table, transformed. No ordering is imposed.
    pub async fn get_all(store: &dyn RowStore, table: Table) -> Result<Vec<Record>, AppError> {
        let rows = store.select(&SelectQuery::from(table)).await?;
        Ok(rows.iter().map(|r| table.transform(r)).collect())
    }

    /// Item requests, newest first, each with the requester's name and department.
    /// Users are fetched only after the requests that name them; either failure aborts the listing.
    pub async fn list_item_requests(store: &dyn RowStore) -> Result<Vec<ItemRequestWithUser>, AppError> {
        let requests = store
            .select(&SelectQuery::from(Table::ItemRequests).order("created_at", false))
            .await?;
        let user_ids = referenced_user_ids(&requests);
        let users = if user_ids.is_empty() {
            Vec::new()
        } else {
            store
                .select(
                    &SelectQuery::from(Table::Users)
                        .select(&["id", "name", "department"])
                        .in_("id", user_ids),
                )
                .await?
        };
        Ok(join_item_requests(&requests, &users))
    }

    pub async fn get_by_id(store: &dyn RowStore, table: Table, id: Value) -> Result<Record, AppError> {
        let id = checked_id(id)?;
        let rows = store.select(&SelectQuery::from(table).eq("id", id).limit(1)).await?;
        rows.first()
            .map(|r| table.transform(r))
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    pub async fn create(
        store: &dyn RowStore,
        passwords: &PasswordPolicy,
        table: Table,
        data: Row,
    ) -> Result<Record, AppError> {
        let row = prepare_write(passwords, table, data)?;
        let created = store.insert(table, &row).await?;
        Ok(table.transform(&created))
    }

    pub async fn update(
        store: &dyn RowStore,
        passwords: &PasswordPolicy,
        table: Table,
        id: Value,
        data: Row,
    ) -> Result<Record, AppError> {
        let id = checked_id(id)?;
        let patch = prepare_write(passwords, table, data)?;
        if patch.is_empty() {
            return Err(AppError::InvalidInput("data must not be empty".into()));
        }
        let updated = store.update(table, &Filter::eq("id", id), &patch).await?;
        updated
            .first()
            .map(|r| table.transform(r))
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    pub async fn delete(store: &dyn RowStore, table: Table, id: Value) -> Result<Deleted, AppError> {
        let id = checked_id(id)?;
        let deleted = store.delete(table, &Filter::eq("id", id.clone())).await?;
        if deleted.is_empty() {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        Ok(Deleted { success: true, id })
    }
}

fn checked_id(id: Value) -> Result<Value, AppError> {
    let valid = match &id {
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
        _ => false,
    };
    if valid {
        Ok(id)
    } else {
        Err(AppError::InvalidInput("id must be a non-empty string or a number".into()))
    }
}

/// Column names from client keys; a user password is stored as a bcrypt hash.
fn prepare_write(passwords: &PasswordPolicy, table: Table, data: Row) -> Result<Row, AppError> {
    let mut row = keys_to_columns(data);
    if table == Table::Users {
        if let Some(Value::String(plain)) = row.get("password") {
            let hashed = passwords.hash(plain)?;
            row.insert("password".into(), Value::String(hashed));
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(4)
    }

    fn obj(v: Value) -> Row {
        v.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn join_skips_user_fetch_when_no_ids() {
        let store = MemoryStore::new().with_rows(Table::ItemRequests, vec![json!({ "id": 1, "user_id": null })]);
        let out = RecordService::list_item_requests(&store).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].user_name, "Unknown");
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn join_orders_newest_first() {
        let store = MemoryStore::new()
            .with_rows(
                Table::ItemRequests,
                vec![
                    json!({ "id": 1, "user_id": "u1", "created_at": "2024-01-01T00:00:00Z" }),
                    json!({ "id": 2, "user_id": "u1", "created_at": "2024-05-01T00:00:00Z" }),
                ],
            )
            .with_rows(Table::Users, vec![json!({ "id": "u1", "name": "Ann", "department": "Ops", "password": "p" })]);
        let out = RecordService::list_item_requests(&store).await.unwrap();
        let ids: Vec<_> = out.iter().map(|r| r.request.id.clone()).collect();
        assert_eq!(ids, vec![json!(2), json!(1)]);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn user_writes_hash_password_and_hide_it() {
        let store = MemoryStore::new();
        let p = policy();
        let created = RecordService::create(
            &store,
            &p,
            Table::Users,
            obj(json!({ "name": "Ann", "email": "ann@example.com", "password": "s3cret", "avatarUrl": "a.png" })),
        )
        .await
        .unwrap();
        let out = serde_json::to_value(&created).unwrap();
        assert!(out.get("password").is_none());
        assert_eq!(out["avatarUrl"], "a.png");

        let stored = &store.rows(Table::Users)[0];
        let hash = stored["password"].as_str().unwrap();
        assert_ne!(hash, "s3cret");
        assert!(p.verify("s3cret", hash).matched);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = MemoryStore::new().with_rows(Table::Inventory, vec![json!({ "id": 1, "item_name": "Pen", "quantity": 1 })]);
        let p = policy();

        let updated = RecordService::update(&store, &p, Table::Inventory, json!(1), obj(json!({ "quantity": 4 })))
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(updated).unwrap()["quantity"], 4);

        let missing = RecordService::update(&store, &p, Table::Inventory, json!(9), obj(json!({ "quantity": 4 }))).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let empty = RecordService::update(&store, &p, Table::Inventory, json!(1), Row::new()).await;
        assert!(matches!(empty, Err(AppError::InvalidInput(_))));

        let deleted = RecordService::delete(&store, Table::Inventory, json!(1)).await.unwrap();
        assert_eq!(deleted.id, json!(1));
        assert!(matches!(
            RecordService::delete(&store, Table::Inventory, json!(1)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn bad_ids_are_rejected_before_the_store() {
        let store = MemoryStore::new();
        for id in [json!(null), json!(""), json!({ "id": 1 }), json!([1])] {
            let res = RecordService::get_by_id(&store, Table::Notifications, id).await;
            assert!(matches!(res, Err(AppError::InvalidInput(_))));
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_aborts_the_join() {
        let store = MemoryStore::new();
        store.fail_with("timeout");
        let res = RecordService::dispatch(&store, &policy(), Table::ItemRequests, DbAction::GetAll).await;
        assert!(matches!(res, Err(AppError::Upstream(_))));
    }
}
