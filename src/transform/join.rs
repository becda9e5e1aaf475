//! In-memory join of item requests with their requester, since the store API has no joins.

use super::rows::{field, ItemRequestView};
use crate::store::Row;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const UNKNOWN_USER_NAME: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestWithUser {
    #[serde(flatten)]
    pub request: ItemRequestView,
    /// The stored name as-is, or "Unknown".
    pub user_name: Value,
    pub user_department: Value,
}

/// Lookup key for an id. Numeric and string ids referring to the same value collide on purpose.
fn id_key(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Distinct `user_id` values in first-seen order. Null ids are skipped.
pub fn referenced_user_ids(requests: &[Row]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for request in requests {
        let id = field(request, "user_id");
        if let Some(key) = id_key(&id) {
            if seen.insert(key) {
                ids.push(id);
            }
        }
    }
    ids
}

fn non_empty(v: &Value) -> Option<&Value> {
    match v {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other),
    }
}

/// One output record per request, in request order. `users` only needs `id`, `name` and `department`.
pub fn join_item_requests(requests: &[Row], users: &[Row]) -> Vec<ItemRequestWithUser> {
    let by_id: HashMap<String, &Row> = users
        .iter()
        .filter_map(|u| id_key(&field(u, "id")).map(|k| (k, u)))
        .collect();

    requests
        .iter()
        .map(|request| {
            let user = id_key(&field(request, "user_id")).and_then(|k| by_id.get(&k).copied());
            let name = user.and_then(|u| u.get("name")).and_then(non_empty);
            let department = user.and_then(|u| u.get("department")).and_then(non_empty);
            ItemRequestWithUser {
                request: ItemRequestView::from(request),
                user_name: name
                    .cloned()
                    .unwrap_or_else(|| Value::from(UNKNOWN_USER_NAME)),
                user_department: department.cloned().unwrap_or(Value::Null),
            }
        })
        .collect()
}
