use crate::store::Row;
use serde::Serialize;
use serde_json::Value;

/// Column value or null when the row does not carry it.
pub(crate) fn field(row: &Row, column: &str) -> Value {
    row.get(column).cloned().unwrap_or(Value::Null)
}

/// Public user shape. There is no password field, so it can never be serialized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Value,
    pub name: Value,
    pub email: Value,
    pub role: Value,
    pub department: Value,
    pub avatar_url: Value,
    pub created_at: Value,
}

impl From<&Row> for UserView {
    fn from(row: &Row) -> Self {
        UserView {
            id: field(row, "id"),
            name: field(row, "name"),
            email: field(row, "email"),
            role: field(row, "role"),
            department: field(row, "department"),
            avatar_url: field(row, "avatar_url"),
            created_at: field(row, "created_at"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestView {
    pub id: Value,
    pub user_id: Value,
    pub item_name: Value,
    pub quantity: Value,
    pub category: Value,
    pub status: Value,
    pub created_at: Value,
    pub updated_at: Value,
    pub admin_comment: Value,
}

impl From<&Row> for ItemRequestView {
    fn from(row: &Row) -> Self {
        ItemRequestView {
            id: field(row, "id"),
            user_id: field(row, "user_id"),
            item_name: field(row, "item_name"),
            quantity: field(row, "quantity"),
            category: field(row, "category"),
            status: field(row, "status"),
            created_at: field(row, "created_at"),
            updated_at: field(row, "updated_at"),
            admin_comment: field(row, "admin_comment"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub id: Value,
    pub item_name: Value,
    pub quantity: Value,
    pub category: Value,
    pub location: Value,
    pub created_at: Value,
    pub updated_at: Value,
}

impl From<&Row> for InventoryView {
    fn from(row: &Row) -> Self {
        InventoryView {
            id: field(row, "id"),
            item_name: field(row, "item_name"),
            quantity: field(row, "quantity"),
            category: field(row, "category"),
            location: field(row, "location"),
            created_at: field(row, "created_at"),
            updated_at: field(row, "updated_at"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: Value,
    pub user_id: Value,
    pub message: Value,
    pub read: Value,
    #[serde(rename = "type")]
    pub kind: Value,
    pub created_at: Value,
}

impl From<&Row> for NotificationView {
    fn from(row: &Row) -> Self {
        NotificationView {
            id: field(row, "id"),
            user_id: field(row, "user_id"),
            message: field(row, "message"),
            read: field(row, "read"),
            kind: field(row, "type"),
            created_at: field(row, "created_at"),
        }
    }
}

/// Any transformed row. Serializes as the inner view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    User(UserView),
    ItemRequest(ItemRequestView),
    Inventory(InventoryView),
    Notification(NotificationView),
}

pub fn user(row: &Row) -> Record {
    Record::User(row.into())
}

pub fn item_request(row: &Row) -> Record {
    Record::ItemRequest(row.into())
}

pub fn inventory_item(row: &Row) -> Record {
    Record::Inventory(row.into())
}

pub fn notification(row: &Row) -> Record {
    Record::Notification(row.into())
}
