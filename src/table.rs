//! The closed set of tables exposed over `/db/:table`.

use crate::error::AppError;
use crate::store::Row;
use crate::transform::{self, Record};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    ItemRequests,
    Inventory,
    Notifications,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Users,
        Table::ItemRequests,
        Table::Inventory,
        Table::Notifications,
    ];

    /// Table name in the backing store.
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::ItemRequests => "item_requests",
            Table::Inventory => "inventory",
            Table::Notifications => "notifications",
        }
    }

    /// Map one stored row to its API shape.
    pub fn transform(self, row: &Row) -> Record {
        match self {
            Table::Users => transform::user(row),
            Table::ItemRequests => transform::item_request(row),
            Table::Inventory => transform::inventory_item(row),
            Table::Notifications => transform::notification(row),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput("Invalid table name".into()))
    }
}
