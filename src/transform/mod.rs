//! Row → API shape mapping. Stored rows use snake_case columns; responses use camelCase fields.

mod join;
mod rows;

pub use join::{join_item_requests, referenced_user_ids, ItemRequestWithUser, UNKNOWN_USER_NAME};
pub use rows::*;
