//! Services composing the row store, transforms and password policy.

mod action;
mod auth;
mod records;
pub use action::DbAction;
pub use auth::AuthService;
pub use records::{ActionOutput, RecordService};
