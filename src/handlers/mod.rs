//! HTTP handlers: connection test, login, and the per-table action dispatcher.

pub mod auth;
pub mod connection;
pub mod db;
pub use auth::login;
pub use connection::test_connection;
pub use db::dispatch;
