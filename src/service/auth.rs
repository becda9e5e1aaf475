//! Email + password login against the users table.

use crate::error::AppError;
use crate::password::{Branch, PasswordPolicy};
use crate::store::{RowStore, SelectQuery};
use crate::table::Table;
use crate::transform::UserView;
use serde_json::Value;

pub struct AuthService;

impl AuthService {
    /// Unknown email and wrong password both yield `AppError::Authentication`.
    pub async fn login(
        store: &dyn RowStore,
        passwords: &PasswordPolicy,
        email: &str,
        password: &str,
    ) -> Result<UserView, AppError> {
        let users = store
            .select(&SelectQuery::from(Table::Users).eq("email", email).limit(1))
            .await?;
        let Some(user) = users.first() else {
            tracing::warn!("login failed: unknown email");
            return Err(AppError::Authentication);
        };

        let verdict = match user.get("password") {
            Some(Value::String(stored)) => passwords.verify(password, stored),
            _ => {
                tracing::warn!("login failed: user has no stored password");
                return Err(AppError::Authentication);
            }
        };
        if !verdict.matched {
            tracing::warn!(branch = ?verdict.branch, "login failed: wrong password");
            return Err(AppError::Authentication);
        }
        if verdict.branch == Branch::Legacy {
            let user_id = user.get("id").cloned().unwrap_or_default();
            tracing::warn!(%user_id, "login accepted a legacy plaintext password");
        }

        Ok(UserView::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn missing_password_column_is_a_failed_login() {
        let store = MemoryStore::new().with_rows(Table::Users, vec![json!({ "id": "u1", "email": "a@b.c" })]);
        let res = AuthService::login(&store, &PasswordPolicy::new(4), "a@b.c", "anything").await;
        assert!(matches!(res, Err(AppError::Authentication)));
    }

    #[tokio::test]
    async fn hashed_password_logs_in() {
        let p = PasswordPolicy::new(4);
        let store = MemoryStore::new().with_rows(
            Table::Users,
            vec![json!({ "id": "u1", "email": "a@b.c", "name": "Ann", "password": p.hash("pw").unwrap() })],
        );
        let user = AuthService::login(&store, &p, "a@b.c", "pw").await.unwrap();
        assert_eq!(user.name, json!("Ann"));
        assert!(matches!(
            AuthService::login(&store, &p, "a@b.c", "nope").await,
            Err(AppError::Authentication)
        ));
    }

    #[tokio::test]
    async fn legacy_plaintext_logs_in_for_users_with_and_without_id() {
        let p = PasswordPolicy::new(4);
        let store = MemoryStore::new().with_rows(
            Table::Users,
            vec![
                json!({ "id": 7, "email": "old@b.c", "name": "Old", "password": "plain" }),
                json!({ "email": "noid@b.c", "name": "Anon", "password": "plain" }),
            ],
        );
        let user = AuthService::login(&store, &p, "old@b.c", "plain").await.unwrap();
        assert_eq!(user.id, json!(7));
        let user = AuthService::login(&store, &p, "noid@b.c", "plain").await.unwrap();
        assert_eq!(user.id, Value::Null);
        assert!(matches!(
            AuthService::login(&store, &p, "old@b.c", "Plain").await,
            Err(AppError::Authentication)
        ));
    }
}
