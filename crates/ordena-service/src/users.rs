//! User registration and lookup. Credentials and tokens belong to the auth
//! gateway; this service only manages the identity rows the role gates
//! check against.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use ordena_core::{Role, User, ValidationError};
use ordena_db::Database;

use crate::error::{ServiceError, ServiceResult};

/// User management service.
#[derive(Debug, Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        UserService { db }
    }

    /// Registers a user. Duplicate usernames and emails are business-rule
    /// rejections, not constraint errors.
    pub async fn register(&self, username: &str, email: &str, role: Role) -> ServiceResult<User> {
        let username = username.trim();
        let email = email.trim();

        if username.is_empty() {
            return Err(ValidationError::Required { field: "username".to_string() }.into());
        }
        if email.is_empty() {
            return Err(ValidationError::Required { field: "email".to_string() }.into());
        }
        if !email.contains('@') {
            return Err(ValidationError::InvalidFormat {
                field: "email".to_string(),
                reason: "missing @".to_string(),
            }
            .into());
        }

        if self.db.users().find_by_username(username).await?.is_some() {
            return Err(ServiceError::business_rule(format!(
                "username '{username}' is already taken"
            )));
        }
        if self.db.users().find_by_email(email).await?.is_some() {
            return Err(ServiceError::business_rule(format!(
                "email '{email}' is already registered"
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.db.users().insert(&user).await?;

        info!(id = %user.id, username = %user.username, role = ?user.role, "User registered");
        Ok(user)
    }

    /// Gets a user or fails with NotFound.
    pub async fn get(&self, id: &str) -> ServiceResult<User> {
        self.db
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Exact-username lookup.
    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self.db.users().find_by_username(username.trim()).await?)
    }

    /// All users of a role.
    pub async fn find_by_role(&self, role: Role) -> ServiceResult<Vec<User>> {
        Ok(self.db.users().find_by_role(role).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ordena_db::DbConfig;

    async fn service() -> UserService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        UserService::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let svc = service().await;
        let user = svc
            .register("ana", "ana@example.com", Role::Operador)
            .await
            .unwrap();
        assert_eq!(user.role, Role::Operador);

        let found = svc.find_by_username("ana").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(svc.get(&user.id).await.unwrap().email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_duplicates_are_business_rules() {
        let svc = service().await;
        svc.register("ana", "ana@example.com", Role::Cliente).await.unwrap();

        let err = svc
            .register("ana", "other@example.com", Role::Cliente)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));

        let err = svc
            .register("bruno", "ana@example.com", Role::Cliente)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let svc = service().await;

        let err = svc.register("  ", "ana@example.com", Role::Cliente).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = svc.register("ana", "not-an-email", Role::Cliente).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
