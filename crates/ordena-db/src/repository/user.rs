//! User repository. Username and email carry UNIQUE constraints; the service
//! layer pre-checks with the finders to report a business-rule error instead
//! of surfacing the constraint violation.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ordena_core::{Role, User};

const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user row.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all users of a given role.
    pub async fn find_by_role(&self, role: Role) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY username"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    fn user_row(username: &str, email: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_finders() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = user_row("ana", "ana@example.com", Role::Operador);
        repo.insert(&user).await.unwrap();

        let by_name = repo.find_by_username("ana").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.role, Role::Operador);

        let by_email = repo.find_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.find_by_username("bruno").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert(&user_row("ana", "ana@example.com", Role::Cliente)).await.unwrap();
        let err = repo
            .insert(&user_row("ana", "other@example.com", Role::Cliente))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_find_by_role() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert(&user_row("ana", "ana@example.com", Role::Admin)).await.unwrap();
        repo.insert(&user_row("bruno", "bruno@example.com", Role::Cliente)).await.unwrap();
        repo.insert(&user_row("carla", "carla@example.com", Role::Cliente)).await.unwrap();

        let clients = repo.find_by_role(Role::Cliente).await.unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].username, "bruno");
    }
}
