//! Credential store abstraction and its PostgreSQL implementation.
//!
//! Uniqueness of name and email is left to the store itself (unique
//! constraints, or a single critical section in memory), never to a
//! check-then-insert in the caller.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::auth::{AuthError, AuthResult, NewUser, Role, User, UserId, UserStatus};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, status, created_at, updated_at";

/// Trait for user/credential repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::NameTaken` / `AuthError::EmailTaken` - uniqueness violated
    async fn create_user(&self, user: NewUser) -> AuthResult<User>;

    /// Find user by exact email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by ID only if its status is `available`
    async fn find_available_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Mark the account as cancelled
    async fn deactivate_user(&self, user_id: UserId) -> AuthResult<()>;

    /// Cheap round trip to the store
    async fn health_check(&self) -> AuthResult<()>;
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> AuthResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, name, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_available_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND status = $2"
        ))
        .bind(user_id)
        .bind(UserStatus::Available.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn deactivate_user(&self, user_id: UserId) -> AuthResult<()> {
        sqlx::query("UPDATE users SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(UserStatus::Cancelled.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> AuthResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> AuthResult<User> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role
            .parse::<Role>()
            .map_err(|e| decode_error(e.to_string()))?,
        status: status.parse::<UserStatus>().map_err(decode_error)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn decode_error(message: String) -> AuthError {
    AuthError::Database(sqlx::Error::Decode(message.into()))
}

/// Translate the unique constraints from the users migration into
/// validation errors; anything else stays a database error.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_email_key") => return AuthError::EmailTaken,
                Some("users_name_key") => return AuthError::NameTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DatabaseConfig};
    use uuid::Uuid;

    async fn pg_repo() -> PgUserRepository {
        let config = DatabaseConfig {
            database_url: std::env::var("DATABASE_URL").ok(),
            max_connections: 5,
            min_connections: 1,
            ..DatabaseConfig::development()
        };
        let db = Database::new(&config)
            .await
            .expect("Failed to connect to database");
        db.migrate().await.expect("Migrations failed");
        PgUserRepository::new(db.pool().clone())
    }

    fn new_user(tag: &str) -> NewUser {
        let id = Uuid::new_v4();
        NewUser {
            id,
            name: format!("{tag}_{}", id.simple()),
            email: format!("{tag}_{}@example.com", id.simple()),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: Role::Client,
        }
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn test_pg_create_and_find() {
        let repo = pg_repo().await;
        let user = new_user("pg_find");

        let created = repo.create_user(user.clone()).await.unwrap();
        assert_eq!(created.id, user.id);
        assert_eq!(created.status, UserStatus::Available);

        let by_email = repo.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        repo.deactivate_user(user.id).await.unwrap();
        assert!(repo.find_available_by_id(user.id).await.unwrap().is_none());
        assert!(repo.find_by_id(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn test_pg_unique_constraints_map_to_validation_errors() {
        let repo = pg_repo().await;
        let first = new_user("pg_unique");
        repo.create_user(first.clone()).await.unwrap();

        let same_email = NewUser {
            id: Uuid::new_v4(),
            name: format!("other_{}", Uuid::new_v4().simple()),
            ..first.clone()
        };
        assert!(matches!(
            repo.create_user(same_email).await,
            Err(AuthError::EmailTaken)
        ));

        let same_name = NewUser {
            id: Uuid::new_v4(),
            email: format!("other_{}@example.com", Uuid::new_v4().simple()),
            ..first
        };
        assert!(matches!(
            repo.create_user(same_name).await,
            Err(AuthError::NameTaken)
        ));
    }
}
