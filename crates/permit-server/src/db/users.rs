//! SQLite-backed credential store.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use permit_core::{CredentialStore, NewUser, StoreError, User, UserId};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    permit_type: String,
    renewed: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password,
            permit_type: row.permit_type,
            renewed: row.renewed,
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Credential store over the `users` table.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, first_name, last_name, email, password, permit_type, renewed
            FROM users
            WHERE email = ?
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(User::from))
    }

    async fn insert(&self, user: NewUser) -> Result<UserId, StoreError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (first_name, last_name, email, password, permit_type)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.permit_type)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            backend(e)
        })?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    async fn count_renewed(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE renewed = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        u64::try_from(count).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn mark_renewed(&self, email: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET renewed = TRUE WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
