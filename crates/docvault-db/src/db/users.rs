use docvault_core::{models::User, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for reading user accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
