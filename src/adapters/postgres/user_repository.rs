//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::marketplace::{NewUser, StoreError, User, UserId};
use crate::ports::UserRepository;

/// PostgreSQL implementation of the UserRepository port.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    image: String,
    earned: i64,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id).map_err(StoreError::database)?,
            email: row.email,
            name: row.name,
            image: row.image,
            earned: row.earned,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, image, earned FROM users WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::database)?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        // Concurrent first requests for the same caller race here; the
        // conflict clause lets the loser fall through to the re-select.
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, image, earned)
            VALUES ($1, $2, $3, $4, 0)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .execute(&self.pool)
        .await
        .map_err(StoreError::database)?;

        let row: UserRow =
            sqlx::query_as("SELECT id, email, name, image, earned FROM users WHERE id = $1")
                .bind(user.id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::database)?;

        row.try_into()
    }
}
