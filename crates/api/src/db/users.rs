//! Postgres user repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use dinehub_core::UserId;

use super::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, auth0_id, email, name, address_line1, city, country";

/// Users stored in the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth0_id = $1"
        ))
        .bind(auth0_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, user), fields(auth0_id = %user.auth0_id))]
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let NewUser {
            auth0_id,
            email,
            profile,
        } = user;

        sqlx::query_as::<_, User>(&format!(
            r"
            INSERT INTO users (auth0_id, email, name, address_line1, city, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(auth0_id)
        .bind(email)
        .bind(profile.name)
        .bind(profile.address_line1)
        .bind(profile.city)
        .bind(profile.country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "user"))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!(
            r"
            UPDATE users
            SET name = $2, address_line1 = $3, city = $4, country = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.address_line1)
        .bind(&user.city)
        .bind(&user.country)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
