//! Database health check.

use async_trait::async_trait;
use sqlx::PgPool;

use super::HealthCheckRepository;

/// Pings the database with `SELECT 1`.
#[derive(Clone)]
pub struct PgHealthCheckRepository {
    pool: PgPool,
}

impl PgHealthCheckRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheckRepository for PgHealthCheckRepository {
    async fn check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
