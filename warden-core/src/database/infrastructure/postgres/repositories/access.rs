use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::access::AccessRepository;
use crate::domain::Access;
use crate::error::{Result, UserError};

/// PostgreSQL-backed lookup of group access grants.
#[derive(Clone, Debug)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccessRepository for PostgresAccessRepository {
    async fn find_group_access(&self, group_id: Uuid) -> Result<Vec<Access>> {
        let access = sqlx::query_as::<_, Access>(
            r#"
            SELECT access.id, access.name
            FROM access
            INNER JOIN access_groups ON access_groups.access_id = access.id
            WHERE access_groups.group_id = $1
            ORDER BY access.name
            "#,
        )
        .bind(group_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            UserError::Internal(format!("Failed to get group access: {}", e))
        })?;

        Ok(access)
    }
}
