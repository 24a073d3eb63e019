use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Access;
use crate::error::Result;

#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Every access grant attached to the group, ordered by name. An unknown
    /// group yields an empty list.
    async fn find_group_access(&self, group_id: Uuid) -> Result<Vec<Access>>;
}
