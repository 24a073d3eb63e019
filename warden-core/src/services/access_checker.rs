use std::fmt;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::database::ports::{AccessRepository, UsersRepository};
use crate::domain::{AccessName, AccessSet};
use crate::error::{Result, UserError};

/// Decides whether a user's group grants a required access name.
///
/// A check succeeds when the group holds `root`, the parent scope of a
/// compound name, or the exact name. Every call reads the store afresh.
#[derive(Clone)]
pub struct AccessChecker {
    users: Arc<dyn UsersRepository>,
    access: Arc<dyn AccessRepository>,
}

impl fmt::Debug for AccessChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessChecker")
            .field("users_refs", &Arc::strong_count(&self.users))
            .field("access_refs", &Arc::strong_count(&self.access))
            .finish()
    }
}

impl AccessChecker {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        access: Arc<dyn AccessRepository>,
    ) -> Self {
        Self { users, access }
    }

    /// `Ok(())` when authorized. `NotFound` when the user is unknown or no
    /// grant matches; `Internal` on storage faults.
    pub async fn is_authorized(&self, user_id: Uuid, required_access: &str) -> Result<()> {
        let required = AccessName::parse(required_access);

        let group_id = self
            .users
            .find_group_id(user_id)
            .await?
            .ok_or_else(|| denied(user_id, &required))?;

        let grants: AccessSet = self
            .access
            .find_group_access(group_id)
            .await?
            .iter()
            .collect();

        if grants.grants(&required) {
            debug!(user_id = %user_id, access = %required, "access granted");
            Ok(())
        } else {
            debug!(user_id = %user_id, access = %required, "access denied");
            Err(denied(user_id, &required))
        }
    }

    /// Boolean form of [`is_authorized`](Self::is_authorized); only storage
    /// faults are errors.
    pub async fn has_access(&self, user_id: Uuid, required_access: &str) -> Result<bool> {
        match self.is_authorized(user_id, required_access).await {
            Ok(()) => Ok(true),
            Err(UserError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn denied(user_id: Uuid, required: &AccessName<'_>) -> UserError {
    UserError::NotFound(format!("No access '{}' for user {}", required, user_id))
}
