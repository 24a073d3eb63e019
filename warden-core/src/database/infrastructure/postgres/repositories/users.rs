use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::users::UsersRepository;
use crate::domain::{
    Actor, Group, NewUser, User, UserCredentials, UserLookup, UserUpdate,
};
use crate::error::{Result, UserError};

const USER_PROJECTION: &str = r#"
    SELECT users.id, users.company_id, users.region_id, users.branch_id,
           users.username, users.name, users.email,
           groups.id AS group_id, groups.name AS group_name
    FROM users
    JOIN groups ON users.group_id = groups.id
"#;

const CREDENTIALS_PROJECTION: &str = r#"
    SELECT users.id, users.company_id, users.region_id, users.branch_id,
           users.username, users.name, users.email,
           groups.id AS group_id, groups.name AS group_name,
           users.password
    FROM users
    JOIN groups ON users.group_id = groups.id
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    company_id: Uuid,
    region_id: Option<Uuid>,
    branch_id: Option<Uuid>,
    username: String,
    name: String,
    email: String,
    group_id: Uuid,
    group_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            company_id: row.company_id,
            region_id: row.region_id,
            branch_id: row.branch_id,
            username: row.username,
            name: row.name,
            email: row.email,
            group: Group {
                id: row.group_id,
                name: row.group_name,
                access: Vec::new(),
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find_one(&self, lookup: &UserLookup) -> Result<Option<User>> {
        let sql = format!("{USER_PROJECTION} WHERE {} = $1", lookup_column(lookup));
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match lookup {
            UserLookup::Id(id) => query.bind(*id),
            UserLookup::Username(value) | UserLookup::Email(value) => {
                query.bind(value.as_str())
            }
        };

        let row = query.fetch_optional(self.pool()).await.map_err(|e| {
            UserError::Internal(format!("Failed to get user by {}: {}", lookup, e))
        })?;

        Ok(row.map(User::from))
    }

    async fn find_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<User> {
        let sql = format!("{USER_PROJECTION} WHERE users.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                UserError::Internal(format!("Failed to read back user {}: {}", id, e))
            })?;

        Ok(row.into())
    }
}

fn lookup_column(lookup: &UserLookup) -> &'static str {
    match lookup {
        UserLookup::Id(_) => "users.id",
        UserLookup::Username(_) => "users.username",
        UserLookup::Email(_) => "users.email",
    }
}

fn map_write_error(action: &str, err: sqlx::Error) -> UserError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.constraint() {
            Some("users_username_key") => {
                return UserError::Internal("Username already exists".to_string());
            }
            Some("users_email_key") => {
                return UserError::Internal("Email already exists".to_string());
            }
            Some("users_group_id_fkey") => {
                return UserError::Internal("Group does not exist".to_string());
            }
            _ => {}
        }
    }
    UserError::Internal(format!("Failed to {}: {}", action, err))
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.find_one(&UserLookup::Id(id)).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one(&UserLookup::Username(username.to_string()))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one(&UserLookup::Email(email.to_string())).await
    }

    async fn find_credentials(
        &self,
        lookup: &UserLookup,
    ) -> Result<Option<UserCredentials>> {
        let sql = format!(
            "{CREDENTIALS_PROJECTION} WHERE {} = $1",
            lookup_column(lookup)
        );
        let query = sqlx::query_as::<_, CredentialsRow>(&sql);
        let query = match lookup {
            UserLookup::Id(id) => query.bind(*id),
            UserLookup::Username(value) | UserLookup::Email(value) => {
                query.bind(value.as_str())
            }
        };

        let row = query.fetch_optional(self.pool()).await.map_err(|e| {
            UserError::Internal(format!(
                "Failed to get credentials by {}: {}",
                lookup, e
            ))
        })?;

        Ok(row.map(|r| UserCredentials {
            user: r.user.into(),
            password_hash: r.password,
        }))
    }

    async fn find_group_id(&self, user_id: Uuid) -> Result<Option<Uuid>> {
        let group_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT group_id FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            UserError::Internal(format!("Failed to get user group: {}", e))
        })?;

        Ok(group_id)
    }

    async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
        actor: Actor,
    ) -> Result<User> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            UserError::Internal(format!("Failed to start transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, company_id, region_id, branch_id, group_id,
                username, name, email, password, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(user.company_id)
        .bind(user.region_id)
        .bind(user.branch_id)
        .bind(user.group_id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(actor.id())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("create user", e))?;

        let created = Self::find_in_tx(&mut tx, user.id).await?;

        tx.commit().await.map_err(|e| {
            UserError::Internal(format!("Failed to commit transaction: {}", e))
        })?;

        info!(
            user_id = %created.id,
            username = %created.username,
            actor = %actor,
            "created user"
        );
        Ok(created)
    }

    async fn update(&self, update: &UserUpdate, actor: Actor) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                region_id = CASE WHEN $1 THEN $2 ELSE region_id END,
                branch_id = CASE WHEN $3 THEN $4 ELSE branch_id END,
                group_id = COALESCE($5, group_id),
                name = COALESCE($6, name),
                updated_by = $7,
                updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(update.region_id.is_some())
        .bind(update.region_id.flatten())
        .bind(update.branch_id.is_some())
        .bind(update.branch_id.flatten())
        .bind(update.group_id)
        .bind(update.name.as_deref())
        .bind(actor.id())
        .bind(Utc::now())
        .bind(update.id)
        .execute(self.pool())
        .await
        .map_err(|e| map_write_error("update user", e))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(format!("User {} not found", update.id)));
        }

        info!(user_id = %update.id, actor = %actor, "updated user");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                UserError::Internal(format!("Failed to delete user: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(format!("User {} not found", id)));
        }

        info!(user_id = %id, "deleted user");
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        actor: Actor,
    ) -> Result<()> {
        let mut tx = self.pool().begin().await.map_err(|e| {
            UserError::Internal(format!("Failed to start transaction: {}", e))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                password = $1,
                updated_by = $2,
                updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(password_hash)
        .bind(actor.id())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            UserError::Internal(format!("Failed to update password: {}", e))
        })?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back.
            return Err(UserError::NotFound(format!("User {} not found", id)));
        }

        tx.commit().await.map_err(|e| {
            UserError::Internal(format!("Failed to commit transaction: {}", e))
        })?;

        info!(user_id = %id, actor = %actor, "changed user password");
        Ok(())
    }
}
