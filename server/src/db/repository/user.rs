//! User Repository
//!
//! The user directory: lookups by internal record id or external Telegram
//! id, login upserts, role changes.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{USER_TABLE, User, UserRef, UserRole};
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &surrealdb::RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE telegram_id = $telegram_id LIMIT 1")
            .bind(("telegram_id", telegram_id))
            .await?;
        let user: Option<User> = result.take(0)?;
        Ok(user)
    }

    /// Resolve a pre-parsed identifier through whichever scheme it names.
    pub async fn resolve(&self, identifier: &UserRef) -> RepoResult<Option<User>> {
        match identifier {
            UserRef::Record(id) => self.find_by_id(id).await,
            UserRef::Telegram(telegram_id) => self.find_by_telegram_id(*telegram_id).await,
        }
    }

    /// Create-or-refresh on verified login.
    ///
    /// First sight creates the user with the default `consumer` role; later
    /// logins refresh name/username only. Role is never touched here.
    pub async fn upsert_login(
        &self,
        telegram_id: i64,
        first_name: &str,
        username: Option<&str>,
    ) -> RepoResult<User> {
        if self.find_by_telegram_id(telegram_id).await?.is_some() {
            // 登录刷新只更新姓名, 不碰角色
            let mut result = self
                .base
                .db()
                .query(
                    "UPDATE user SET first_name = $first_name, username = $username, \
                     updated_at = $now WHERE telegram_id = $telegram_id RETURN AFTER",
                )
                .bind(("first_name", first_name.to_string()))
                .bind(("username", username.map(|s| s.to_string())))
                .bind(("now", now_millis()))
                .bind(("telegram_id", telegram_id))
                .await?;
            let users: Vec<User> = result.take(0)?;
            return users
                .into_iter()
                .next()
                .ok_or_else(|| RepoError::Database("Failed to refresh user".to_string()));
        }

        let now = now_millis();
        let user = User {
            id: None,
            telegram_id,
            first_name: first_name.to_string(),
            username: username.map(|s| s.to_string()),
            role: UserRole::Consumer,
            location: None,
            phone_number: None,
            farm_name: None,
            farm_description: None,
            delivery_address: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Change role by external id. Role validity is guaranteed by the enum
    /// at the API boundary.
    pub async fn set_role(&self, telegram_id: i64, role: UserRole) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE user SET role = $role, updated_at = $now \
                 WHERE telegram_id = $telegram_id RETURN AFTER",
            )
            .bind(("role", role.as_str()))
            .bind(("now", now_millis()))
            .bind(("telegram_id", telegram_id))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))
    }

    /// Liveness probe used by the health endpoint.
    pub async fn count(&self) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct Row {
            count: i64,
        }
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS count FROM user GROUP ALL")
            .await?;
        let rows: Vec<Row> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }
}
