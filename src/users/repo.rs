use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::error::RepoResult;

const USER_COLUMNS: &str = "id, email, password_hash, refresh_token, password_reset_token, \
                            confirmed, avatar, created_at";

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn get_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn create(&self, new_user: &NewUser) -> RepoResult<User>;

    /// Store a refresh token, or clear it with `None`.
    async fn update_token(&self, id: Uuid, refresh_token: Option<&str>) -> RepoResult<()>;

    /// Mark the account as confirmed. Unknown emails are ignored.
    async fn confirm_email(&self, email: &str) -> RepoResult<()>;

    async fn update_avatar(&self, email: &str, url: &str) -> RepoResult<Option<User>>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()>;

    async fn update_reset_token(&self, id: Uuid, reset_token: Option<&str>) -> RepoResult<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new_user: &NewUser) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, avatar)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.avatar)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_token(&self, id: Uuid, refresh_token: Option<&str>) -> RepoResult<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(refresh_token)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn confirm_email(&self, email: &str) -> RepoResult<()> {
        sqlx::query("UPDATE users SET confirmed = TRUE WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_avatar(&self, email: &str, url: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET avatar = $2 WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(url)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_reset_token(&self, id: Uuid, reset_token: Option<&str>) -> RepoResult<()> {
        sqlx::query("UPDATE users SET password_reset_token = $2 WHERE id = $1")
            .bind(id)
            .bind(reset_token)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
