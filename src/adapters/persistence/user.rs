use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    use_cases::auth::{UserAuth, UserProfile, UserRepo},
};

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn find_auth_by_email(&self, email: &str) -> AppResult<Option<UserAuth>> {
        let rec = sqlx::query_as::<_, UserAuth>(
            r#"SELECT id, name, email, password_hash, refresh_token,
                      reset_token_hash, reset_token_expires_at, created_at
               FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn find_auth_by_id(&self, id: Uuid) -> AppResult<Option<UserAuth>> {
        let rec = sqlx::query_as::<_, UserAuth>(
            r#"SELECT id, name, email, password_hash, refresh_token,
                      reset_token_hash, reset_token_expires_at, created_at
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn find_profile_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let rec = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        now: NaiveDateTime,
        new_password_hash: &str,
    ) -> AppResult<Option<Uuid>> {
        // Single statement so a token can only ever be consumed once, even
        // under concurrent attempts. Consuming a reset also revokes any live
        // refresh token.
        let rec = sqlx::query_scalar::<_, Uuid>(
            r#"UPDATE users
               SET password_hash = $3,
                   reset_token_hash = NULL,
                   reset_token_expires_at = NULL,
                   refresh_token = NULL
               WHERE reset_token_hash = $1 AND reset_token_expires_at > $2
               RETURNING id"#,
        )
        .bind(token_hash)
        .bind(now)
        .bind(new_password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rec)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
