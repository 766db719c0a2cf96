use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::auth::token::generate_key;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub is_admin: bool,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_admin, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Resolve an auth token key to its owning user.
    pub async fn find_by_token(db: &PgPool, key: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.is_admin, u.created_at
            FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. Returns None when the email
    /// is already registered; the UNIQUE(email) constraint catches the
    /// registration that loses a race past the handler's pre-check.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, username, email, password_hash, is_admin, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

/// Opaque bearer token, one row per user.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

impl AuthToken {
    /// Return the user's token, creating one on first login. A concurrent
    /// first login may win the insert; the UNIQUE(user_id) constraint makes
    /// the loser fall through to re-reading the winner's row.
    pub async fn get_or_create(db: &PgPool, user_id: i64) -> anyhow::Result<AuthToken> {
        if let Some(token) = Self::find_by_user(db, user_id).await? {
            return Ok(token);
        }

        let key = generate_key();
        let inserted = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(&key)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        match inserted {
            Some(token) => Ok(token),
            None => {
                let token = sqlx::query_as::<_, AuthToken>(
                    r#"
                    SELECT key, user_id, created_at
                    FROM auth_tokens
                    WHERE user_id = $1
                    "#,
                )
                .bind(user_id)
                .fetch_one(db)
                .await?;
                Ok(token)
            }
        }
    }

    pub async fn find_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT key, user_id, created_at
            FROM auth_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    /// Revoke the user's token. Logout after logout is a no-op here; the
    /// second request already fails at the extractor.
    pub async fn delete_for_user(db: &PgPool, user_id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}
