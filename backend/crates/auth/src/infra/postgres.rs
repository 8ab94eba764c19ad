//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{reset_token::ResetToken, session::Session, user::User};
use crate::domain::repository::{ResetTokenRepository, SessionStore, UserRepository};
use crate::domain::value_object::{
    email::Email,
    session_id::SessionId,
    user_id::{ResetTokenId, UserId},
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed credential store (users and reset tokens)
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                email,
                password_hash,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a race with a concurrent registration
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                email,
                password_hash,
                created_at,
                updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                email,
                password_hash,
                created_at,
                updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
    ) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(password_hash.as_phc_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for PgAuthRepository {
    async fn replace_for_user(&self, token: &ResetToken) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(token.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        // A concurrent issue for the same user may have inserted between
        // our DELETE and INSERT; the newest token wins either way.
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (
                reset_token_id,
                user_id,
                token_hash,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                reset_token_id = EXCLUDED.reset_token_id,
                token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_valid(&self, token_hash: &[u8]) -> AuthResult<Option<ResetToken>> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            SELECT
                reset_token_id,
                user_id,
                token_hash,
                expires_at,
                created_at
            FROM password_reset_tokens
            WHERE token_hash = $1 AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResetTokenRow::into_token))
    }

    async fn redeem(
        &self,
        token_hash: &[u8],
        new_password: &UserPassword,
    ) -> AuthResult<Option<UserId>> {
        let mut tx = self.pool.begin().await?;

        // Consume first: of two concurrent redeems only one gets the row back
        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            DELETE FROM password_reset_tokens
            WHERE token_hash = $1 AND expires_at > $2
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        let updated = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(new_password.as_phc_string())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(UserId::from_uuid(user_id)))
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired reset tokens");

        Ok(deleted)
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// PostgreSQL-backed session store
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    async fn get(&self, session_id: &SessionId) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                user_id,
                expires_at,
                created_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at > $2
            "#,
        )
        .bind(session_id.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn set(&self, session_id: &SessionId, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                expires_at,
                created_at
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session_id.as_str())
        .bind(session.user_id.as_uuid())
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn destroy(&self, session_id: &SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_db(self.password_hash),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ResetTokenRow {
    reset_token_id: Uuid,
    user_id: Uuid,
    token_hash: Vec<u8>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ResetTokenRow {
    fn into_token(self) -> ResetToken {
        ResetToken {
            id: ResetTokenId::from_uuid(self.reset_token_id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
