use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

/// OtpCode - the single outstanding code for a phone identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OtpCode {
    pub identity: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
}

impl OtpCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub async fn find<'e, E: PgExecutor<'e>>(identity: &str, executor: E) -> Result<Option<Self>> {
        let code = sqlx::query_as::<_, OtpCode>("SELECT * FROM otp_codes WHERE identity = $1")
            .bind(identity)
            .fetch_optional(executor)
            .await?;
        Ok(code)
    }

    /// Read the row and hold its lock until the surrounding transaction ends.
    pub async fn find_for_update(identity: &str, conn: &mut PgConnection) -> Result<Option<Self>> {
        let code = sqlx::query_as::<_, OtpCode>(
            "SELECT * FROM otp_codes WHERE identity = $1 FOR UPDATE",
        )
        .bind(identity)
        .fetch_optional(conn)
        .await?;
        Ok(code)
    }

    /// Store a fresh code, replacing any previous one created at or before
    /// `cooldown_cutoff`.
    ///
    /// Returns `None` without writing when the existing code is newer than the
    /// cutoff. The check and the write are one statement, so concurrent
    /// requests for the same identity cannot both pass the cooldown.
    pub async fn issue<'e, E: PgExecutor<'e>>(
        identity: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        cooldown_cutoff: DateTime<Utc>,
        executor: E,
    ) -> Result<Option<Self>> {
        let issued = sqlx::query_as::<_, OtpCode>(
            r#"
            INSERT INTO otp_codes (identity, code, created_at, expires_at, attempts)
            VALUES ($1, $2, $3, $4, 0)
            ON CONFLICT (identity) DO UPDATE
                SET code = EXCLUDED.code,
                    created_at = EXCLUDED.created_at,
                    expires_at = EXCLUDED.expires_at,
                    attempts = 0
                WHERE otp_codes.created_at <= $5
            RETURNING *
            "#,
        )
        .bind(identity)
        .bind(code)
        .bind(created_at)
        .bind(expires_at)
        .bind(cooldown_cutoff)
        .fetch_optional(executor)
        .await?;
        Ok(issued)
    }

    /// Increment the failed-attempt counter, returning the new value.
    pub async fn record_failed_attempt<'e, E: PgExecutor<'e>>(
        identity: &str,
        executor: E,
    ) -> Result<i32> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE otp_codes SET attempts = attempts + 1
            WHERE identity = $1
            RETURNING attempts
            "#,
        )
        .bind(identity)
        .fetch_one(executor)
        .await?;
        Ok(attempts)
    }

    /// Consume the code. Returns whether a row was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(identity: &str, executor: E) -> Result<bool> {
        let result = sqlx::query("DELETE FROM otp_codes WHERE identity = $1")
            .bind(identity)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
