//! Test fixtures: unique identities and direct row manipulation for time travel.

use anyhow::Result;
use rand::Rng;
use sqlx::PgPool;

/// Random 10-digit domestic number, so parallel tests never share an identity.
pub fn unique_phone() -> String {
    format!("7{:09}", rand::thread_rng().gen_range(0..1_000_000_000u32))
}

/// Delivery address the mock gateway sees for a domestic number.
pub fn delivery_address(phone: &str) -> String {
    format!("+91{}", phone)
}

/// Move the code's timestamps back, as if `seconds` had passed.
pub async fn age_code(pool: &PgPool, identity: &str, seconds: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE otp_codes
        SET created_at = created_at - make_interval(secs => $2),
            expires_at = expires_at - make_interval(secs => $2)
        WHERE identity = $1
        "#,
    )
    .bind(identity)
    .bind(seconds as f64)
    .execute(pool)
    .await?;
    Ok(())
}

/// Push the code's expiry into the past.
pub async fn expire_code(pool: &PgPool, identity: &str) -> Result<()> {
    sqlx::query(
        "UPDATE otp_codes SET expires_at = NOW() - INTERVAL '1 second' WHERE identity = $1",
    )
    .bind(identity)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count_codes(pool: &PgPool, identity: &str) -> Result<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM otp_codes WHERE identity = $1")
            .bind(identity)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Category unique to one test, for list assertions on a shared database.
pub fn unique_category(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
