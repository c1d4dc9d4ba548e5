use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::fmt;
use std::str::FromStr;

/// The two fixed roles. Derived from the identity, never chosen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
        }
    }

    /// `Admin` for identities on the allow-list, `Citizen` otherwise.
    pub fn for_identity(identity: &str, admin_identifiers: &[String]) -> Self {
        if is_admin_identifier(identity, admin_identifiers) {
            Role::Admin
        } else {
            Role::Citizen
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "admin" => Ok(Role::Admin),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}

/// User - one row per phone identity, created lazily
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub identity: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Citizen)
    }

    pub async fn find_by_identity<'e, E: PgExecutor<'e>>(
        identity: &str,
        executor: E,
    ) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE identity = $1")
            .bind(identity)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// Insert or overwrite the role for `identity`.
    pub async fn upsert_with_role<'e, E: PgExecutor<'e>>(
        identity: &str,
        role: Role,
        executor: E,
    ) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity, role)
            VALUES ($1, $2)
            ON CONFLICT (identity) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(identity)
        .bind(role.as_str())
        .fetch_one(executor)
        .await?;
        Ok(user)
    }

    /// Insert with `role_if_new`; an existing row keeps its role.
    pub async fn ensure_exists<'e, E: PgExecutor<'e>>(
        identity: &str,
        role_if_new: Role,
        executor: E,
    ) -> Result<Self> {
        // The no-op update makes RETURNING yield the existing row.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity, role)
            VALUES ($1, $2)
            ON CONFLICT (identity) DO UPDATE SET identity = EXCLUDED.identity
            RETURNING *
            "#,
        )
        .bind(identity)
        .bind(role_if_new.as_str())
        .fetch_one(executor)
        .await?;
        Ok(user)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Check if an identity is on the admin allow-list (exact match after trimming)
pub fn is_admin_identifier(identity: &str, admin_identifiers: &[String]) -> bool {
    let identity = identity.trim();
    admin_identifiers.iter().any(|admin_id| admin_id.trim() == identity)
}
