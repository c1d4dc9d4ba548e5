use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Append-only status history entry. Never updated or deleted; ordered by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IssueEvent {
    pub id: i64,
    pub issue_id: i64,
    pub status: String,
    pub at: DateTime<Utc>,
    pub actor_identity: Option<String>,
}

impl IssueEvent {
    pub async fn append<'e, E: PgExecutor<'e>>(
        issue_id: i64,
        status: &str,
        actor_identity: Option<&str>,
        executor: E,
    ) -> Result<Self> {
        let event = sqlx::query_as::<_, IssueEvent>(
            r#"
            INSERT INTO issue_events (issue_id, status, actor_identity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(issue_id)
        .bind(status)
        .bind(actor_identity)
        .fetch_one(executor)
        .await?;
        Ok(event)
    }

    /// Full history, oldest first.
    pub async fn find_by_issue<'e, E: PgExecutor<'e>>(
        issue_id: i64,
        executor: E,
    ) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, IssueEvent>(
            "SELECT * FROM issue_events WHERE issue_id = $1 ORDER BY id ASC",
        )
        .bind(issue_id)
        .fetch_all(executor)
        .await?;
        Ok(events)
    }

    pub async fn latest_for_issue<'e, E: PgExecutor<'e>>(
        issue_id: i64,
        executor: E,
    ) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, IssueEvent>(
            "SELECT * FROM issue_events WHERE issue_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(issue_id)
        .fetch_optional(executor)
        .await?;
        Ok(event)
    }
}
