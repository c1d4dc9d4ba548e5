use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::domains::issues::filters::IssueFilters;

/// Status every issue starts in.
pub const INITIAL_STATUS: &str = "Created";

/// A reported civic issue. `status` mirrors the latest event in `issue_events`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Both coordinates must be JSON numbers; strings and nulls are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let lat = value.get("lat")?.as_f64()?;
        let lng = value.get("lng")?.as_f64()?;
        Some(Self { lat, lng })
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Validated input for a new issue row
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub category: String,
    pub description: String,
    pub location: Location,
    pub creator_id: Option<String>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Issue {
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(id: i64, executor: E) -> Result<Option<Self>> {
        let issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(issue)
    }

    pub async fn insert<'e, E: PgExecutor<'e>>(new: &NewIssue, executor: E) -> Result<Self> {
        let issue = sqlx::query_as::<_, Issue>(
            r#"
            INSERT INTO issues (category, description, lat, lng, status, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.location.lat)
        .bind(new.location.lng)
        .bind(INITIAL_STATUS)
        .bind(&new.creator_id)
        .fetch_one(executor)
        .await?;
        Ok(issue)
    }

    /// Overwrite the cached status. The updated row stays locked until the
    /// transaction ends, which serializes concurrent transitions per issue.
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        id: i64,
        status: &str,
        executor: E,
    ) -> Result<Option<Self>> {
        let issue = sqlx::query_as::<_, Issue>(
            "UPDATE issues SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(issue)
    }

    /// Newest first. Each filter present narrows the result.
    pub async fn list(filters: &IssueFilters, pool: &PgPool) -> Result<Vec<Self>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM issues WHERE TRUE");

        if !filters.statuses.is_empty() {
            query
                .push(" AND status = ANY(")
                .push_bind(filters.statuses.clone())
                .push(")");
        }

        if let Some(category) = filters.category_filter() {
            query.push(" AND category = ").push_bind(category.to_string());
        }

        if let Some(from) = filters.created_from() {
            query.push(" AND created_at >= ").push_bind(from);
        }

        if let Some(until) = filters.created_before() {
            query.push(" AND created_at < ").push_bind(until);
        }

        if let Some(pattern) = filters.text_pattern() {
            query
                .push(" AND (category ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(creator) = &filters.creator {
            query.push(" AND creator_id = ").push_bind(creator.clone());
        }

        query.push(" ORDER BY created_at DESC, id DESC");

        let issues = query.build_query_as::<Issue>().fetch_all(pool).await?;
        Ok(issues)
    }
}
