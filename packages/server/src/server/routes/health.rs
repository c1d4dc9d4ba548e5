use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    /// Newest applied migration version, when the schema is readable
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_version: Option<i64>,
    /// Migrations recorded as failed; non-zero means the schema is suspect
    failed_migrations: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

struct SchemaState {
    latest: Option<i64>,
    failed: i64,
}

async fn schema_state(pool: &PgPool) -> Result<SchemaState, sqlx::Error> {
    let (latest, failed): (Option<i64>, i64) = sqlx::query_as(
        "SELECT MAX(version) FILTER (WHERE success), COUNT(*) FILTER (WHERE NOT success) \
         FROM _sqlx_migrations",
    )
    .fetch_one(pool)
    .await?;
    Ok(SchemaState { latest, failed })
}

/// GET /health
///
/// 200 when the database answers and every migration applied cleanly, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let answer = tokio::time::timeout(DB_TIMEOUT, schema_state(&state.deps.db_pool)).await;

    let response = match answer {
        Ok(Ok(schema)) => HealthResponse {
            status: if schema.failed == 0 { "healthy" } else { "degraded" },
            database: "ok",
            schema_version: schema.latest,
            failed_migrations: schema.failed,
            error: None,
        },
        Ok(Err(e)) => HealthResponse {
            status: "unhealthy",
            database: "error",
            schema_version: None,
            failed_migrations: 0,
            error: Some(e.to_string()),
        },
        Err(_) => HealthResponse {
            status: "unhealthy",
            database: "timeout",
            schema_version: None,
            failed_migrations: 0,
            error: Some(format!("No answer within {}s", DB_TIMEOUT.as_secs())),
        },
    };

    let code = if response.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
