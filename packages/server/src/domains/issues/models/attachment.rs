use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::domains::issues::linker::AttachmentRef;

/// Photo metadata linked to an issue. The bytes live in the file store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub issue_id: i64,
    pub filename: String,
    pub mime: String,
    pub size: i64,
}

impl Attachment {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        issue_id: i64,
        reference: &AttachmentRef,
        executor: E,
    ) -> Result<Self> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (issue_id, filename, mime, size)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(issue_id)
        .bind(&reference.filename)
        .bind(&reference.mime)
        .bind(reference.size)
        .fetch_one(executor)
        .await?;
        Ok(attachment)
    }

    pub async fn find_by_issue<'e, E: PgExecutor<'e>>(
        issue_id: i64,
        executor: E,
    ) -> Result<Vec<Self>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE issue_id = $1 ORDER BY id ASC",
        )
        .bind(issue_id)
        .fetch_all(executor)
        .await?;
        Ok(attachments)
    }
}
