use serde::Serialize;

use crate::domains::issues::errors::IssueError;
use crate::domains::issues::models::{Attachment, Issue, IssueEvent};
use crate::kernel::ServerDeps;

/// An issue with its full status history and attachments
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    pub issue: Issue,
    pub events: Vec<IssueEvent>,
    pub attachments: Vec<Attachment>,
}

/// Read the issue, history and attachments from one snapshot.
pub async fn get_issue(issue_id: i64, deps: &ServerDeps) -> Result<IssueDetail, IssueError> {
    let mut tx = deps.db_pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let issue = Issue::find_by_id(issue_id, &mut *tx)
        .await?
        .ok_or(IssueError::NotFound(issue_id))?;
    let events = IssueEvent::find_by_issue(issue_id, &mut *tx).await?;
    let attachments = Attachment::find_by_issue(issue_id, &mut *tx).await?;

    tx.commit().await?;

    Ok(IssueDetail {
        issue,
        events,
        attachments,
    })
}
