//! Transition status action

use tracing::info;

use crate::domains::issues::errors::IssueError;
use crate::domains::issues::models::{Issue, IssueEvent};
use crate::kernel::ServerDeps;

/// Set a new status label and append the matching event.
///
/// Any non-empty label is accepted. The status update and the event insert
/// commit together; the update's row lock orders concurrent transitions so the
/// last event always matches the cached status.
pub async fn transition_status(
    issue_id: i64,
    new_status: &str,
    actor: Option<&str>,
    deps: &ServerDeps,
) -> Result<IssueEvent, IssueError> {
    let status = new_status.trim();
    if status.is_empty() {
        return Err(IssueError::Validation("Status is required".to_string()));
    }

    let mut tx = deps.db_pool.begin().await?;

    let issue = Issue::set_status(issue_id, status, &mut *tx)
        .await?
        .ok_or(IssueError::NotFound(issue_id))?;
    let event = IssueEvent::append(issue.id, status, actor, &mut *tx).await?;

    tx.commit().await?;

    info!(issue_id, status, actor = actor.unwrap_or("anonymous"), "Issue status changed");

    Ok(event)
}
