//! Create issue action

use serde_json::Value;
use tracing::info;

use crate::domains::auth::models::{Role, User};
use crate::domains::issues::errors::IssueError;
use crate::domains::issues::linker::link_refs;
use crate::domains::issues::models::issue::INITIAL_STATUS;
use crate::domains::issues::models::{Attachment, Issue, IssueEvent, Location, NewIssue};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default)]
pub struct CreateIssueInput {
    pub category: String,
    pub description: String,
    pub location: Option<Location>,
    /// Raw client references; malformed entries are dropped
    pub attachments: Vec<Value>,
}

/// Create an issue with its first `Created` event and any attachments.
///
/// Runs as one transaction: user upsert, issue row, attachment rows, event.
pub async fn create_issue(
    input: CreateIssueInput,
    actor: Option<&str>,
    deps: &ServerDeps,
) -> Result<Issue, IssueError> {
    let category = input.category.trim();
    if category.is_empty() {
        return Err(IssueError::Validation("Category is required".to_string()));
    }
    let location = input
        .location
        .filter(Location::is_finite)
        .ok_or_else(|| IssueError::Validation("Location with numeric lat and lng is required".to_string()))?;

    let actor = actor.map(str::trim).filter(|a| !a.is_empty());
    let references = link_refs(&input.attachments);

    let mut tx = deps.db_pool.begin().await?;

    if let Some(identity) = actor {
        User::ensure_exists(
            identity,
            Role::for_identity(identity, &deps.admin_identifiers),
            &mut *tx,
        )
        .await?;
    }

    let issue = Issue::insert(
        &NewIssue {
            category: category.to_string(),
            description: input.description.trim().to_string(),
            location,
            creator_id: actor.map(str::to_string),
        },
        &mut *tx,
    )
    .await?;

    for reference in &references {
        Attachment::insert(issue.id, reference, &mut *tx).await?;
    }

    IssueEvent::append(issue.id, INITIAL_STATUS, actor, &mut *tx).await?;

    tx.commit().await?;

    info!(
        issue_id = issue.id,
        category = %issue.category,
        attachments = references.len(),
        creator = actor.unwrap_or("anonymous"),
        "Issue created"
    );

    Ok(issue)
}
