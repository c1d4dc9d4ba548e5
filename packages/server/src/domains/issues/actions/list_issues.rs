use crate::domains::issues::errors::IssueError;
use crate::domains::issues::filters::IssueFilters;
use crate::domains::issues::models::Issue;
use crate::kernel::ServerDeps;

/// Matching issues, most recently created first. Empty when nothing matches.
pub async fn list_issues(filters: &IssueFilters, deps: &ServerDeps) -> Result<Vec<Issue>, IssueError> {
    Ok(Issue::list(filters, &deps.db_pool).await?)
}
