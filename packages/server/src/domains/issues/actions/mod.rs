//! Issue lifecycle actions. These are the only writers of issue state.

mod create_issue;
mod get_issue;
mod list_issues;
mod transition_status;

pub use create_issue::{create_issue, CreateIssueInput};
pub use get_issue::{get_issue, IssueDetail};
pub use list_issues::list_issues;
pub use transition_status::transition_status;
