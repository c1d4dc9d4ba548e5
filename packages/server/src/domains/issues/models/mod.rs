pub mod attachment;
pub mod issue;
pub mod issue_event;

pub use attachment::Attachment;
pub use issue::{Issue, Location, NewIssue};
pub use issue_event::IssueEvent;
