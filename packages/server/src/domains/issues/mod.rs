//! Issues domain - civic issue reports and their status history
//!
//! Responsibilities:
//! - Creating issues with optional photo attachments
//! - Filtering and listing issues
//! - Recording status transitions in an append-only event log

pub mod actions;
pub mod errors;
pub mod filters;
pub mod linker;
pub mod models;

pub use errors::IssueError;
pub use filters::{IssueFilters, IssueQuery};
pub use models::{Attachment, Issue, IssueEvent};
