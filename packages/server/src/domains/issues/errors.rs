use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssueError {
    #[error("{0}")]
    Validation(String),

    #[error("Issue {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
