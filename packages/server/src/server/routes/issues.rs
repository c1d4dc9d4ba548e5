use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{ApiError, AuthError};
use crate::domains::issues::actions::{
    create_issue, get_issue, list_issues, transition_status, CreateIssueInput, IssueDetail,
};
use crate::domains::issues::models::Location;
use crate::domains::issues::{Issue, IssueEvent, IssueFilters, IssueQuery};
use crate::server::app::AppState;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Debug, Deserialize)]
pub struct CreateIssueBody {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub attachments: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct CreateIssueResponse {
    pub id: i64,
    pub status: String,
}

/// POST /api/issues - anonymous reports are allowed
pub async fn create_issue_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<CreateIssueBody>,
) -> Result<(StatusCode, Json<CreateIssueResponse>), ApiError> {
    let input = CreateIssueInput {
        category: body.category,
        description: body.description.unwrap_or_default(),
        location: body.location.as_ref().and_then(Location::from_value),
        attachments: body.attachments,
    };
    let actor = user.as_ref().map(|Extension(u)| u.identity.as_str());

    let issue = create_issue(input, actor, &state.deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateIssueResponse {
            id: issue.id,
            status: issue.status,
        }),
    ))
}

/// GET /api/issues
pub async fn list_issues_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Query(query): Query<IssueQuery>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let identity = match (query.mine.unwrap_or(false), user) {
        (true, None) => return Err(AuthError::AuthenticationRequired.into()),
        (_, user) => user.map(|Extension(u)| u.identity),
    };

    let filters = IssueFilters::from_query(&query, identity.as_deref())?;
    Ok(Json(list_issues(&filters, &state.deps).await?))
}

/// GET /api/issues/:id
pub async fn get_issue_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IssueDetail>, ApiError> {
    Ok(Json(get_issue(id, &state.deps).await?))
}

#[derive(Debug, Deserialize)]
pub struct TransitionStatusBody {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct TransitionStatusResponse {
    pub ok: bool,
    pub event: IssueEvent,
}

/// PATCH /api/issues/:id/status - admin only
pub async fn transition_status_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(id): Path<i64>,
    Json(body): Json<TransitionStatusBody>,
) -> Result<Json<TransitionStatusResponse>, ApiError> {
    let user = require_user(user)?;
    user.require_admin()?;

    let event = transition_status(id, &body.status, Some(&user.identity), &state.deps).await?;
    Ok(Json(TransitionStatusResponse { ok: true, event }))
}
