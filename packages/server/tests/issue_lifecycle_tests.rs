//! Integration tests for issue creation, listing and status transitions.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use civic_core::domains::auth::models::{Role, User};
use civic_core::domains::issues::actions::{
    create_issue, get_issue, list_issues, transition_status, CreateIssueInput,
};
use civic_core::domains::issues::models::{IssueEvent, Location};
use civic_core::domains::issues::{Issue, IssueError, IssueFilters};
use serde_json::json;
use test_context::test_context;

use common::{unique_category, unique_phone, TestHarness};

fn input(category: &str) -> CreateIssueInput {
    CreateIssueInput {
        category: category.to_string(),
        description: String::new(),
        location: Some(Location { lat: 12.9, lng: 77.6 }),
        attachments: Vec::new(),
    }
}

/// The cached status must equal the latest event's status.
async fn assert_status_matches_history(ctx: &TestHarness, issue_id: i64) {
    let issue = Issue::find_by_id(issue_id, &ctx.db_pool).await.unwrap().unwrap();
    let latest = IssueEvent::latest_for_issue(issue_id, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(issue.status, latest.status);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_create_pothole_records_created_event(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let issue = create_issue(input("Pothole"), None, &deps).await.unwrap();
    assert_eq!(issue.status, "Created");
    assert_eq!(issue.category, "Pothole");
    assert!(issue.creator_id.is_none());

    let detail = get_issue(issue.id, &deps).await.unwrap();
    assert_eq!(detail.events.len(), 1);
    assert_eq!(detail.events[0].status, "Created");
    assert!(detail.events[0].actor_identity.is_none());
    assert!(detail.attachments.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_transition_appends_event(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let admin = "8888888888";

    let issue = create_issue(input("Pothole"), None, &deps).await.unwrap();
    let event = transition_status(issue.id, "Resolved", Some(admin), &deps)
        .await
        .unwrap();
    assert_eq!(event.status, "Resolved");
    assert_eq!(event.actor_identity.as_deref(), Some(admin));

    let detail = get_issue(issue.id, &deps).await.unwrap();
    assert_eq!(detail.events.len(), 2);
    assert_eq!(detail.events.last().unwrap().status, "Resolved");
    assert_eq!(detail.issue.status, "Resolved");
    assert_status_matches_history(ctx, issue.id).await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_any_non_empty_status_label_accepted(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let issue = create_issue(input("Streetlight"), None, &deps).await.unwrap();
    transition_status(issue.id, "Awaiting Contractor", None, &deps)
        .await
        .unwrap();

    let err = transition_status(issue.id, "  ", None, &deps).await.unwrap_err();
    assert!(matches!(err, IssueError::Validation(_)));
    assert_status_matches_history(ctx, issue.id).await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_transition_unknown_issue_is_not_found(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let err = transition_status(i64::MAX, "Resolved", None, &deps)
        .await
        .unwrap_err();
    assert!(matches!(err, IssueError::NotFound(id) if id == i64::MAX));

    let err = get_issue(i64::MAX, &deps).await.unwrap_err();
    assert!(matches!(err, IssueError::NotFound(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_transitions_keep_status_and_history_aligned(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();
    let deps = Arc::new(deps);

    let issue_id = create_issue(input("Drainage"), None, &deps).await.unwrap().id;

    let mut handles = Vec::new();
    for i in 0..10 {
        let deps = deps.clone();
        handles.push(tokio::spawn(async move {
            transition_status(issue_id, &format!("Step {}", i), None, &deps).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let events = IssueEvent::find_by_issue(issue_id, &ctx.db_pool).await.unwrap();
    assert_eq!(events.len(), 11);
    assert_eq!(events[0].status, "Created");
    assert!(events.windows(2).all(|w| w[0].id < w[1].id));
    assert_status_matches_history(ctx, issue_id).await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_create_validation(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let err = create_issue(input("  "), None, &deps).await.unwrap_err();
    assert!(matches!(err, IssueError::Validation(_)));

    let mut no_location = input("Pothole");
    no_location.location = None;
    let err = create_issue(no_location, None, &deps).await.unwrap_err();
    assert!(matches!(err, IssueError::Validation(_)));

    let mut infinite = input("Pothole");
    infinite.location = Some(Location {
        lat: f64::INFINITY,
        lng: 77.6,
    });
    let err = create_issue(infinite, None, &deps).await.unwrap_err();
    assert!(matches!(err, IssueError::Validation(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_malformed_attachments_silently_dropped(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let mut with_photos = input("Pothole");
    with_photos.attachments = vec![
        json!({"filename": "front.jpg", "mime": "image/jpeg", "size": 2048}),
        json!({"filename": "side.png", "mime": "image/png"}),
        json!({"mime": "image/png", "size": 10}),
        json!({"filename": "back.png", "mime": "image/png", "size": 512}),
    ];

    let issue = create_issue(with_photos, None, &deps).await.unwrap();
    let detail = get_issue(issue.id, &deps).await.unwrap();

    let names: Vec<&str> = detail
        .attachments
        .iter()
        .map(|a| a.filename.as_str())
        .collect();
    assert_eq!(names, vec!["front.jpg", "back.png"]);
    assert_eq!(detail.attachments[0].size, 2048);
    assert!(detail.attachments.iter().all(|a| a.issue_id == issue.id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_creator_upserted_and_existing_role_preserved(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let citizen = unique_phone();
    let issue = create_issue(input("Pothole"), Some(&citizen), &deps)
        .await
        .unwrap();
    assert_eq!(issue.creator_id.as_deref(), Some(citizen.as_str()));
    let user = User::find_by_identity(&citizen, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role(), Role::Citizen);

    let promoted = unique_phone();
    User::upsert_with_role(&promoted, Role::Admin, &ctx.db_pool)
        .await
        .unwrap();
    create_issue(input("Pothole"), Some(&promoted), &deps)
        .await
        .unwrap();
    let user = User::find_by_identity(&promoted, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role(), Role::Admin);

    let detail = get_issue(issue.id, &deps).await.unwrap();
    assert_eq!(
        detail.events[0].actor_identity.as_deref(),
        Some(citizen.as_str())
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_list_by_status_and_category_newest_first(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let pothole = "Pothole";
    let first = create_issue(input(pothole), None, &deps).await.unwrap();
    let second = create_issue(input(pothole), None, &deps).await.unwrap();
    let in_progress = create_issue(input(pothole), None, &deps).await.unwrap();
    let garbage = create_issue(input("Garbage"), None, &deps).await.unwrap();

    transition_status(second.id, "Resolved", None, &deps)
        .await
        .unwrap();
    transition_status(in_progress.id, "In Progress", None, &deps)
        .await
        .unwrap();

    let filters = IssueFilters::builder()
        .statuses(vec!["Created".to_string(), "Resolved".to_string()])
        .category(pothole)
        .build();
    let issues = list_issues(&filters, &deps).await.unwrap();

    assert!(issues
        .iter()
        .all(|i| i.category == pothole && (i.status == "Created" || i.status == "Resolved")));
    assert!(issues
        .windows(2)
        .all(|w| (w[0].created_at, w[0].id) >= (w[1].created_at, w[1].id)));

    let ids: Vec<i64> = issues.iter().map(|i| i.id).collect();
    let pos_first = ids.iter().position(|id| *id == first.id).unwrap();
    let pos_second = ids.iter().position(|id| *id == second.id).unwrap();
    assert!(pos_second < pos_first);
    assert!(!ids.contains(&in_progress.id));
    assert!(!ids.contains(&garbage.id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_list_wildcard_text_and_dates(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let category = unique_category("Tree");
    let mut fallen = input(&category);
    fallen.description = "Fallen BRANCH blocking the lane".to_string();
    let issue = create_issue(fallen, None, &deps).await.unwrap();

    // Wildcard category plus case-insensitive description match
    let filters = IssueFilters::builder()
        .category("All")
        .text("branch blocking")
        .build();
    let ids: Vec<i64> = list_issues(&filters, &deps)
        .await
        .unwrap()
        .iter()
        .map(|i| i.id)
        .collect();
    assert!(ids.contains(&issue.id));

    // Text also matches the category
    let filters = IssueFilters::builder()
        .text(category.to_lowercase())
        .build();
    let found = list_issues(&filters, &deps).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, issue.id);

    let today = Utc::now().date_naive();
    let filters = IssueFilters::builder()
        .category(category.clone())
        .from(today - Duration::days(1))
        .to(today + Duration::days(1))
        .build();
    assert_eq!(list_issues(&filters, &deps).await.unwrap().len(), 1);

    let filters = IssueFilters::builder()
        .category(category.clone())
        .to(today - Duration::days(2))
        .build();
    assert!(list_issues(&filters, &deps).await.unwrap().is_empty());

    let filters = IssueFilters::builder()
        .category(category)
        .statuses(vec!["Resolved".to_string()])
        .build();
    assert!(list_issues(&filters, &deps).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_list_by_creator(ctx: &TestHarness) {
    let (deps, _) = ctx.deps();

    let reporter = unique_phone();
    let mine = create_issue(input("Pothole"), Some(&reporter), &deps)
        .await
        .unwrap();
    create_issue(input("Pothole"), Some(&unique_phone()), &deps)
        .await
        .unwrap();

    let filters = IssueFilters::builder().creator(reporter).build();
    let issues = list_issues(&filters, &deps).await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].id, mine.id);
}
