mod common;

use anyhow::{ensure, Result};
use axum::http::StatusCode;
use common::{json_body, TestApp};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct ApplicationInfo {
    id: i32,
}

#[derive(Deserialize)]
struct DeadlineInfo {
    id: i32,
    application_id: i32,
    deadline_type: String,
    is_completed: bool,
}

#[derive(Deserialize)]
struct ActivityInfo {
    activity_type: String,
    description: String,
}

async fn create_application(app: &TestApp) -> Result<ApplicationInfo> {
    let response = app
        .post_json(
            "/api/applications",
            &json!({ "company_name": "Acme", "position_title": "Engineer" }),
        )
        .await?;
    ensure!(response.status() == StatusCode::CREATED);
    json_body(response).await
}

async fn create_deadline(app: &TestApp, application_id: i32) -> Result<DeadlineInfo> {
    let response = app
        .post_json(
            &format!("/api/applications/{application_id}/deadlines"),
            &json!({ "deadline_type": "interview", "deadline_date": "2025-09-01T09:00:00" }),
        )
        .await?;
    ensure!(
        response.status() == StatusCode::CREATED,
        "deadline create failed with status {}",
        response.status()
    );
    json_body(response).await
}

async fn activity_for(app: &TestApp, application_id: i32) -> Result<Vec<ActivityInfo>> {
    let response = app
        .get(&format!("/api/applications/{application_id}/activity"))
        .await?;
    ensure!(response.status() == StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn creating_a_deadline_logs_it() -> Result<()> {
    let app = TestApp::new()?;
    let application = create_application(&app).await?;

    let deadline = create_deadline(&app, application.id).await?;
    assert_eq!(deadline.application_id, application.id);
    assert_eq!(deadline.deadline_type, "interview");
    assert!(!deadline.is_completed);

    let activity = activity_for(&app, application.id).await?;
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[1].activity_type, "deadline_added");
    assert_eq!(activity[1].description, "Added interview deadline for 2025-09-01");
    Ok(())
}

#[tokio::test]
async fn completion_toggles_round_trip() -> Result<()> {
    let app = TestApp::new()?;
    let application = create_application(&app).await?;
    let deadline = create_deadline(&app, application.id).await?;

    let response = app
        .patch_json(
            &format!("/api/deadlines/{}", deadline.id),
            &json!({ "is_completed": true }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: DeadlineInfo = json_body(response).await?;
    assert!(toggled.is_completed);

    let response = app
        .patch_json(
            &format!("/api/deadlines/{}", deadline.id),
            &json!({ "is_completed": false }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: DeadlineInfo = json_body(response).await?;
    assert!(!toggled.is_completed);

    let activity = activity_for(&app, application.id).await?;
    let kinds: Vec<&str> = activity
        .iter()
        .map(|record| record.activity_type.as_str())
        .collect();
    assert_eq!(
        kinds,
        [
            "application_created",
            "deadline_added",
            "deadline_completed",
            "deadline_reopened"
        ]
    );
    assert_eq!(activity[2].description, "interview deadline completed");
    assert_eq!(activity[3].description, "interview deadline reopened");
    Ok(())
}

#[tokio::test]
async fn non_completion_edits_do_not_log_toggles() -> Result<()> {
    let app = TestApp::new()?;
    let application = create_application(&app).await?;
    let deadline = create_deadline(&app, application.id).await?;

    let response = app
        .patch_json(
            &format!("/api/deadlines/{}", deadline.id),
            &json!({ "description": "bring portfolio" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // restating the current flag is not a toggle
    let response = app
        .patch_json(
            &format!("/api/deadlines/{}", deadline.id),
            &json!({ "is_completed": false }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let activity = activity_for(&app, application.id).await?;
    assert_eq!(activity.len(), 2);
    Ok(())
}

#[tokio::test]
async fn deleting_a_deadline_logs_it() -> Result<()> {
    let app = TestApp::new()?;
    let application = create_application(&app).await?;
    let deadline = create_deadline(&app, application.id).await?;

    let response = app.delete(&format!("/api/deadlines/{}", deadline.id)).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .get(&format!("/api/applications/{}/deadlines", application.id))
        .await?;
    let remaining: Vec<DeadlineInfo> = json_body(response).await?;
    assert!(remaining.is_empty());

    let activity = activity_for(&app, application.id).await?;
    assert_eq!(activity.last().map(|record| record.activity_type.as_str()), Some("deadline_deleted"));
    Ok(())
}

#[tokio::test]
async fn deadlines_validate_their_inputs() -> Result<()> {
    let app = TestApp::new()?;
    let application = create_application(&app).await?;

    let response = app
        .post_json(
            &format!("/api/applications/{}/deadlines", application.id),
            &json!({ "deadline_type": "  ", "deadline_date": "2025-09-01T09:00:00" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            &format!("/api/applications/{}/deadlines", application.id),
            &json!({ "deadline_type": "interview" }),
        )
        .await?;
    assert!(response.status().is_client_error());

    let response = app
        .post_json(
            "/api/applications/777/deadlines",
            &json!({ "deadline_type": "interview", "deadline_date": "2025-09-01T09:00:00" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .patch_json("/api/deadlines/777", &json!({ "is_completed": true }))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
