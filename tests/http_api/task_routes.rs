//! CRUD, listing and validation over HTTP.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use eyre::ensure;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::helpers::{TestApp, history};

#[fixture]
fn app() -> TestApp {
    TestApp::with_work_duration(Duration::from_millis(10))
}

#[rstest]
#[tokio::test]
async fn root_and_health_respond(app: TestApp) -> eyre::Result<()> {
    let (root_status, root) = app.send(Method::GET, "/", None).await?;
    let (health_status, health) = app.send(Method::GET, "/health", None).await?;

    ensure!(root_status == StatusCode::OK, "root status");
    ensure!(
        root == json!({"message": "Task Management API is running"}),
        "root body {root}"
    );
    ensure!(health_status == StatusCode::OK, "health status");
    ensure!(health == json!({"status": "healthy"}), "health body {health}");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn create_returns_pending_task_with_initial_log(app: TestApp) -> eyre::Result<()> {
    let (status, task) = app
        .send(
            Method::POST,
            "/tasks",
            Some(json!({"title": "Write report", "description": "Q3", "priority": 2})),
        )
        .await?;

    ensure!(status == StatusCode::CREATED, "status {status}");
    ensure!(task["title"] == "Write report", "title");
    ensure!(task["description"] == "Q3", "description");
    ensure!(task["priority"] == 2, "priority");
    ensure!(task["status"] == "pending", "status field");
    ensure!(history(&task) == ["pending"], "initial log");
    ensure!(task["logs"][0]["task_id"] == task["id"], "log owner");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn trailing_slash_collection_route_is_served(app: TestApp) -> eyre::Result<()> {
    let (created, _) = app
        .send(Method::POST, "/tasks/", Some(json!({"title": "Slash"})))
        .await?;
    let (listed, page) = app.send(Method::GET, "/tasks/", None).await?;

    ensure!(created == StatusCode::CREATED, "create via /tasks/");
    ensure!(listed == StatusCode::OK, "list via /tasks/");
    ensure!(page["total"] == 1, "listed total");
    Ok(())
}

#[rstest]
#[case(json!({"title": ""}), "title")]
#[case(json!({"title": "Valid", "priority": 10}), "priority")]
#[case(json!({"title": "Valid", "priority": 0}), "priority")]
#[case(json!({"description": "no title"}), "body")]
#[tokio::test]
async fn create_rejects_invalid_input(
    app: TestApp,
    #[case] body: Value,
    #[case] field: &str,
) -> eyre::Result<()> {
    let (status, error) = app.send(Method::POST, "/tasks", Some(body)).await?;
    let (_, page) = app.send(Method::GET, "/tasks", None).await?;

    ensure!(status == StatusCode::UNPROCESSABLE_ENTITY, "status {status}");
    ensure!(error["code"] == "VALIDATION_ERROR", "code {error}");
    ensure!(error["details"][0]["field"] == field, "field {error}");
    ensure!(page["total"] == 0, "nothing persisted");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn malformed_json_is_a_validation_error(app: TestApp) -> eyre::Result<()> {
    let (status, error) = app.send_raw(Method::POST, "/tasks", "{not json").await?;

    ensure!(status == StatusCode::UNPROCESSABLE_ENTITY, "status {status}");
    ensure!(error["code"] == "VALIDATION_ERROR", "code {error}");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn get_unknown_or_malformed_id(app: TestApp) -> eyre::Result<()> {
    let unknown = uuid::Uuid::now_v7();
    let (missing, missing_body) = app
        .send(Method::GET, &format!("/tasks/{unknown}"), None)
        .await?;
    let (malformed, malformed_body) = app.send(Method::GET, "/tasks/not-a-uuid", None).await?;

    ensure!(missing == StatusCode::NOT_FOUND, "unknown id status");
    ensure!(missing_body["code"] == "NOT_FOUND", "unknown id code");
    ensure!(malformed == StatusCode::UNPROCESSABLE_ENTITY, "malformed id status");
    ensure!(malformed_body["details"][0]["field"] == "id", "malformed id field");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_applies_partial_fields_and_logs_status_changes(app: TestApp) -> eyre::Result<()> {
    let id = app
        .create_task(json!({"title": "Original", "description": "keep me"}))
        .await?;
    let uri = format!("/tasks/{id}");

    let (renamed_status, renamed) = app
        .send(Method::PUT, &uri, Some(json!({"title": "Renamed"})))
        .await?;
    let (_, started) = app
        .send(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await?;
    let (_, repeated) = app
        .send(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await?;

    ensure!(renamed_status == StatusCode::OK, "update status");
    ensure!(renamed["description"] == "keep me", "absent field untouched");
    ensure!(history(&renamed) == ["pending"], "rename does not log");
    ensure!(
        history(&started) == ["pending", "in_progress"],
        "status change logs"
    );
    ensure!(history(&repeated) == history(&started), "same status does not log");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_null_description_clears_it(app: TestApp) -> eyre::Result<()> {
    let id = app
        .create_task(json!({"title": "Clear", "description": "temporary"}))
        .await?;

    let (status, task) = app
        .send(
            Method::PUT,
            &format!("/tasks/{id}"),
            Some(json!({"description": null, "title": null})),
        )
        .await?;

    ensure!(status == StatusCode::OK, "status {status}");
    ensure!(task["description"].is_null(), "description cleared");
    ensure!(task["title"] == "Clear", "null title is ignored");
    Ok(())
}

#[rstest]
#[case(json!({"status": "archived"}), "status")]
#[case(json!({"status": " COMPLETED "}), "status")]
#[case(json!({"status": "Completed"}), "status")]
#[case(json!({"priority": 6}), "priority")]
#[case(json!({"title": ""}), "title")]
#[tokio::test]
async fn update_rejects_invalid_fields(
    app: TestApp,
    #[case] body: Value,
    #[case] field: &str,
) -> eyre::Result<()> {
    let id = app.create_task(json!({"title": "Stable"})).await?;

    let (status, error) = app
        .send(Method::PUT, &format!("/tasks/{id}"), Some(body))
        .await?;

    ensure!(status == StatusCode::UNPROCESSABLE_ENTITY, "status {status}");
    ensure!(error["details"][0]["field"] == field, "field {error}");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn update_unknown_task_is_not_found(app: TestApp) -> eyre::Result<()> {
    let unknown = uuid::Uuid::now_v7();

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/tasks/{unknown}"),
            Some(json!({"title": "Ghost"})),
        )
        .await?;

    ensure!(status == StatusCode::NOT_FOUND, "status {status}");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn delete_removes_task(app: TestApp) -> eyre::Result<()> {
    let id = app.create_task(json!({"title": "Delete me"})).await?;
    let uri = format!("/tasks/{id}");

    let (deleted, body) = app.send(Method::DELETE, &uri, None).await?;
    let (again, _) = app.send(Method::DELETE, &uri, None).await?;
    let (fetched, _) = app.send(Method::GET, &uri, None).await?;

    ensure!(deleted == StatusCode::NO_CONTENT, "delete status");
    ensure!(body.is_null(), "no content body");
    ensure!(again == StatusCode::NOT_FOUND, "second delete");
    ensure!(fetched == StatusCode::NOT_FOUND, "task gone");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn list_paginates_and_filters(app: TestApp) -> eyre::Result<()> {
    app.create_task(json!({"title": "Important Task"})).await?;
    for index in 0..11 {
        app.create_task(json!({"title": format!("Chore {index}")}))
            .await?;
    }

    let (status, second_page) = app
        .send(Method::GET, "/tasks?page=2&per_page=5", None)
        .await?;
    let (_, important) = app.send(Method::GET, "/tasks?title=important", None).await?;
    let (_, task_word) = app.send(Method::GET, "/tasks?title=Task", None).await?;
    let (_, none) = app.send(Method::GET, "/tasks?title=xyz", None).await?;
    let (_, pending) = app.send(Method::GET, "/tasks?status=pending", None).await?;

    ensure!(status == StatusCode::OK, "list status");
    ensure!(second_page["total"] == 12, "total independent of window");
    ensure!(second_page["page"] == 2, "page echoed");
    ensure!(second_page["per_page"] == 5, "per_page echoed");
    ensure!(second_page["pages"] == 3, "pages rounded up");
    ensure!(
        second_page["items"].as_array().map(Vec::len) == Some(5),
        "window size"
    );
    ensure!(
        second_page["items"][0].get("logs").is_none(),
        "list items omit logs"
    );
    ensure!(important["total"] == 1, "case-insensitive match");
    ensure!(task_word["total"] == 1, "substring match");
    ensure!(none["total"] == 0 && none["pages"] == 1, "no match keeps one page");
    ensure!(pending["total"] == 12, "status filter");
    Ok(())
}

#[rstest]
#[case("/tasks?page=0")]
#[case("/tasks?per_page=0")]
#[case("/tasks?per_page=101")]
#[case("/tasks?page=abc")]
#[case("/tasks?status=archived")]
#[case("/tasks?status=Completed")]
#[case("/tasks?status=PENDING")]
#[tokio::test]
async fn list_rejects_invalid_query(app: TestApp, #[case] uri: &str) -> eyre::Result<()> {
    let (status, error) = app.send(Method::GET, uri, None).await?;

    ensure!(status == StatusCode::UNPROCESSABLE_ENTITY, "status {status} for {uri}");
    ensure!(error["code"] == "VALIDATION_ERROR", "code for {uri}");
    Ok(())
}
