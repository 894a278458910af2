//! Background processing triggers over HTTP.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use eyre::ensure;
use rstest::rstest;
use serde_json::json;
use tasktrack::task::domain::TaskId;

use super::helpers::{TestApp, history};

fn task_id(raw: &str) -> eyre::Result<TaskId> {
    Ok(TaskId::from_uuid(raw.parse()?))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn double_trigger_yields_one_accept_and_one_conflict() -> eyre::Result<()> {
    let app = TestApp::with_work_duration(Duration::from_secs(60));
    let id = app.create_task(json!({"title": "Long job"})).await?;
    let uri = format!("/tasks/{id}/process");

    let (first, accepted) = app.send(Method::POST, &uri, None).await?;
    let (second, conflict) = app.send(Method::POST, &uri, None).await?;

    ensure!(first == StatusCode::ACCEPTED, "first trigger {first}");
    ensure!(
        accepted["message"] == format!("Background processing started for task {id}"),
        "accept message {accepted}"
    );
    ensure!(second == StatusCode::CONFLICT, "second trigger {second}");
    ensure!(conflict["code"] == "ALREADY_RUNNING", "conflict code {conflict}");
    ensure!(
        app.state.processor().is_running(task_id(&id)?),
        "first run still in flight"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn trigger_on_unknown_task_is_not_found() -> eyre::Result<()> {
    let app = TestApp::with_work_duration(Duration::from_millis(10));
    let unknown = uuid::Uuid::now_v7();

    let (status, error) = app
        .send(Method::POST, &format!("/tasks/{unknown}/process"), None)
        .await?;

    ensure!(status == StatusCode::NOT_FOUND, "status {status}");
    ensure!(error["code"] == "NOT_FOUND", "code {error}");
    ensure!(app.state.processor().running_count() == 0, "running set untouched");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_update_process_flow_completes_task() -> eyre::Result<()> {
    let app = TestApp::with_work_duration(Duration::from_millis(20));
    let id = app
        .create_task(json!({"title": "End to end", "priority": 3}))
        .await?;

    let (updated, _) = app
        .send(
            Method::PUT,
            &format!("/tasks/{id}"),
            Some(json!({"description": "ready"})),
        )
        .await?;
    let (accepted, _) = app
        .send(Method::POST, &format!("/tasks/{id}/process"), None)
        .await?;
    let finished = app.wait_for_status(&id, "completed").await?;

    ensure!(updated == StatusCode::OK, "update {updated}");
    ensure!(accepted == StatusCode::ACCEPTED, "trigger {accepted}");
    ensure!(
        history(&finished) == ["pending", "in_progress", "completed"],
        "history {finished}"
    );
    ensure!(finished["description"] == "ready", "update kept");

    // The run deregisters right after its final write.
    let task = task_id(&id)?;
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.processor().is_running(task) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    let (again, _) = app
        .send(Method::POST, &format!("/tasks/{id}/process"), None)
        .await?;
    ensure!(again == StatusCode::ACCEPTED, "completed task can be reprocessed");
    Ok(())
}

fn updated_at(task: &serde_json::Value) -> eyre::Result<DateTime<Utc>> {
    let raw = task["updated_at"]
        .as_str()
        .ok_or_else(|| eyre::eyre!("task has no updated_at: {task}"))?;
    Ok(raw.parse()?)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn processing_a_task_already_in_progress_adds_only_the_completed_log() -> eyre::Result<()> {
    let app = TestApp::with_work_duration(Duration::from_millis(20));
    let (created_status, created) = app
        .send(Method::POST, "/tasks", Some(json!({"title": "T", "priority": 2})))
        .await?;
    ensure!(created_status == StatusCode::CREATED, "create {created_status}");
    let id = created["id"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| eyre::eyre!("created task has no id: {created}"))?;
    tokio::time::sleep(Duration::from_millis(2)).await;

    let (updated_status, started) = app
        .send(
            Method::PUT,
            &format!("/tasks/{id}"),
            Some(json!({"status": "in_progress"})),
        )
        .await?;

    ensure!(updated_status == StatusCode::OK, "update {updated_status}");
    ensure!(
        history(&started) == ["pending", "in_progress"],
        "history after update {started}"
    );
    ensure!(
        updated_at(&started)? > updated_at(&created)?,
        "updated_at must advance: {created} -> {started}"
    );

    let (accepted, _) = app
        .send(Method::POST, &format!("/tasks/{id}/process"), None)
        .await?;
    ensure!(accepted == StatusCode::ACCEPTED, "trigger {accepted}");
    let finished = app.wait_for_status(&id, "completed").await?;

    ensure!(
        history(&finished) == ["pending", "in_progress", "completed"],
        "run must not log the unchanged in_progress status: {finished}"
    );
    ensure!(finished["priority"] == 2, "priority kept {finished}");
    ensure!(
        updated_at(&finished)? >= updated_at(&started)?,
        "updated_at never moves backwards"
    );

    let task = task_id(&id)?;
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.processor().is_running(task) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    ensure!(app.state.processor().running_count() == 0, "run deregistered");
    Ok(())
}
