//! Shared helpers for HTTP integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mockable::DefaultClock;
use serde_json::Value;
use tasktrack::{
    api::{self, AppState},
    task::adapters::{SimulatedWork, memory::InMemoryTaskRepository},
};
use tower::ServiceExt;

/// Application state used by HTTP tests.
pub type TestState = AppState<InMemoryTaskRepository, DefaultClock, SimulatedWork>;

/// Router plus the state behind it.
pub struct TestApp {
    pub router: Router,
    pub state: TestState,
}

impl TestApp {
    /// Builds an app whose background runs take `work_duration`.
    pub fn with_work_duration(work_duration: Duration) -> Self {
        let state = AppState::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(DefaultClock),
            Arc::new(SimulatedWork::new(work_duration)),
        );
        Self {
            router: api::router(state.clone()),
            state,
        }
    }

    /// Sends a request with an optional JSON body and returns status and
    /// decoded body (`Value::Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> eyre::Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    /// Sends a raw body with the JSON content type.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: &'static str,
    ) -> eyre::Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    /// Creates a task and returns its identifier.
    pub async fn create_task(&self, body: Value) -> eyre::Result<String> {
        let (status, json) = self.send(Method::POST, "/tasks", Some(body)).await?;
        eyre::ensure!(status == StatusCode::CREATED, "create failed: {status} {json}");
        json["id"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| eyre::eyre!("created task has no id: {json}"))
    }

    /// Polls a task until its status equals `expected`.
    pub async fn wait_for_status(&self, id: &str, expected: &str) -> eyre::Result<Value> {
        let uri = format!("/tasks/{id}");
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let (_, json) = self.send(Method::GET, &uri, None).await?;
                if json["status"] == expected {
                    return Ok::<Value, eyre::Report>(json);
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await?
    }
}

/// Extracts the log statuses of a task body.
pub fn history(task: &Value) -> Vec<String> {
    task["logs"]
        .as_array()
        .map(|logs| {
            logs.iter()
                .filter_map(|log| log["status"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
