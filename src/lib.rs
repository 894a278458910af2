//! Tasktrack: task tracking with single-flight background processing.
//!
//! Tasks move between `pending`, `in_progress` and `completed`; every actual
//! status change is recorded in an append-only log. A background run moves a
//! task through `in_progress` to `completed`, and at most one run per task is
//! in flight at any time.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: task aggregate, status rules, filters and pagination
//! - **Ports**: repository and work traits
//! - **Adapters**: in-memory and `PostgreSQL` repositories, simulated work
//! - **Services**: lifecycle orchestration and the background processor
//!
//! # Modules
//!
//! - [`task`]: domain, ports, adapters and services
//! - [`api`]: axum router and handlers
//! - [`config`]: environment-driven configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod api;
pub mod config;
pub mod task;
pub mod telemetry;
